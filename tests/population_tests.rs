#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use antnet::simulation::ant::AntState;
use antnet::simulation::params::{GridParams, ParentSelection, Params};
use antnet::simulation::population::Population;
use antnet::simulation::runner::Simulation;
use antnet::simulation::world::{Food, World};
use geo::Coord;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;

fn create_test_params() -> Params {
    Params {
        world_width: 200.0,
        world_height: 200.0,
        food_count: 20,
        population_size: 12,
        grids: vec![GridParams {
            width: 3,
            height: 3,
            tile_size: 8.0,
        }],
        hidden_layer_neuron_count: 4,
        breeding_threshold: 4,
        ..Params::default()
    }
}

#[test]
fn test_new_population_is_full_and_alive() {
    let params = create_test_params();
    let mut rng = ChaCha12Rng::seed_from_u64(1);
    let world = World::new(&params, &mut rng).unwrap();
    let population = Population::new(&params, &world, &mut rng).unwrap();

    assert_eq!(population.ants.len(), params.population_size);
    assert_eq!(population.alive_count(), params.population_size);
    assert!(population.pangenome.is_empty());
    let mut ids: Vec<u64> = population.ants.iter().map(|ant| ant.id).collect();
    ids.dedup();
    assert_eq!(ids.len(), params.population_size);
    for ant in &population.ants {
        assert_eq!(ant.genome.topology(), params.topology());
        assert!(ant.position.x >= 0.0 && ant.position.x < params.world_width);
        assert!(ant.position.y >= 0.0 && ant.position.y < params.world_height);
    }
}

#[test]
fn test_starved_ants_are_harvested_and_respawned() {
    let params = create_test_params();
    let mut rng = ChaCha12Rng::seed_from_u64(2);
    let mut world = World::new(&params, &mut rng).unwrap();
    let mut population = Population::new(&params, &world, &mut rng).unwrap();
    let old_ids: Vec<u64> = population.ants.iter().map(|ant| ant.id).collect();

    for ant in &mut population.ants {
        ant.energy = 0.0;
    }
    let report = population
        .update(&params, 0.0, &mut world, &mut rng)
        .unwrap();

    let n = params.population_size;
    assert_eq!(report.deaths, n);
    assert_eq!(report.births, n);
    assert_eq!(report.fitness_samples.len(), n);
    assert_eq!(population.ants.len(), n);
    assert_eq!(population.alive_count(), n);
    assert!(
        population
            .ants
            .iter()
            .all(|ant| !old_ids.contains(&ant.id))
    );
    // Archive growth is bounded by the breeding step removing two genomes.
    assert!(population.pangenome.len() <= n);
    assert!(!population.pangenome.is_empty());
}

#[test]
fn test_out_of_bounds_ant_dies() {
    let params = create_test_params();
    let mut rng = ChaCha12Rng::seed_from_u64(3);
    let mut world = World::new(&params, &mut rng).unwrap();
    let mut population = Population::new(&params, &world, &mut rng).unwrap();

    population.ants[0].position = Coord { x: -5.0, y: 10.0 };
    population.ants[0].lifespan = 2.5;
    let old_id = population.ants[0].id;

    let mut dead_ant = population.ants[0].clone();
    let events = dead_ant
        .advance(0, 0.0, params.dt, &world, &params)
        .unwrap();
    assert_eq!(dead_ant.state, AntState::OutOfBounds);
    assert_eq!(events.len(), 1);

    let report = population
        .update(&params, 0.0, &mut world, &mut rng)
        .unwrap();
    assert!(report.fitness_samples.contains(&2.5));
    assert_ne!(population.ants[0].id, old_id);
    assert!(population.ants[0].is_alive());
}

#[test]
fn test_ant_on_food_eats_it() {
    let params = Params {
        food_count: 0,
        max_speed: 0.0,
        ..create_test_params()
    };
    let mut rng = ChaCha12Rng::seed_from_u64(4);
    let mut world = World::new(&params, &mut rng).unwrap();
    let mut population = Population::new(&params, &world, &mut rng).unwrap();

    let position = Coord { x: 100.0, y: 100.0 };
    for ant in &mut population.ants {
        ant.position = Coord { x: 20.0, y: 20.0 };
    }
    population.ants[3].position = position;
    population.ants[3].energy = 0.5;
    world
        .add_food(Food {
            pos: position,
            energy: params.food_energy,
        })
        .unwrap();

    let report = population
        .update(&params, 0.0, &mut world, &mut rng)
        .unwrap();
    assert!(world.food().is_empty());
    assert_eq!(report.food_eaten, 1);
    assert!(population.ants[3].energy > 0.5);
    assert!(population.ants[3].energy <= params.max_energy);
}

#[test]
fn test_energy_decays_and_lifespan_grows() {
    let params = Params {
        food_count: 0,
        ..create_test_params()
    };
    let mut rng = ChaCha12Rng::seed_from_u64(5);
    let mut world = World::new(&params, &mut rng).unwrap();
    let mut population = Population::new(&params, &world, &mut rng).unwrap();

    population
        .update(&params, 0.0, &mut world, &mut rng)
        .unwrap();
    for ant in population.ants.iter().filter(|ant| ant.is_alive()) {
        assert!((ant.lifespan - params.dt).abs() < 1e-6);
        assert!(ant.energy < params.initial_energy);
    }
}

#[test]
fn test_random_parent_selection_breeds() {
    let params = Params {
        parent_selection: ParentSelection::Random,
        ..create_test_params()
    };
    let mut rng = ChaCha12Rng::seed_from_u64(6);
    let mut world = World::new(&params, &mut rng).unwrap();
    let mut population = Population::new(&params, &world, &mut rng).unwrap();

    for tick in 0..3 {
        for ant in &mut population.ants {
            ant.energy = 0.0;
        }
        let report = population
            .update(&params, tick as f32 * params.dt, &mut world, &mut rng)
            .unwrap();
        assert_eq!(report.deaths, params.population_size);
    }
    assert_eq!(population.alive_count(), params.population_size);
    assert_eq!(population.generation(), 4 * params.population_size as u64);
}

#[test]
fn test_simulation_is_reproducible() {
    let params = create_test_params();
    let run = || {
        let mut simulation = Simulation::new(params.clone()).unwrap();
        for _ in 0..30 {
            simulation.step().unwrap();
        }
        simulation
            .population
            .ants
            .iter()
            .map(|ant| (ant.id, ant.position.x, ant.position.y, ant.energy))
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_simulation_run_keeps_population_size() {
    let mut simulation = Simulation::new(create_test_params()).unwrap();
    simulation.run(50, 10).unwrap();
    let stats = simulation.population.stats();
    assert_eq!(stats.alive, simulation.params.population_size);
    assert!(stats.total_births >= simulation.params.population_size as u64);
    assert!((simulation.time - 50.0 * simulation.params.dt).abs() < 1e-3);
    assert_eq!(simulation.world.food().len(), simulation.params.food_count);
}
