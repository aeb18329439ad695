#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use antnet::simulation::brain::{LayerId, NeuralNetwork};
use antnet::simulation::error::SimError;
use antnet::simulation::params::{GridParams, Params};
use antnet::simulation::population::Population;
use antnet::simulation::runner::Simulation;
use std::fs;

fn create_test_params() -> Params {
    Params {
        world_width: 150.0,
        world_height: 150.0,
        food_count: 15,
        population_size: 8,
        grids: vec![GridParams {
            width: 3,
            height: 3,
            tile_size: 6.0,
        }],
        hidden_layer_neuron_count: 3,
        breeding_threshold: 3,
        ..Params::default()
    }
}

fn parameters(network: &NeuralNetwork) -> Vec<(Vec<f32>, f32)> {
    let hidden = (0..network.topology().hidden_layer_count).map(LayerId::Hidden);
    hidden
        .chain(std::iter::once(LayerId::Output))
        .flat_map(|layer| network.layer(layer).unwrap())
        .map(|neuron| (neuron.weights().to_vec(), neuron.bias()))
        .collect()
}

fn starved_simulation(params: &Params) -> Simulation {
    let mut simulation = Simulation::new(params.clone()).unwrap();
    for _ in 0..3 {
        for ant in &mut simulation.population.ants {
            ant.energy = 0.0;
        }
        simulation.step().unwrap();
    }
    simulation
}

#[test]
fn test_save_and_load() {
    let params = create_test_params();
    let simulation = starved_simulation(&params);
    let population = &simulation.population;

    let save_path = "test_population_save.json";
    population
        .save_to_file(save_path)
        .expect("Failed to save population");
    let loaded = Population::load_from_file(save_path, &params).expect("Failed to load population");

    assert_eq!(loaded.size, population.size);
    assert_eq!(loaded.ants.len(), population.ants.len());
    assert_eq!(loaded.pangenome.len(), population.pangenome.len());
    assert_eq!(
        loaded.pangenome.top_cycle_index(),
        population.pangenome.top_cycle_index()
    );
    for (original, restored) in population.ants.iter().zip(&loaded.ants) {
        assert_eq!(original.id, restored.id);
        assert_eq!(original.position, restored.position);
        assert!((original.energy - restored.energy).abs() < 1e-6);
        assert_eq!(original.state, restored.state);
        assert_eq!(
            parameters(original.genome.network()),
            parameters(restored.genome.network())
        );
    }
    for (original, restored) in population
        .pangenome
        .genomes()
        .iter()
        .zip(loaded.pangenome.genomes())
    {
        assert_eq!(original.fitness(), restored.fitness());
        assert_eq!(original.children_count(), restored.children_count());
    }
    assert_eq!(loaded.generation(), population.generation());

    fs::remove_file(save_path).ok();
}

#[test]
fn test_save_creates_expected_json_shape() {
    let params = create_test_params();
    let simulation = starved_simulation(&params);

    let save_path = "test_population_shape.json";
    simulation.save(save_path).expect("Failed to save");

    let json_content = fs::read_to_string(save_path).expect("Failed to read save file");
    let parsed: serde_json::Value = serde_json::from_str(&json_content).expect("Invalid JSON");
    assert_eq!(parsed["size"], serde_json::json!(params.population_size));
    assert!(parsed["ants"].is_array());
    assert!(parsed["pangenome"]["genomes"].is_array());
    assert!(parsed["pangenome"]["top_cycle_index"].is_u64());
    let network = &parsed["ants"][0]["genome"]["network"];
    assert_eq!(
        network["input_count"],
        serde_json::json!(params.topology().input_count)
    );
    assert!(network["output_layer"][0]["value"].is_number());

    fs::remove_file(save_path).ok();
}

#[test]
fn test_loaded_simulation_keeps_running() {
    let params = create_test_params();
    let simulation = starved_simulation(&params);
    let save_path = "test_population_resume.json";
    simulation.save(save_path).unwrap();

    let mut resumed = Simulation::load(params.clone(), save_path).unwrap();
    let first_output = resumed.population.ants[0]
        .genome
        .network()
        .layer(LayerId::Output)
        .unwrap()
        .len();
    assert_eq!(first_output, 2);
    resumed.run(20, 0).unwrap();
    assert_eq!(resumed.population.alive_count(), params.population_size);

    fs::remove_file(save_path).ok();
}

#[test]
fn test_load_with_mismatched_params_fails() {
    let params = create_test_params();
    let simulation = starved_simulation(&params);
    let save_path = "test_population_mismatch.json";
    simulation.save(save_path).unwrap();

    let other = Params {
        hidden_layer_neuron_count: 7,
        ..create_test_params()
    };
    let result = Population::load_from_file(save_path, &other);
    assert!(matches!(result, Err(SimError::IncompatibleGenome { .. })));

    fs::remove_file(save_path).ok();
}

#[test]
fn test_load_nonexistent_file() {
    let result = Population::load_from_file("nonexistent_population.json", &create_test_params());
    assert!(matches!(result, Err(SimError::Io(_))));
}

#[test]
fn test_load_invalid_json() {
    let invalid_path = "test_population_invalid.json";
    fs::write(invalid_path, "{ this is not valid json }").expect("Failed to write test file");

    let result = Population::load_from_file(invalid_path, &create_test_params());
    assert!(matches!(result, Err(SimError::Json(_))));

    fs::remove_file(invalid_path).ok();
}

#[test]
fn test_load_rejects_population_size_mismatch() {
    let params = create_test_params();
    let simulation = starved_simulation(&params);
    let save_path = "test_population_size_mismatch.json";
    simulation.save(save_path).unwrap();

    let larger = Params {
        population_size: params.population_size + 2,
        ..create_test_params()
    };
    let result = Population::load_from_file(save_path, &larger);
    assert!(matches!(result, Err(SimError::Malformed(_))));

    let json = fs::read_to_string(save_path).unwrap();
    let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
    value["size"] = serde_json::json!(params.population_size - 2);
    fs::write(save_path, value.to_string()).unwrap();
    let shrunk = Params {
        population_size: params.population_size - 2,
        ..create_test_params()
    };
    let result = Population::load_from_file(save_path, &shrunk);
    assert!(matches!(result, Err(SimError::Malformed(_))));

    fs::remove_file(save_path).ok();
}
