//! Top-level simulation loop tying the world, the population and the random
//! generator together.

use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;

use super::error::Result;
use super::params::Params;
use super::population::{Population, TickReport};
use super::world::World;

/// A seeded, reproducible simulation run.
#[derive(Debug)]
pub struct Simulation {
    /// Parameters the run was started with.
    pub params: Params,
    /// The world and its food.
    pub world: World,
    /// Live ants and their archive.
    pub population: Population,
    /// Elapsed simulation time.
    pub time: f32,
    rng: ChaCha12Rng,
}

impl Simulation {
    /// Validates `params` and builds a fresh world and population.
    pub fn new(params: Params) -> Result<Self> {
        params.validate()?;
        let mut rng = ChaCha12Rng::seed_from_u64(params.seed);
        let world = World::new(&params, &mut rng)?;
        let population = Population::new(&params, &world, &mut rng)?;
        log::info!(
            "simulation started: {} ants, {} food, {} network inputs",
            population.size,
            world.food().len(),
            params.topology().input_count
        );
        Ok(Self {
            params,
            world,
            population,
            time: 0.0,
            rng,
        })
    }

    /// Resumes from a saved population in a fresh world.
    pub fn load(params: Params, path: &str) -> Result<Self> {
        params.validate()?;
        let mut rng = ChaCha12Rng::seed_from_u64(params.seed);
        let world = World::new(&params, &mut rng)?;
        let population = Population::load_from_file(path, &params)?;
        log::info!(
            "loaded {} ants and {} archived genomes from {}",
            population.ants.len(),
            population.pangenome.len(),
            path
        );
        Ok(Self {
            params,
            world,
            population,
            time: 0.0,
            rng,
        })
    }

    /// Advances the simulation by one tick.
    pub fn step(&mut self) -> Result<TickReport> {
        let report =
            self.population
                .update(&self.params, self.time, &mut self.world, &mut self.rng)?;
        self.time += self.params.dt;
        self.world.replenish_food(&mut self.rng)?;
        Ok(report)
    }

    /// Runs `ticks` ticks, logging a summary every `report_every` ticks
    /// (0 disables the summaries).
    pub fn run(&mut self, ticks: u64, report_every: u64) -> Result<()> {
        let mut deaths = 0;
        let mut food_eaten = 0;
        for tick in 1..=ticks {
            let report = self.step()?;
            deaths += report.deaths;
            food_eaten += report.food_eaten;
            if report_every > 0 && tick % report_every == 0 {
                let stats = self.population.stats();
                log::info!(
                    "tick {tick} t={:.1}s: {} deaths, {} food eaten, archive {} (best {:.2}, mean {:.2}), mean lifespan {:.2}s",
                    self.time,
                    deaths,
                    food_eaten,
                    stats.archive_size,
                    stats.best_fitness.unwrap_or(0.0),
                    stats.mean_fitness.unwrap_or(0.0),
                    stats.mean_lifespan
                );
                deaths = 0;
                food_eaten = 0;
            }
        }
        Ok(())
    }

    /// Saves the population to `path`.
    pub fn save(&self, path: &str) -> Result<()> {
        self.population.save_to_file(path)?;
        log::info!("saved population to {path}");
        Ok(())
    }
}
