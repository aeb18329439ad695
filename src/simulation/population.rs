//! Population: the live ants plus the pangenome they feed when they die.
//!
//! A tick has two phases:
//! - Phase 1 advances every ant in parallel with rayon. Ants only touch their
//!   own state and read the shared environment; everything else is reported
//!   as [`TickEvent`]s, collected in slot order.
//! - Phase 2 applies the events serially: food claims in slot order (first
//!   claimant wins), then death harvesting, archive insertion and respawn.

use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::ant::{Ant, AntState};
use super::error::{Result, SimError};
use super::events::{EventQueue, TickEvent};
use super::genome::Genome;
use super::pangenome::Pangenome;
use super::params::{ParentSelection, Params};
use super::world::Environment;

/// What happened during one call to [`Population::update`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Ants spawned into empty or freed slots.
    pub births: usize,
    /// Ants that died and were harvested.
    pub deaths: usize,
    /// Successful food claims.
    pub food_eaten: usize,
    /// Fitness recorded for each dead ant, in slot order.
    pub fitness_samples: Vec<f32>,
}

/// Snapshot of population and archive statistics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PopulationStats {
    /// Live ants.
    pub alive: usize,
    /// Ants ever spawned.
    pub total_births: u64,
    /// Ants ever harvested.
    pub total_deaths: u64,
    /// Archived genomes.
    pub archive_size: usize,
    /// Best archived fitness.
    pub best_fitness: Option<f32>,
    /// Mean archived fitness.
    pub mean_fitness: Option<f32>,
    /// Mean lifespan of the live ants.
    pub mean_lifespan: f32,
}

/// A fixed-size colony of ants and its gene pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Population {
    /// Target number of live ants.
    pub size: usize,
    /// One ant per slot.
    pub ants: Vec<Ant>,
    /// Archive of dead ants' genomes.
    pub pangenome: Pangenome,
    #[serde(skip)]
    next_id: u64,
    #[serde(skip)]
    total_births: u64,
    #[serde(skip)]
    total_deaths: u64,
}

impl Population {
    /// Creates `params.population_size` ants with random genomes.
    pub fn new<E: Environment, R: Rng + ?Sized>(
        params: &Params,
        env: &E,
        rng: &mut R,
    ) -> Result<Self> {
        let mut population = Self {
            size: params.population_size,
            ants: Vec::with_capacity(params.population_size),
            pangenome: Pangenome::new(params.pangenome_limits()),
            next_id: 0,
            total_births: 0,
            total_deaths: 0,
        };
        for _ in 0..population.size {
            let ant = population.create_ant(params, env, rng)?;
            population.ants.push(ant);
        }
        Ok(population)
    }

    /// Identifier the next spawned ant will get. Also serves as a
    /// generation counter.
    pub fn generation(&self) -> u64 {
        self.next_id
    }

    /// Number of live ants.
    pub fn alive_count(&self) -> usize {
        self.ants.iter().filter(|ant| ant.is_alive()).count()
    }

    /// Spawns a new ant at a random valid position.
    ///
    /// Once the archive holds more than `breeding_threshold` genomes the
    /// child is bred from two archived parents and the two least fit
    /// genomes are dropped. Otherwise the genome is random.
    pub fn create_ant<E: Environment, R: Rng + ?Sized>(
        &mut self,
        params: &Params,
        env: &E,
        rng: &mut R,
    ) -> Result<Ant> {
        let genome = if self.pangenome.len() > params.breeding_threshold {
            let (first, second) = match params.parent_selection {
                ParentSelection::TopCycle => (
                    self.pangenome.sample_top_cycle()?,
                    self.pangenome.sample_top_cycle()?,
                ),
                ParentSelection::Random => (
                    self.pangenome.sample_random(rng)?,
                    self.pangenome.sample_random(rng)?,
                ),
            };
            let child = first.breed_with(&second, params.mutation_rate, rng)?;
            let removed = self.pangenome.remove_least_fit(2);
            log::debug!(
                "bred ant {} from parents with fitness {:.2} and {:.2}, dropped {} genomes",
                self.next_id,
                first.fitness(),
                second.fitness(),
                removed
            );
            if self.pangenome.is_empty() {
                log::warn!("pangenome emptied while breeding ant {}", self.next_id);
            }
            child
        } else {
            Genome::random(params.topology(), params.mutation_rate, rng)?
        };

        let size = params.ant_size;
        let position = env.spawn_position(geo::Coord { x: size, y: size }, rng);
        let ant = Ant::new(self.next_id, genome, position, params);
        self.next_id += 1;
        self.total_births += 1;
        Ok(ant)
    }

    /// Advances every ant by one tick and harvests the dead.
    ///
    /// # Arguments
    ///
    /// * `params` - Simulation parameters
    /// * `time` - Simulation time at the start of the tick
    /// * `env` - World; read in parallel, then mutated when food is eaten
    /// * `rng` - Source of randomness for breeding and spawning
    pub fn update<E: Environment, R: Rng + ?Sized>(
        &mut self,
        params: &Params,
        time: f32,
        env: &mut E,
        rng: &mut R,
    ) -> Result<TickReport> {
        let mut queue = EventQueue::new();
        {
            let shared: &E = env;
            let per_ant = self
                .ants
                .par_iter_mut()
                .enumerate()
                .map(|(slot, ant)| ant.advance(slot, time, params.dt, shared, params))
                .collect::<Result<Vec<_>>>()?;
            for events in per_ant {
                queue.extend(events);
            }
        }

        let mut report = TickReport::default();
        let mut dead: Vec<(usize, AntState)> = Vec::new();
        for event in queue.drain() {
            match event {
                TickEvent::FoodReached { slot, area } => {
                    let energy = env.consume_food_in_rect(&area);
                    if energy > 0.0 {
                        self.ants[slot].feed(energy, params.max_energy);
                        report.food_eaten += 1;
                    }
                }
                TickEvent::AntDied { slot, cause } => dead.push((slot, cause)),
            }
        }

        for (slot, cause) in dead {
            let ant = &self.ants[slot];
            let fitness = ant.lifespan;
            log::trace!("ant {} died ({:?}) after {:.2}s", ant.id, cause, fitness);
            let genome = ant.genome.clone().with_fitness(fitness)?;
            self.pangenome.add(genome)?;
            report.fitness_samples.push(fitness);
            report.deaths += 1;
            self.total_deaths += 1;

            self.ants[slot] = self.create_ant(params, env, rng)?;
            report.births += 1;
        }

        while self.ants.len() < self.size {
            let ant = self.create_ant(params, env, rng)?;
            self.ants.push(ant);
            report.births += 1;
        }

        Ok(report)
    }

    /// Population and archive statistics.
    pub fn stats(&self) -> PopulationStats {
        let alive: Vec<&Ant> = self.ants.iter().filter(|ant| ant.is_alive()).collect();
        let mean_lifespan = if alive.is_empty() {
            0.0
        } else {
            alive.iter().map(|ant| ant.lifespan).sum::<f32>() / alive.len() as f32
        };
        PopulationStats {
            alive: alive.len(),
            total_births: self.total_births,
            total_deaths: self.total_deaths,
            archive_size: self.pangenome.len(),
            best_fitness: self.pangenome.best_fitness(),
            mean_fitness: self.pangenome.mean_fitness(),
            mean_lifespan,
        }
    }

    /// Saves the population to a JSON file.
    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Loads a population from a JSON file.
    ///
    /// The saved size and ant count must equal `params.population_size`, and
    /// every genome must match the network shape implied by `params`. Brains
    /// are rebuilt and the archive limits are taken from `params`.
    pub fn load_from_file(path: &str, params: &Params) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let mut population: Self = serde_json::from_str(&json)?;

        if population.size != params.population_size {
            return Err(SimError::Malformed(format!(
                "saved population size {} does not match configured size {}",
                population.size, params.population_size
            )));
        }
        if population.ants.len() != population.size {
            return Err(SimError::Malformed(format!(
                "saved population holds {} ants but declares size {}",
                population.ants.len(),
                population.size
            )));
        }

        let expected = params.topology();
        let genomes = population
            .ants
            .iter()
            .map(|ant| &ant.genome)
            .chain(population.pangenome.genomes());
        for genome in genomes {
            if genome.topology() != expected {
                return Err(SimError::IncompatibleGenome {
                    expected,
                    found: genome.topology(),
                });
            }
        }

        population.pangenome.set_limits(params.pangenome_limits());
        for ant in &mut population.ants {
            ant.rebuild_brain(params);
        }
        population.next_id = population
            .ants
            .iter()
            .map(|ant| ant.id + 1)
            .max()
            .unwrap_or(0);
        population.total_births = population.ants.len() as u64;
        Ok(population)
    }
}
