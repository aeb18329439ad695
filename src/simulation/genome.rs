//! Genomes: a network plus the metadata evolution needs.
//!
//! Breeding is uniform crossover: every weight and bias of the child comes
//! from one parent picked by a fair coin, then the child is mutated with
//! Gaussian noise.

use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use super::brain::network::{NeuralNetwork, Topology};
use super::error::{Result, SimError};

/// Standard deviation of the Gaussian noise added by mutation.
pub const MUTATION_STD_DEV: f32 = 0.1;

/// A neural network together with its evolutionary bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "GenomeRecord", try_from = "GenomeRecord")]
pub struct Genome {
    network: NeuralNetwork,
    mutation_rate: f32,
    fitness: f32,
    /// Breeding uses; persisted by the pangenome alongside the genome.
    children_count: u32,
}

/// Persisted form of a [`Genome`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GenomeRecord {
    network: NeuralNetwork,
    mutation_rate: f32,
    fitness: f32,
}

fn check_rate(mutation_rate: f32) -> Result<()> {
    if (0.0..=1.0).contains(&mutation_rate) {
        Ok(())
    } else {
        Err(SimError::InvalidConfig(format!(
            "mutation rate {mutation_rate} outside [0, 1]"
        )))
    }
}

pub(crate) fn check_fitness(fitness: f32) -> Result<()> {
    if fitness.is_finite() && fitness >= 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidFitness(fitness))
    }
}

impl Genome {
    /// Wraps `network` with zero fitness and no recorded children.
    pub fn new(network: NeuralNetwork, mutation_rate: f32) -> Result<Self> {
        check_rate(mutation_rate)?;
        Ok(Self {
            network,
            mutation_rate,
            fitness: 0.0,
            children_count: 0,
        })
    }

    /// A genome with a freshly randomized network.
    pub fn random<R: Rng + ?Sized>(
        topology: Topology,
        mutation_rate: f32,
        rng: &mut R,
    ) -> Result<Self> {
        Self::new(NeuralNetwork::new_random(topology, rng), mutation_rate)
    }

    /// The genome's network.
    pub fn network(&self) -> &NeuralNetwork {
        &self.network
    }

    /// Mutable access to the network.
    pub fn network_mut(&mut self) -> &mut NeuralNetwork {
        &mut self.network
    }

    /// Shape of the network.
    pub fn topology(&self) -> Topology {
        self.network.topology()
    }

    /// Probability used when this genome was last mutated.
    pub fn mutation_rate(&self) -> f32 {
        self.mutation_rate
    }

    /// Recorded fitness (lifespan of the ant that carried it).
    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    /// Records fitness. Must be finite and non-negative.
    pub fn set_fitness(&mut self, fitness: f32) -> Result<()> {
        check_fitness(fitness)?;
        self.fitness = fitness;
        Ok(())
    }

    /// Builder form of [`Genome::set_fitness`].
    pub fn with_fitness(mut self, fitness: f32) -> Result<Self> {
        self.set_fitness(fitness)?;
        Ok(self)
    }

    /// How many times the pangenome picked this genome as a parent.
    pub fn children_count(&self) -> u32 {
        self.children_count
    }

    pub(crate) fn set_children_count(&mut self, count: u32) {
        self.children_count = count;
    }

    pub(crate) fn record_child(&mut self) -> u32 {
        self.children_count = self.children_count.saturating_add(1);
        self.children_count
    }

    /// Breeds `self` with `other` into a new, mutated genome.
    ///
    /// Both parents must share the same topology.
    pub fn breed_with<R: Rng + ?Sized>(
        &self,
        other: &Genome,
        mutation_rate: f32,
        rng: &mut R,
    ) -> Result<Genome> {
        if self.topology() != other.topology() {
            return Err(SimError::IncompatibleGenome {
                expected: self.topology(),
                found: other.topology(),
            });
        }
        let mut child = Genome::new(self.network.clone(), mutation_rate)?;
        child
            .network
            .for_each_parameter_pair(&other.network, |mine, theirs| {
                if rng.random_bool(0.5) {
                    *mine = theirs;
                }
            })?;
        child.mutate(mutation_rate, rng)?;
        Ok(child)
    }

    /// Adds `N(0, 0.1)` noise to each weight and bias with probability
    /// `mutation_rate`.
    pub fn mutate<R: Rng + ?Sized>(&mut self, mutation_rate: f32, rng: &mut R) -> Result<()> {
        check_rate(mutation_rate)?;
        self.mutation_rate = mutation_rate;
        self.network.for_each_parameter(|value| {
            if rng.random_bool(f64::from(mutation_rate)) {
                let noise: f32 = rng.sample(StandardNormal);
                *value += noise * MUTATION_STD_DEV;
            }
        });
        Ok(())
    }
}

impl From<Genome> for GenomeRecord {
    fn from(genome: Genome) -> Self {
        Self {
            network: genome.network,
            mutation_rate: genome.mutation_rate,
            fitness: genome.fitness,
        }
    }
}

impl TryFrom<GenomeRecord> for Genome {
    type Error = SimError;

    fn try_from(record: GenomeRecord) -> Result<Self> {
        check_rate(record.mutation_rate)?;
        check_fitness(record.fitness)?;
        Ok(Self {
            network: record.network,
            mutation_rate: record.mutation_rate,
            fitness: record.fitness,
            children_count: 0,
        })
    }
}
