//! Pangenome: the bounded, fitness-ranked archive of dead ants' genomes.
//!
//! Genomes are kept sorted by fitness, highest first. Each time a genome is
//! sampled as a parent its children count grows; once it reaches
//! `max_children_count` the genome leaves the archive so that no single
//! lineage dominates the gene pool.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::{Result, SimError};
use super::genome::{Genome, check_fitness};

/// Default archive capacity.
pub const MAX_PANGENOME_SIZE: usize = 100;
/// Default number of top entries visited by the round-robin sampler.
pub const TOP_PERCENT_SIZE: usize = 10;
/// Default number of breeding uses before a genome is evicted.
pub const MAX_CHILDREN_COUNT: u32 = 5;

/// Bounds applied to a [`Pangenome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PangenomeLimits {
    /// Maximum number of archived genomes.
    pub max_size: usize,
    /// Entries visited by [`Pangenome::sample_top_cycle`].
    pub top_percent_size: usize,
    /// Breeding uses after which a genome is removed.
    pub max_children_count: u32,
}

impl Default for PangenomeLimits {
    fn default() -> Self {
        Self {
            max_size: MAX_PANGENOME_SIZE,
            top_percent_size: TOP_PERCENT_SIZE,
            max_children_count: MAX_CHILDREN_COUNT,
        }
    }
}

/// Fitness-sorted genome archive with two sampling policies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(into = "PangenomeRecord", try_from = "PangenomeRecord")]
pub struct Pangenome {
    genomes: Vec<Genome>,
    top_cycle_index: usize,
    limits: PangenomeLimits,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EntryRecord {
    genome: Genome,
    children_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PangenomeRecord {
    genomes: Vec<EntryRecord>,
    top_cycle_index: usize,
}

impl Pangenome {
    /// Creates an empty archive with the given bounds.
    pub fn new(limits: PangenomeLimits) -> Self {
        Self {
            genomes: Vec::with_capacity(limits.max_size + 1),
            top_cycle_index: 0,
            limits,
        }
    }

    /// Current bounds.
    pub fn limits(&self) -> PangenomeLimits {
        self.limits
    }

    /// Replaces the bounds, trimming the tail if the archive is now too big.
    pub fn set_limits(&mut self, limits: PangenomeLimits) {
        self.limits = limits;
        self.evict_overflow();
        if self.top_cycle_index >= self.top_size() {
            self.top_cycle_index = 0;
        }
    }

    /// Number of archived genomes.
    pub fn len(&self) -> usize {
        self.genomes.len()
    }

    /// Whether the archive is empty.
    pub fn is_empty(&self) -> bool {
        self.genomes.is_empty()
    }

    /// Genomes, fittest first.
    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    /// Genome at rank `index`.
    pub fn get(&self, index: usize) -> Option<&Genome> {
        self.genomes.get(index)
    }

    /// Round-robin cursor over the top entries.
    pub fn top_cycle_index(&self) -> usize {
        self.top_cycle_index
    }

    /// Highest recorded fitness.
    pub fn best_fitness(&self) -> Option<f32> {
        self.genomes.first().map(Genome::fitness)
    }

    /// Mean fitness of the archive.
    pub fn mean_fitness(&self) -> Option<f32> {
        if self.genomes.is_empty() {
            return None;
        }
        let sum: f32 = self.genomes.iter().map(Genome::fitness).sum();
        Some(sum / self.genomes.len() as f32)
    }

    fn top_size(&self) -> usize {
        self.limits.top_percent_size.min(self.genomes.len())
    }

    /// Inserts `genome` at its fitness rank, then drops the least fit
    /// entries while the archive is over capacity.
    pub fn add(&mut self, genome: Genome) -> Result<()> {
        let fitness = genome.fitness();
        check_fitness(fitness)?;
        let index = self.genomes.partition_point(|g| g.fitness() >= fitness);
        self.genomes.insert(index, genome);
        self.evict_overflow();
        Ok(())
    }

    fn evict_overflow(&mut self) {
        while self.genomes.len() > self.limits.max_size {
            let last = self.genomes.len() - 1;
            self.remove_at(last);
        }
    }

    /// Returns a copy of the genome under the round-robin cursor and advances
    /// the cursor over the top entries.
    pub fn sample_top_cycle(&mut self) -> Result<Genome> {
        if self.genomes.is_empty() {
            return Err(SimError::EmptyArchive);
        }
        let top = self.top_size();
        if self.top_cycle_index >= top {
            self.top_cycle_index = 0;
        }
        let index = self.top_cycle_index;
        self.top_cycle_index = (index + 1) % top;
        Ok(self.take_sample(index))
    }

    /// Returns a copy of a uniformly chosen genome.
    pub fn sample_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Genome> {
        if self.genomes.is_empty() {
            return Err(SimError::EmptyArchive);
        }
        let index = rng.random_range(0..self.genomes.len());
        Ok(self.take_sample(index))
    }

    fn take_sample(&mut self, index: usize) -> Genome {
        let count = self.genomes[index].record_child();
        let snapshot = self.genomes[index].clone();
        if count >= self.limits.max_children_count {
            log::debug!(
                "genome with fitness {} retired after {} children",
                snapshot.fitness(),
                count
            );
            self.remove_at(index);
        }
        snapshot
    }

    /// Removes up to `n` of the least fit genomes and returns how many were
    /// removed.
    pub fn remove_least_fit(&mut self, n: usize) -> usize {
        let removed = n.min(self.genomes.len());
        for _ in 0..removed {
            let last = self.genomes.len() - 1;
            self.remove_at(last);
        }
        removed
    }

    fn remove_at(&mut self, index: usize) -> Genome {
        let genome = self.genomes.remove(index);
        if index < self.top_cycle_index {
            self.top_cycle_index -= 1;
        }
        if self.top_cycle_index >= self.top_size() {
            self.top_cycle_index = 0;
        }
        genome
    }
}

impl From<Pangenome> for PangenomeRecord {
    fn from(pangenome: Pangenome) -> Self {
        Self {
            genomes: pangenome
                .genomes
                .into_iter()
                .map(|genome| EntryRecord {
                    children_count: genome.children_count(),
                    genome,
                })
                .collect(),
            top_cycle_index: pangenome.top_cycle_index,
        }
    }
}

impl TryFrom<PangenomeRecord> for Pangenome {
    type Error = SimError;

    fn try_from(record: PangenomeRecord) -> Result<Self> {
        let genomes: Vec<Genome> = record
            .genomes
            .into_iter()
            .map(|entry| {
                let mut genome = entry.genome;
                genome.set_children_count(entry.children_count);
                genome
            })
            .collect();
        if genomes
            .windows(2)
            .any(|pair| pair[0].fitness() < pair[1].fitness())
        {
            return Err(SimError::Malformed(
                "pangenome is not sorted by fitness".to_string(),
            ));
        }
        let mut pangenome = Self {
            genomes,
            top_cycle_index: record.top_cycle_index,
            limits: PangenomeLimits::default(),
        };
        if pangenome.top_cycle_index >= pangenome.top_size() {
            pangenome.top_cycle_index = 0;
        }
        Ok(pangenome)
    }
}
