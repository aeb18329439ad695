//! # Antnet - Neuroevolving Ant Colonies
//!
//! Ants steered by small feedforward networks forage in a 2D world. When an
//! ant dies its genome is archived with its lifespan as fitness, and new ants
//! are bred from the fittest archived genomes.
//!
//! ## Features
//!
//! - Tanh neurons and layered networks with memoized outputs
//! - Uniform crossover and Gaussian mutation
//! - Fitness-ranked, bounded genome archive (the pangenome)
//! - Grid-based perception at several resolutions
//! - Parallel per-tick updates with rayon and a serial event phase
//! - Seeded, reproducible runs and JSON save/load
//!
//! ## Core Modules
//!
//! - [`simulation::brain`] - Neurons, networks and perception
//! - [`simulation::genome`] - Breeding and mutation
//! - [`simulation::pangenome`] - Genome archive
//! - [`simulation::population`] - Lifecycle and tick logic
//! - [`simulation::world`] - Environment and food
//! - [`simulation::runner`] - Seeded simulation loop

/// Core simulation logic and data structures.
pub mod simulation {
    /// Ant state and per-tick behavior.
    pub mod ant;
    /// Neural network brains and surroundings perception.
    pub mod brain;
    /// Crate-wide error type.
    pub mod error;
    /// Event system for thread-safe updates.
    pub mod events;
    /// Genomes: networks plus evolutionary metadata.
    pub mod genome;
    /// Rectangle helpers on `geo` types.
    pub mod geometry;
    /// Invalidatable memoization cell.
    pub mod memo;
    /// Fitness-ranked genome archive.
    pub mod pangenome;
    /// Simulation parameters.
    pub mod params;
    /// Population lifecycle with parallel updates.
    pub mod population;
    /// Seeded simulation loop.
    pub mod runner;
    /// KD-tree food index.
    pub mod spatial;
    /// Environment trait and the concrete world.
    pub mod world;
}
