//! Ant state and per-tick behavior.
//!
//! An ant is a genome wrapped in a body: position, velocity and an energy
//! budget. It lives until its energy runs out or it leaves the world. Its
//! lifespan becomes the fitness of its genome.

use geo::{Coord, Rect};
use serde::{Deserialize, Serialize};

use super::brain::Brain;
use super::error::Result;
use super::events::TickEvent;
use super::genome::Genome;
use super::geometry::rect_around;
use super::params::Params;
use super::world::Environment;

/// Lifecycle state of an ant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AntState {
    /// Moving and eating.
    #[default]
    Alive,
    /// Energy reached zero.
    Starved,
    /// Left the world bounds.
    OutOfBounds,
}

/// A single ant controlled by its genome's network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ant {
    /// Unique identifier, never reused within a population.
    pub id: u64,
    /// Centre of the body in world coordinates.
    pub position: Coord<f32>,
    /// Velocity chosen by the brain on the last tick.
    pub velocity: Coord<f32>,
    /// Current energy (dies when <= 0).
    pub energy: f32,
    /// Time alive in simulation seconds.
    pub lifespan: f32,
    /// Lifecycle state.
    pub state: AntState,
    /// Genome whose network drives the ant.
    pub genome: Genome,
    /// Perception state, rebuilt from parameters after loading.
    #[serde(skip)]
    pub brain: Brain,
}

impl Ant {
    /// Creates a live ant at `position`.
    ///
    /// # Arguments
    ///
    /// * `id` - Unique identifier
    /// * `genome` - Genome controlling the ant
    /// * `position` - Spawn position
    /// * `params` - Simulation parameters (initial energy, grids)
    pub fn new(id: u64, genome: Genome, position: Coord<f32>, params: &Params) -> Self {
        Self {
            id,
            position,
            velocity: Coord { x: 0.0, y: 0.0 },
            energy: params.initial_energy,
            lifespan: 0.0,
            state: AntState::Alive,
            genome,
            brain: Brain::from_params(params),
        }
    }

    /// Whether the ant is still alive.
    pub fn is_alive(&self) -> bool {
        self.state == AntState::Alive
    }

    /// Marks the ant dead with the given cause.
    pub fn kill(&mut self, cause: AntState) {
        self.state = cause;
    }

    /// Adds energy, capped at `max_energy`.
    pub fn feed(&mut self, amount: f32, max_energy: f32) {
        self.energy = (self.energy + amount).min(max_energy);
    }

    /// Replaces the brain with a fresh one configured from `params`.
    pub fn rebuild_brain(&mut self, params: &Params) {
        self.brain = Brain::from_params(params);
    }

    /// Body square used for eating.
    pub fn body_rect(&self, size: f32) -> Rect<f32> {
        rect_around(self.position, Coord { x: size, y: size })
    }

    /// Advances the ant by one tick.
    ///
    /// Touches only the ant itself and reads `env`, so ants can be advanced in
    /// parallel. Returns the events the population must apply afterwards.
    pub fn advance<E: Environment + ?Sized>(
        &mut self,
        slot: usize,
        time: f32,
        dt: f32,
        env: &E,
        params: &Params,
    ) -> Result<Vec<TickEvent>> {
        if !self.is_alive() {
            return Ok(vec![TickEvent::AntDied {
                slot,
                cause: self.state,
            }]);
        }

        if env.out_of_bounds(self.position) {
            self.kill(AntState::OutOfBounds);
        } else if self.energy <= 0.0 {
            self.kill(AntState::Starved);
        } else {
            let velocity =
                self.brain
                    .update(time, self.position, env, self.genome.network_mut())?;
            self.velocity = velocity;
            self.position = self.position + velocity * dt;

            let speed = velocity.x.hypot(velocity.y);
            self.energy -= (params.idle_energy_rate + params.move_energy_rate * speed) * dt;
            self.lifespan += dt;

            if self.energy <= 0.0 {
                self.kill(AntState::Starved);
            }
        }

        if self.is_alive() {
            let area = self.body_rect(params.ant_size);
            if env.food_in_rect(&area) {
                return Ok(vec![TickEvent::FoodReached { slot, area }]);
            }
            return Ok(Vec::new());
        }
        Ok(vec![TickEvent::AntDied {
            slot,
            cause: self.state,
        }])
    }
}
