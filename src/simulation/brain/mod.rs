//! Ant brains: surroundings perception feeding a feedforward network.
//!
//! A [`Brain`] owns one [`Surroundings`] grid per resolution (near and far
//! view). On a fixed cadence it rescans the world around the ant and, only
//! when some cell changed, pushes the concatenated encodings into the
//! network. The two network outputs become the ant's velocity.

use geo::{Coord, Rect};

pub mod network;
pub mod neuron;
pub mod surroundings;

pub use network::{LayerId, NeuralNetwork, Topology};
pub use neuron::Neuron;
pub use surroundings::{Surroundings, TileType};

use super::error::{Result, SimError};
use super::params::{GridParams, Params};
use super::world::Environment;

/// Number of network outputs a brain consumes (x and y velocity).
pub const VELOCITY_OUTPUTS: usize = 2;

#[derive(Debug, Clone)]
struct SensorGrid {
    surroundings: Surroundings,
    tile_size: f32,
}

impl SensorGrid {
    fn new(params: &GridParams) -> Self {
        Self {
            surroundings: Surroundings::new(params.width, params.height),
            tile_size: params.tile_size,
        }
    }

    /// Reclassifies every cell of a grid centred on `position`.
    fn scan<E: Environment + ?Sized>(&mut self, position: Coord<f32>, env: &E) -> Result<()> {
        let (width, height) = (self.surroundings.width(), self.surroundings.height());
        let tile = self.tile_size;
        let origin = Coord {
            x: position.x - width as f32 * tile / 2.0,
            y: position.y - height as f32 * tile / 2.0,
        };
        for y in 0..height {
            for x in 0..width {
                let min = Coord {
                    x: origin.x + x as f32 * tile,
                    y: origin.y + y as f32 * tile,
                };
                let cell = Rect::new(min, min + Coord { x: tile, y: tile });
                let kind = if env.out_of_bounds(cell.center()) {
                    TileType::Wall
                } else if env.food_in_rect(&cell) {
                    TileType::Food
                } else {
                    TileType::Empty
                };
                self.surroundings.set_type(x, y, kind)?;
            }
        }
        Ok(())
    }
}

/// Perception and decision state of one ant.
///
/// The network itself lives in the ant's genome and is passed into
/// [`Brain::update`] on every call.
#[derive(Debug, Clone, Default)]
pub struct Brain {
    grids: Vec<SensorGrid>,
    scan_interval: f32,
    last_scan: Option<f32>,
    max_speed: f32,
}

impl Brain {
    /// Creates a brain with one grid per entry of `grids`.
    pub fn new(grids: &[GridParams], scan_interval: f32, max_speed: f32) -> Self {
        Self {
            grids: grids.iter().map(SensorGrid::new).collect(),
            scan_interval,
            last_scan: None,
            max_speed,
        }
    }

    /// Brain configured from simulation parameters.
    pub fn from_params(params: &Params) -> Self {
        Self::new(&params.grids, params.scan_interval, params.max_speed)
    }

    /// Length of the network input vector this brain produces.
    pub fn input_count(&self) -> usize {
        self.grids.iter().map(|g| g.surroundings.len()).sum()
    }

    /// Read access to grid `index`, nearest first.
    pub fn surroundings(&self, index: usize) -> Option<&Surroundings> {
        self.grids.get(index).map(|g| &g.surroundings)
    }

    /// Perceives the environment around `position` if a scan is due and
    /// returns the velocity chosen by `network`.
    pub fn update<E: Environment + ?Sized>(
        &mut self,
        time: f32,
        position: Coord<f32>,
        env: &E,
        network: &mut NeuralNetwork,
    ) -> Result<Coord<f32>> {
        if network.output_count() != VELOCITY_OUTPUTS {
            return Err(SimError::OutputArity {
                expected: VELOCITY_OUTPUTS,
                found: network.output_count(),
            });
        }

        let due = self
            .last_scan
            .is_none_or(|last| time - last >= self.scan_interval);
        if due {
            for grid in &mut self.grids {
                grid.scan(position, env)?;
            }
            self.last_scan = Some(time);
        }

        if self.grids.iter().any(|g| g.surroundings.changed()) {
            let mut inputs = Vec::with_capacity(self.input_count());
            for grid in &mut self.grids {
                inputs.extend_from_slice(grid.surroundings.get_encoded_surroundings());
            }
            network.set_inputs(&inputs)?;
        }

        let outputs = network.compute()?;
        Ok(Coord {
            x: outputs[0] * self.max_speed,
            y: outputs[1] * self.max_speed,
        })
    }
}
