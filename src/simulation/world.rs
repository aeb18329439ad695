//! The world ants live in: a rectangular field scattered with food.
//!
//! Ants see the world only through the [`Environment`] trait. During the
//! parallel phase of a tick the environment is shared read-only; food is
//! consumed afterwards, sequentially, through `consume_food_in_rect`.

use geo::{Coord, Rect};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::Result;
use super::geometry::half_open_contains;
use super::params::Params;
use super::spatial::FoodIndex;

/// Query surface the population needs from its surroundings.
pub trait Environment: Sync {
    /// Playable region. Positions inside are `[min, max)` on both axes.
    fn bounds(&self) -> Rect<f32>;

    /// Whether `position` lies outside [`Environment::bounds`].
    fn out_of_bounds(&self, position: Coord<f32>) -> bool {
        !half_open_contains(&self.bounds(), position)
    }

    /// Whether any food lies inside `rect`.
    fn food_in_rect(&self, rect: &Rect<f32>) -> bool;

    /// Removes every food item inside `rect` and returns the energy it held.
    fn consume_food_in_rect(&mut self, rect: &Rect<f32>) -> f32;

    /// Uniformly random centre for a body of size `dimensions` that keeps the
    /// whole body inside the bounds.
    fn spawn_position<R: Rng + ?Sized>(&self, dimensions: Coord<f32>, rng: &mut R) -> Coord<f32>
    where
        Self: Sized,
    {
        let bounds = self.bounds();
        let half = dimensions / 2.0;
        let (min, max) = (bounds.min() + half, bounds.max() - half);
        Coord {
            x: uniform_or_midpoint(rng, min.x, max.x),
            y: uniform_or_midpoint(rng, min.y, max.y),
        }
    }
}

/// Uniform draw from `[lo, hi)`, or the midpoint when the range is empty.
fn uniform_or_midpoint<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.random_range(lo..hi)
    } else {
        (lo + hi) / 2.0
    }
}

/// A food item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Food {
    /// Position in world coordinates.
    pub pos: Coord<f32>,
    /// Energy granted when eaten.
    pub energy: f32,
}

/// Rectangular world `[0, width) × [0, height)` with KD-tree indexed food.
#[derive(Debug, Default)]
pub struct World {
    width: f32,
    height: f32,
    food: Vec<Food>,
    positions: Vec<Coord<f32>>,
    index: FoodIndex,
    target_food: usize,
    food_energy: f32,
}

impl World {
    /// Creates a world sized from `params` and fills it with food.
    pub fn new<R: Rng + ?Sized>(params: &Params, rng: &mut R) -> Result<Self> {
        let mut world = Self {
            width: params.world_width,
            height: params.world_height,
            food: Vec::with_capacity(params.food_count),
            positions: Vec::with_capacity(params.food_count),
            index: FoodIndex::default(),
            target_food: params.food_count,
            food_energy: params.food_energy,
        };
        world.replenish_food(rng)?;
        Ok(world)
    }

    /// An empty world of the given size with no food target.
    pub fn empty(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// World width.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// World height.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Current food items.
    pub fn food(&self) -> &[Food] {
        &self.food
    }

    /// Places one food item and reindexes. The world is unchanged on error.
    pub fn add_food(&mut self, food: Food) -> Result<()> {
        let mut next = self.food.clone();
        next.push(food);
        self.commit(next)
    }

    /// Spawns food at random positions until the target count is reached.
    /// Returns the number of items added.
    pub fn replenish_food<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<usize> {
        let missing = self.target_food.saturating_sub(self.food.len());
        if missing == 0 {
            return Ok(0);
        }
        let mut next = self.food.clone();
        for _ in 0..missing {
            let pos = Coord {
                x: rng.random_range(0.0..self.width),
                y: rng.random_range(0.0..self.height),
            };
            next.push(Food {
                pos,
                energy: self.food_energy,
            });
        }
        self.commit(next)?;
        Ok(missing)
    }

    /// Indexes `food` and only then replaces the current food set.
    fn commit(&mut self, food: Vec<Food>) -> Result<()> {
        let positions: Vec<Coord<f32>> = food.iter().map(|f| f.pos).collect();
        self.index = FoodIndex::build(positions.iter().copied())?;
        self.positions = positions;
        self.food = food;
        Ok(())
    }
}

impl Environment for World {
    fn bounds(&self) -> Rect<f32> {
        Rect::new(
            Coord { x: 0.0, y: 0.0 },
            Coord {
                x: self.width,
                y: self.height,
            },
        )
    }

    fn food_in_rect(&self, rect: &Rect<f32>) -> bool {
        !self.index.within_rect(rect, &self.positions).is_empty()
    }

    fn consume_food_in_rect(&mut self, rect: &Rect<f32>) -> f32 {
        let mut eaten = self.index.within_rect(rect, &self.positions);
        if eaten.is_empty() {
            return 0.0;
        }
        eaten.sort_unstable();
        let mut remaining = self.food.clone();
        let mut energy = 0.0;
        for idx in eaten.into_iter().rev() {
            energy += remaining.swap_remove(idx).energy;
        }
        match self.commit(remaining) {
            Ok(()) => energy,
            Err(e) => {
                log::warn!("food index rebuild failed, food left in place: {e}");
                0.0
            }
        }
    }
}
