//! Spatial indexing for food lookups.
//!
//! Wraps a KD-tree over food positions and answers rectangle queries by a
//! radius search around the rectangle centre followed by an exact filter.

use std::fmt;

use geo::{Coord, Rect};
use kdtree::KdTree;
use kdtree::distance::squared_euclidean;

use super::error::{Result, SimError};
use super::geometry::{covering_radius, rect_contains};

/// Type alias for 2D spatial KD-tree used for efficient neighbor queries.
pub type Tree2D = KdTree<f32, usize, Vec<f32>>;

/// KD-tree over a slice of positions. Stored values are slice indices.
pub struct FoodIndex {
    tree: Tree2D,
}

impl Default for FoodIndex {
    fn default() -> Self {
        Self {
            tree: KdTree::new(2),
        }
    }
}

impl fmt::Debug for FoodIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FoodIndex")
            .field("len", &self.tree.size())
            .finish()
    }
}

impl FoodIndex {
    /// Builds an index over `positions`.
    pub fn build(positions: impl IntoIterator<Item = Coord<f32>>) -> Result<Self> {
        let positions: Vec<Coord<f32>> = positions.into_iter().collect();
        let mut tree = KdTree::with_capacity(2, positions.len().max(1));
        for (i, pos) in positions.iter().enumerate() {
            tree.add(vec![pos.x, pos.y], i)
                .map_err(|e| SimError::Malformed(format!("cannot index food at {pos:?}: {e:?}")))?;
        }
        Ok(Self { tree })
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Indices (into `positions`, the slice the index was built from) of
    /// every position inside `rect`.
    pub fn within_rect(&self, rect: &Rect<f32>, positions: &[Coord<f32>]) -> Vec<usize> {
        if self.is_empty() {
            return Vec::new();
        }
        let center = rect.center();
        let radius = covering_radius(rect);
        self.tree
            .within(&[center.x, center.y], radius.powi(2), &squared_euclidean)
            .unwrap_or_default()
            .into_iter()
            .map(|(_, &idx)| idx)
            .filter(|&idx| positions.get(idx).is_some_and(|&p| rect_contains(rect, p)))
            .collect()
    }
}
