//! Tile grid describing what an ant can see around itself.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::super::error::{Result, SimError};
use super::super::memo::Memo;

/// State of a single surroundings cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TileType {
    /// The cell region contains food.
    Food,
    /// Nothing of interest.
    #[default]
    Empty,
    /// The cell lies outside the world.
    Wall,
}

impl TileType {
    /// Network encoding of the tile.
    pub fn encode(self) -> f32 {
        match self {
            TileType::Food => 1.0,
            TileType::Empty => 0.0,
            TileType::Wall => -1.0,
        }
    }
}

/// `width × height` grid addressed `(x, y)` from the top-left corner.
///
/// The encoded vector is flattened row-major. It is kept in sync cell by cell
/// on [`Surroundings::set_type`] and only rebuilt in full after a resize.
#[derive(Debug, Clone)]
pub struct Surroundings {
    grid: Array2<TileType>,
    encoded: Memo<Vec<f32>>,
    changed: bool,
}

impl Surroundings {
    /// Creates an all-empty grid.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid: Array2::from_elem((height, width), TileType::Empty),
            encoded: Memo::new(),
            changed: true,
        }
    }

    /// Grid width in cells.
    pub fn width(&self) -> usize {
        self.grid.ncols()
    }

    /// Grid height in cells.
    pub fn height(&self) -> usize {
        self.grid.nrows()
    }

    /// Number of cells, which is also the encoded length.
    pub fn len(&self) -> usize {
        self.grid.len()
    }

    /// Whether the grid has no cells.
    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// Reallocates the grid as all-empty with new dimensions.
    pub fn set_dimensions(&mut self, width: usize, height: usize) {
        self.grid = Array2::from_elem((height, width), TileType::Empty);
        self.encoded.invalidate();
        self.changed = true;
    }

    fn check(&self, x: usize, y: usize) -> Result<()> {
        if x >= self.width() || y >= self.height() {
            return Err(SimError::GridIndexOutOfRange {
                x,
                y,
                width: self.width(),
                height: self.height(),
            });
        }
        Ok(())
    }

    /// Tile at `(x, y)`.
    pub fn get_type(&self, x: usize, y: usize) -> Result<TileType> {
        self.check(x, y)?;
        Ok(self.grid[[y, x]])
    }

    /// Sets the tile at `(x, y)`. Setting the current type is a no-op.
    pub fn set_type(&mut self, x: usize, y: usize, tile: TileType) -> Result<()> {
        self.check(x, y)?;
        let cell = &mut self.grid[[y, x]];
        if *cell == tile {
            return Ok(());
        }
        *cell = tile;
        let index = y * self.grid.ncols() + x;
        if let Some(encoded) = self.encoded.peek_mut() {
            encoded[index] = tile.encode();
        }
        self.changed = true;
        Ok(())
    }

    /// Whether the grid changed since the encoded vector was last read.
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// Encoded grid, row-major. Reading clears [`Surroundings::changed`].
    pub fn get_encoded_surroundings(&mut self) -> &[f32] {
        self.changed = false;
        let grid = &self.grid;
        self.encoded
            .get_or_compute(|| grid.iter().map(|tile| tile.encode()).collect())
            .as_slice()
    }
}
