//! Explicit memoization cell.
//!
//! Replaces ad-hoc "dirty"/"ready" flags: a [`Memo`] either holds a valid
//! value or nothing, and callers say when the cached value stops being true.

/// A lazily computed value that can be invalidated.
#[derive(Debug, Clone, PartialEq)]
pub struct Memo<T> {
    value: Option<T>,
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self { value: None }
    }
}

impl<T> Memo<T> {
    /// Creates an empty (invalid) cell.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the cached value; the next read recomputes it.
    pub fn invalidate(&mut self) {
        self.value = None;
    }

    /// Returns the cached value, computing it with `compute` first if needed.
    pub fn get_or_compute(&mut self, compute: impl FnOnce() -> T) -> &T {
        self.value.get_or_insert_with(compute)
    }

    /// Returns the cached value without computing anything.
    pub fn peek(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Mutable access to the cached value, for in-place incremental updates.
    pub fn peek_mut(&mut self) -> Option<&mut T> {
        self.value.as_mut()
    }
}
