//! Event system for thread-safe simulation state updates.
//!
//! Ants are advanced in parallel and report anything that touches shared
//! state (the world's food, the pangenome) as events. The population then
//! applies them serially, in slot order.

use geo::Rect;

use super::ant::AntState;

/// Events produced by one ant during the parallel phase of a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickEvent {
    /// A live ant's body overlaps food.
    FoodReached {
        /// Population slot of the ant.
        slot: usize,
        /// Body rectangle used to claim the food.
        area: Rect<f32>,
    },
    /// An ant died this tick and its slot must be harvested.
    AntDied {
        /// Population slot of the ant.
        slot: usize,
        /// Why it died.
        cause: AntState,
    },
}

/// Queue for collecting events from parallel updates.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<TickEvent>,
}

impl EventQueue {
    /// Creates an empty event queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds events in order.
    pub fn extend(&mut self, events: impl IntoIterator<Item = TickEvent>) {
        self.events.extend(events);
    }

    /// Drains all events from the queue.
    pub fn drain(&mut self) -> std::vec::Drain<'_, TickEvent> {
        self.events.drain(..)
    }
}
