//! Pending-expansion containers.
//!
//! The frontier holds rooms that have been placed but whose doors have not
//! been expanded yet. A stack grows long winding chains (depth-first); a
//! queue spreads evenly around the start (breadth-first).

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Work list of rooms awaiting expansion.
pub trait Frontier<T> {
    fn insert(&mut self, item: T);
    /// Take the next entry, or `None` when empty.
    fn remove_next(&mut self) -> Option<T>;
    fn len(&self) -> usize;
    fn clear(&mut self);

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Last in, first out.
#[derive(Debug, Default)]
pub struct StackFrontier<T> {
    items: Vec<T>,
}

impl<T> Frontier<T> for StackFrontier<T> {
    fn insert(&mut self, item: T) {
        self.items.push(item);
    }

    fn remove_next(&mut self) -> Option<T> {
        self.items.pop()
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn clear(&mut self) {
        self.items.clear();
    }
}

/// First in, first out.
#[derive(Debug, Default)]
pub struct QueueFrontier<T> {
    items: VecDeque<T>,
}

impl<T> Frontier<T> for QueueFrontier<T> {
    fn insert(&mut self, item: T) {
        self.items.push_back(item);
    }

    fn remove_next(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn clear(&mut self) {
        self.items.clear();
    }
}

/// Expansion order, fixed for a whole generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlacementOrder {
    /// Depth-first: long corridors.
    Stack,
    /// Breadth-first: balanced spread.
    #[default]
    Queue,
}

impl PlacementOrder {
    /// Build an empty frontier of the matching kind.
    pub fn frontier<T: 'static>(self) -> Box<dyn Frontier<T>> {
        match self {
            PlacementOrder::Stack => Box::new(StackFrontier { items: Vec::new() }),
            PlacementOrder::Queue => Box::new(QueueFrontier {
                items: VecDeque::new(),
            }),
        }
    }
}
