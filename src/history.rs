//! Bounded round history.
//!
//! Append-only, chronological, oldest entries evicted once the configured
//! capacity is reached. Lives for the process lifetime; nothing is persisted.

use std::collections::VecDeque;

use crate::types::{Round, Symbol};

/// Default number of rounds kept in memory.
pub const DEFAULT_CAPACITY: usize = 100;

#[derive(Debug, Clone)]
pub struct HistoryStore {
    rounds: VecDeque<Round>,
    capacity: usize,
}

impl HistoryStore {
    /// Create an empty store. A capacity of zero is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            rounds: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a round, evicting from the front past capacity.
    pub fn push(&mut self, round: Round) {
        while self.rounds.len() >= self.capacity {
            self.rounds.pop_front();
        }
        self.rounds.push_back(round);
    }

    /// Outcomes of the last `n` rounds (fewer if history is shorter),
    /// oldest first.
    pub fn tail_symbols(&self, n: usize) -> Vec<Symbol> {
        let skip = self.rounds.len().saturating_sub(n);
        self.rounds.iter().skip(skip).map(|r| r.outcome).collect()
    }

    pub fn last(&self) -> Option<&Round> {
        self.rounds.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Round> {
        self.rounds.iter()
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
