//! Thread-safe map from `(prefix, source key)` to short numeric ids
//!
//! Ids are dense and strictly increasing: the first registration of a pair
//! gets the next number, later ones get the same number back. A single
//! lock covers lookup and registration so that racing first registrations
//! of the same pair have exactly one winner.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct IdMapState {
    ids: HashMap<(String, String), u32>,
    sources: HashMap<u32, (String, String)>,
    next: u32,
}

impl IdMapState {
    fn new(first: u32) -> Self {
        Self {
            ids: HashMap::new(),
            sources: HashMap::new(),
            next: first,
        }
    }
}

#[derive(Debug)]
pub struct IdMap {
    state: Mutex<IdMapState>,
}

impl IdMap {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(IdMapState::new(1)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, IdMapState> {
        // the state is consistent after every statement, so a panic
        // elsewhere cannot leave it half-updated
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Id for `(prefix, key)`, registering the pair if new
    pub fn map_source_id(&self, prefix: &str, key: &str) -> u32 {
        let mut state = self.lock();
        let pair = (prefix.to_string(), key.to_string());
        if let Some(&id) = state.ids.get(&pair) {
            return id;
        }
        let id = state.next;
        state.next += 1;
        state.ids.insert(pair.clone(), id);
        state.sources.insert(id, pair);
        id
    }

    /// Id already registered for `(prefix, key)`
    pub fn get_id(&self, prefix: &str, key: &str) -> Option<u32> {
        self.lock().ids.get(&(prefix.to_string(), key.to_string())).copied()
    }

    /// `(prefix, key)` pair registered under `id`
    pub fn get_source(&self, id: u32) -> Option<(String, String)> {
        self.lock().sources.get(&id).cloned()
    }

    /// Number of distinct registered pairs
    pub fn count(&self) -> usize {
        self.lock().ids.len()
    }

    /// Forget all pairs; the next id assigned is `first` (default 1)
    pub fn reset(&self, first: Option<u32>) {
        *self.lock() = IdMapState::new(first.unwrap_or(1).max(1));
    }
}

impl Default for IdMap {
    fn default() -> Self {
        Self::new()
    }
}
