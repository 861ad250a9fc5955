//! This module defines the `TransitionTable`, the deterministic mapping from
//! (state, memory value, symbol under the head) to a transition result.

use crate::types::{Symbol, TransitionKey, TransitionResult};
use std::collections::HashMap;

/// A deterministic transition function: at most one result per key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionTable {
    entries: HashMap<TransitionKey, TransitionResult>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a transition, returning the result it replaced if the key was already present.
    ///
    /// The last entry supplied for a key wins.
    pub fn insert(
        &mut self,
        key: TransitionKey,
        result: TransitionResult,
    ) -> Option<TransitionResult> {
        self.entries.insert(key, result)
    }

    /// Finds the transition for the given configuration.
    pub fn lookup(
        &self,
        state: &str,
        memory: &Symbol,
        symbol: &Symbol,
    ) -> Option<&TransitionResult> {
        self.get(&TransitionKey::new(state, memory.clone(), symbol.clone()))
    }

    pub fn get(&self, key: &TransitionKey) -> Option<&TransitionResult> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over all transitions in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&TransitionKey, &TransitionResult)> {
        let mut entries: Vec<_> = self.entries.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter()
    }
}

impl FromIterator<(TransitionKey, TransitionResult)> for TransitionTable {
    fn from_iter<I: IntoIterator<Item = (TransitionKey, TransitionResult)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (key, result) in iter {
            table.insert(key, result);
        }
        table
    }
}
