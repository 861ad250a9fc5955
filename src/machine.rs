//! This module defines the `Machine` definition and the `MachineBuilder` that validates it.
//!
//! A `Machine` is immutable once built. It holds no run-time state, so one definition
//! can serve any number of independent runs, including concurrent ones.

use crate::table::TransitionTable;
use crate::types::{Symbol, TransitionKey, TransitionResult, TuringMachineError};
use std::collections::BTreeSet;
use tracing::warn;

/// A single-tape Turing machine with one memory register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Machine {
    states: BTreeSet<String>,
    initial_state: String,
    final_states: BTreeSet<String>,
    alphabet: BTreeSet<String>,
    tape_alphabet: BTreeSet<Symbol>,
    table: TransitionTable,
    blank: Symbol,
}

impl Machine {
    /// Starts building a machine.
    pub fn builder() -> MachineBuilder {
        MachineBuilder::new()
    }

    pub fn states(&self) -> &BTreeSet<String> {
        &self.states
    }

    pub fn initial_state(&self) -> &str {
        &self.initial_state
    }

    pub fn final_states(&self) -> &BTreeSet<String> {
        &self.final_states
    }

    /// The declared input alphabet. Descriptive only; inputs are not checked against it.
    pub fn alphabet(&self) -> &BTreeSet<String> {
        &self.alphabet
    }

    /// The declared tape alphabet. Descriptive only; transitions are not checked against it.
    pub fn tape_alphabet(&self) -> &BTreeSet<Symbol> {
        &self.tape_alphabet
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    pub fn blank(&self) -> &Symbol {
        &self.blank
    }

    /// Returns true if `state` is one of the final states.
    pub fn is_final(&self, state: &str) -> bool {
        self.final_states.contains(state)
    }
}

/// Collects the parts of a machine definition and validates them on `build`.
#[derive(Debug, Default)]
pub struct MachineBuilder {
    states: Vec<String>,
    initial: Option<String>,
    finals: Vec<String>,
    alphabet: Vec<String>,
    tape_alphabet: Vec<Symbol>,
    blank: Symbol,
    transitions: Vec<(TransitionKey, TransitionResult)>,
}

impl MachineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds states to the state set.
    pub fn states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.states.extend(states.into_iter().map(Into::into));
        self
    }

    /// Sets the initial state (required).
    pub fn initial(mut self, state: impl Into<String>) -> Self {
        self.initial = Some(state.into());
        self
    }

    /// Adds states to the final-state set.
    pub fn finals<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.finals.extend(states.into_iter().map(Into::into));
        self
    }

    pub fn alphabet<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alphabet.extend(symbols.into_iter().map(Into::into));
        self
    }

    pub fn tape_alphabet<I>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = Symbol>,
    {
        self.tape_alphabet.extend(symbols);
        self
    }

    /// Sets the blank symbol. Defaults to [`Symbol::Blank`].
    pub fn blank(mut self, blank: Symbol) -> Self {
        self.blank = blank;
        self
    }

    /// Adds a transition. A later transition with the same key replaces an earlier one.
    pub fn transition(mut self, key: TransitionKey, result: TransitionResult) -> Self {
        self.transitions.push((key, result));
        self
    }

    /// Adds multiple transitions at once.
    pub fn transitions<I>(mut self, transitions: I) -> Self
    where
        I: IntoIterator<Item = (TransitionKey, TransitionResult)>,
    {
        self.transitions.extend(transitions);
        self
    }

    /// Builds the machine.
    ///
    /// # Returns
    ///
    /// * `Ok(Machine)` if the initial state and every final state belong to the state set.
    /// * `Err(TuringMachineError::ConfigError)` otherwise. No partial machine is produced.
    pub fn build(self) -> Result<Machine, TuringMachineError> {
        let states: BTreeSet<String> = self.states.into_iter().collect();

        let initial_state = match self.initial {
            Some(initial) if states.contains(&initial) => initial,
            Some(initial) => {
                return Err(TuringMachineError::ConfigError(format!(
                    "initial state not in state set: {initial}"
                )))
            }
            None => {
                return Err(TuringMachineError::ConfigError(
                    "initial state not in state set: no initial state given".to_string(),
                ))
            }
        };

        let final_states: BTreeSet<String> = self.finals.into_iter().collect();
        let missing: Vec<&String> = final_states.difference(&states).collect();
        if !missing.is_empty() {
            return Err(TuringMachineError::ConfigError(format!(
                "final states not in state set: {missing:?}"
            )));
        }

        let mut table = TransitionTable::new();
        for (key, result) in self.transitions {
            if let Some(replaced) = table.insert(key.clone(), result) {
                warn!(
                    key = %key,
                    replaced = %replaced.next_state,
                    "duplicate transition key, keeping the last entry"
                );
            }
        }

        Ok(Machine {
            states,
            initial_state,
            final_states,
            alphabet: self.alphabet.into_iter().collect(),
            tape_alphabet: self.tape_alphabet.into_iter().collect(),
            table,
            blank: self.blank,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;

    fn builder() -> MachineBuilder {
        Machine::builder()
            .states(["q0", "q1", "qf"])
            .initial("q0")
            .finals(["qf"])
            .alphabet(["a"])
            .tape_alphabet([Symbol::from('a'), Symbol::Blank])
    }

    #[test]
    fn test_build_valid_machine() {
        let machine = builder()
            .transition(
                TransitionKey::new("q0", Symbol::Blank, Symbol::from('a')),
                TransitionResult::new("qf", Symbol::Blank, Symbol::from('a'), Direction::Stay),
            )
            .build()
            .unwrap();

        assert_eq!(machine.initial_state(), "q0");
        assert_eq!(machine.states().len(), 3);
        assert!(machine.is_final("qf"));
        assert!(!machine.is_final("q0"));
        assert_eq!(machine.table().len(), 1);
        assert_eq!(machine.blank(), &Symbol::Blank);
    }

    #[test]
    fn test_initial_state_must_be_declared() {
        let result = builder().initial("nowhere").build();

        match result {
            Err(TuringMachineError::ConfigError(msg)) => {
                assert!(msg.contains("initial state not in state set"));
                assert!(msg.contains("nowhere"));
            }
            other => panic!("Expected a ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_initial_state() {
        let result = Machine::builder().states(["q0"]).build();

        assert!(matches!(result, Err(TuringMachineError::ConfigError(_))));
    }

    #[test]
    fn test_empty_state_set_is_rejected() {
        let result = Machine::builder().initial("q0").build();

        assert!(matches!(result, Err(TuringMachineError::ConfigError(_))));
    }

    #[test]
    fn test_final_states_must_be_declared() {
        let result = builder().finals(["qx", "qy"]).build();

        match result {
            Err(TuringMachineError::ConfigError(msg)) => {
                assert!(msg.contains("final states not in state set"));
                assert!(msg.contains("qx"));
            }
            other => panic!("Expected a ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_transitions_are_not_checked_against_alphabets() {
        let machine = builder()
            .transition(
                TransitionKey::new("undeclared", Symbol::from("mem"), Symbol::from('z')),
                TransitionResult::new("elsewhere", Symbol::Blank, Symbol::from('#'), "?"),
            )
            .build();

        assert!(machine.is_ok());
    }

    #[test]
    fn test_duplicate_keys_keep_last_entry() {
        let key = TransitionKey::new("q0", Symbol::Blank, Symbol::from('a'));
        let machine = builder()
            .transition(
                key.clone(),
                TransitionResult::new("q1", Symbol::Blank, Symbol::from('a'), Direction::Right),
            )
            .transition(
                key.clone(),
                TransitionResult::new("qf", Symbol::Blank, Symbol::from('a'), Direction::Stay),
            )
            .build()
            .unwrap();

        assert_eq!(machine.table().len(), 1);
        assert_eq!(machine.table().get(&key).unwrap().next_state, "qf");
    }
}
