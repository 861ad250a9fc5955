//! This module provides functions for analyzing a built `Machine` to detect likely
//! mistakes before execution: unreachable or undeclared states, head movements that
//! would fail at run time, and symbols missing from the declared tape alphabet.
//!
//! None of these stop a machine from being built or run; declared alphabets are
//! descriptive, and an invalid movement only fails if its transition fires.

use crate::machine::Machine;
use crate::types::Symbol;
use std::collections::BTreeSet;
use std::fmt;

/// A finding of the analyzer.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Diagnostic {
    /// Declared states that no sequence of transitions reaches from the initial state.
    UnreachableStates(Vec<String>),
    /// States used by transitions but missing from the declared state set.
    UndeclaredStates(Vec<String>),
    /// Transitions, rendered as keys, whose head movement is not Left, Right or Stay.
    InvalidMoves(Vec<String>),
    /// Symbols used by transitions but missing from the declared tape alphabet.
    UnknownSymbols(Vec<Symbol>),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnreachableStates(states) => {
                write!(f, "Unreachable states detected: {:?}", states)
            }
            Diagnostic::UndeclaredStates(states) => {
                write!(f, "Transitions reference undeclared states: {:?}", states)
            }
            Diagnostic::InvalidMoves(transitions) => {
                write!(f, "Transitions with invalid head movement: {}", transitions.join(", "))
            }
            Diagnostic::UnknownSymbols(symbols) => {
                let symbols: Vec<String> = symbols.iter().map(ToString::to_string).collect();
                write!(
                    f,
                    "Transitions use symbols outside the tape alphabet: {:?}",
                    symbols
                )
            }
        }
    }
}

/// Analyzes a `Machine` and returns every diagnostic found, in a fixed order.
///
/// An empty vector means nothing suspicious was found.
pub fn analyze(machine: &Machine) -> Vec<Diagnostic> {
    [
        check_unreachable_states,
        check_undeclared_states,
        check_head_moves,
        check_tape_symbols,
    ]
    .iter()
    .filter_map(|f| f(machine))
    .collect()
}

/// Finds declared states that cannot be reached from the initial state,
/// using a depth-first traversal over the transition table.
fn check_unreachable_states(machine: &Machine) -> Option<Diagnostic> {
    let mut visited = BTreeSet::new();
    let mut stack = vec![machine.initial_state().to_string()];

    while let Some(state) = stack.pop() {
        if !visited.insert(state.clone()) {
            continue;
        }

        for (key, result) in machine.table().iter() {
            if key.state == state && !visited.contains(&result.next_state) {
                stack.push(result.next_state.clone());
            }
        }
    }

    let unreachable: Vec<String> = machine.states().difference(&visited).cloned().collect();

    (!unreachable.is_empty()).then_some(Diagnostic::UnreachableStates(unreachable))
}

/// Finds states that transitions read from or move to without being declared.
fn check_undeclared_states(machine: &Machine) -> Option<Diagnostic> {
    let undeclared: BTreeSet<String> = machine
        .table()
        .iter()
        .flat_map(|(key, result)| [&key.state, &result.next_state])
        .filter(|state| !machine.states().contains(*state))
        .cloned()
        .collect();

    (!undeclared.is_empty()).then(|| Diagnostic::UndeclaredStates(undeclared.into_iter().collect()))
}

/// Finds transitions whose movement token would fail when the transition fires.
fn check_head_moves(machine: &Machine) -> Option<Diagnostic> {
    let invalid: Vec<String> = machine
        .table()
        .iter()
        .filter(|(_, result)| result.head_move.direction().is_err())
        .map(|(key, result)| format!("{} -> {:?}", key, result.head_move.as_str()))
        .collect();

    (!invalid.is_empty()).then_some(Diagnostic::InvalidMoves(invalid))
}

/// Finds symbols read or written by transitions that are not in the tape alphabet.
///
/// Skipped when no tape alphabet is declared. Blank is always considered part of it.
fn check_tape_symbols(machine: &Machine) -> Option<Diagnostic> {
    let alphabet = machine.tape_alphabet();
    if alphabet.is_empty() {
        return None;
    }

    let unknown: BTreeSet<Symbol> = machine
        .table()
        .iter()
        .flat_map(|(key, result)| [&key.symbol, &result.write])
        .filter(|symbol| !symbol.is_blank() && *symbol != machine.blank())
        .filter(|symbol| !alphabet.contains(*symbol))
        .cloned()
        .collect();

    (!unknown.is_empty()).then(|| Diagnostic::UnknownSymbols(unknown.into_iter().collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, TransitionKey, TransitionResult};

    fn key(state: &str, symbol: &str) -> TransitionKey {
        TransitionKey::new(state, Symbol::Blank, Symbol::from(symbol))
    }

    #[test]
    fn test_clean_machine() {
        let machine = Machine::builder()
            .states(["q0", "qf"])
            .initial("q0")
            .finals(["qf"])
            .tape_alphabet([Symbol::from('a')])
            .transition(
                key("q0", "a"),
                TransitionResult::new("qf", Symbol::Blank, Symbol::from('a'), Direction::Right),
            )
            .build()
            .unwrap();

        assert!(analyze(&machine).is_empty());
    }

    #[test]
    fn test_unreachable_states() {
        let machine = Machine::builder()
            .states(["q0", "q1", "island", "orphan"])
            .initial("q0")
            .transition(
                key("q0", "a"),
                TransitionResult::new("q1", Symbol::Blank, Symbol::Blank, Direction::Right),
            )
            .transition(
                key("island", "a"),
                TransitionResult::new("q0", Symbol::Blank, Symbol::Blank, Direction::Right),
            )
            .build()
            .unwrap();

        assert_eq!(
            analyze(&machine),
            vec![Diagnostic::UnreachableStates(vec![
                "island".to_string(),
                "orphan".to_string()
            ])]
        );
    }

    #[test]
    fn test_undeclared_states() {
        let machine = Machine::builder()
            .states(["q0"])
            .initial("q0")
            .transition(
                key("q0", "a"),
                TransitionResult::new("ghost", Symbol::Blank, Symbol::Blank, Direction::Stay),
            )
            .build()
            .unwrap();

        assert_eq!(
            analyze(&machine),
            vec![Diagnostic::UndeclaredStates(vec!["ghost".to_string()])]
        );
    }

    #[test]
    fn test_invalid_moves() {
        let machine = Machine::builder()
            .states(["q0"])
            .initial("q0")
            .transition(
                key("q0", "a"),
                TransitionResult::new("q0", Symbol::Blank, Symbol::Blank, "Up"),
            )
            .build()
            .unwrap();

        let diagnostics = analyze(&machine);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].to_string(),
            "Transitions with invalid head movement: (q0, _, a) -> \"Up\""
        );
    }

    #[test]
    fn test_unknown_symbols() {
        let machine = Machine::builder()
            .states(["q0"])
            .initial("q0")
            .tape_alphabet([Symbol::from('a'), Symbol::Blank])
            .transition(
                key("q0", "a"),
                TransitionResult::new("q0", Symbol::Blank, Symbol::from('z'), Direction::Right),
            )
            .transition(
                key("q0", "y"),
                TransitionResult::new("q0", Symbol::Blank, Symbol::Blank, Direction::Right),
            )
            .build()
            .unwrap();

        assert_eq!(
            analyze(&machine),
            vec![Diagnostic::UnknownSymbols(vec![
                Symbol::from('y'),
                Symbol::from('z')
            ])]
        );
    }

    #[test]
    fn test_unknown_symbols_skipped_without_alphabet() {
        let machine = Machine::builder()
            .states(["q0"])
            .initial("q0")
            .transition(
                key("q0", "a"),
                TransitionResult::new("q0", Symbol::Blank, Symbol::from('z'), Direction::Right),
            )
            .build()
            .unwrap();

        assert!(analyze(&machine).is_empty());
    }
}
