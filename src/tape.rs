//! This module defines the `Tape`, a sparse tape that is unbounded in both directions.
//!
//! Only non-blank cells are stored. Writing the blank symbol removes the cell, so the
//! stored part of the tape stays finite and its bounds are always well defined.

use crate::types::{Direction, Symbol};
use std::collections::BTreeMap;

/// A sparse, bidirectionally unbounded tape with a single head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: BTreeMap<i64, Symbol>,
    blank: Symbol,
    head: i64,
}

impl Tape {
    /// Creates an empty tape with the head at position 0.
    pub fn new(blank: Symbol) -> Self {
        Self {
            cells: BTreeMap::new(),
            blank,
            head: 0,
        }
    }

    /// Creates a tape holding one symbol per character of `input`, starting at position 0.
    ///
    /// Characters equal to the blank symbol are left unstored.
    pub fn from_input(input: &str, blank: Symbol) -> Self {
        let mut tape = Self::new(blank);
        for (i, c) in input.chars().enumerate() {
            let symbol = Symbol::from(c);
            if symbol != tape.blank {
                tape.cells.insert(i as i64, symbol);
            }
        }
        tape
    }

    /// Returns the symbol under the head.
    pub fn read(&self) -> &Symbol {
        self.cells.get(&self.head).unwrap_or(&self.blank)
    }

    /// Writes `symbol` under the head. Writing blank clears the cell.
    pub fn write(&mut self, symbol: Symbol) {
        if symbol.is_blank() || symbol == self.blank {
            self.cells.remove(&self.head);
        } else {
            self.cells.insert(self.head, symbol);
        }
    }

    /// Moves the head one cell in `direction`.
    pub fn shift(&mut self, direction: Direction) {
        match direction {
            Direction::Left => self.head -= 1,
            Direction::Right => self.head += 1,
            Direction::Stay => {}
        }
    }

    pub fn head(&self) -> i64 {
        self.head
    }

    pub fn blank(&self) -> &Symbol {
        &self.blank
    }

    /// Returns the number of explicitly stored (non-blank) cells.
    pub fn stored(&self) -> usize {
        self.cells.len()
    }

    /// Returns the stored cells in position order.
    pub fn cells(&self) -> impl Iterator<Item = (i64, &Symbol)> {
        self.cells.iter().map(|(&pos, symbol)| (pos, symbol))
    }

    /// Returns the inclusive range of positions to render: every stored cell and the head.
    pub fn used_range(&self) -> (i64, i64) {
        let first = self.cells.keys().next().copied().unwrap_or(self.head);
        let last = self.cells.keys().next_back().copied().unwrap_or(self.head);
        (first.min(self.head), last.max(self.head))
    }

    /// Renders the used part of the tape, blank cells as `_`.
    pub fn render(&self) -> String {
        let (min, max) = self.used_range();
        (min..=max).map(|pos| self.symbol_at(pos).to_string()).collect()
    }

    /// Renders the used part of the tape with the head cell bracketed, e.g. ` a [b] c `.
    pub fn render_with_head(&self) -> String {
        let (min, max) = self.used_range();
        (min..=max)
            .map(|pos| {
                let symbol = self.symbol_at(pos);
                if pos == self.head {
                    format!("[{symbol}]")
                } else {
                    format!(" {symbol} ")
                }
            })
            .collect()
    }

    fn symbol_at(&self, pos: i64) -> &Symbol {
        self.cells.get(&pos).unwrap_or(&self.blank)
    }
}
