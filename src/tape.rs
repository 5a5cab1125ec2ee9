//! The working tape of a machine: a finite buffer standing in for a bi-infinite tape.
//!
//! Positions are logical offsets from the cell the head started on, so the physical layout
//! of the buffer can change on growth without disturbing the machine's view of it.

use crate::types::{cell_char, Bit};
use tracing::debug;

/// Number of blank cells added by the first growth event. Doubles after every growth.
pub const INITIAL_EXPANSION: usize = 1024;

/// The minimum and maximum head offsets seen, relative to the starting cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min: isize,
    pub max: isize,
}

impl Bounds {
    /// Bounds covering only the starting cell.
    pub fn origin() -> Self {
        Self { min: 0, max: 0 }
    }

    /// Bounds covering the initial content of a tape of `len` cells.
    pub fn spanning(len: usize) -> Self {
        Self {
            min: 0,
            max: to_offset(len.max(1)) - 1,
        }
    }

    /// Widens the bounds to include `position`.
    pub fn include(&mut self, position: isize) {
        self.min = self.min.min(position);
        self.max = self.max.max(position);
    }

    pub fn contains(&self, position: isize) -> bool {
        self.min <= position && position <= self.max
    }

    /// Number of cells between `min` and `max`, inclusive.
    pub fn width(&self) -> usize {
        (self.max - self.min).unsigned_abs() + 1
    }
}

fn to_offset(len: usize) -> isize {
    isize::try_from(len).unwrap_or(isize::MAX)
}

/// A growable tape of cells over `{0, 1, blank}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: Vec<Option<Bit>>,
    /// Physical index of logical position 0.
    origin: usize,
    expansion: usize,
    growths: usize,
}

impl Tape {
    /// Creates a tape holding `initial`. An empty tape is a single blank cell.
    pub fn new(initial: &[Bit]) -> Self {
        let mut cells: Vec<Option<Bit>> = initial.iter().copied().map(Some).collect();
        if cells.is_empty() {
            cells.push(None);
        }

        Self {
            cells,
            origin: 0,
            expansion: INITIAL_EXPANSION,
            growths: 0,
        }
    }

    /// Creates a tape sized exactly to `bounds`, with `initial` starting at position 0.
    ///
    /// `bounds` must include position 0 and the whole of `initial`.
    pub fn with_bounds(initial: &[Bit], bounds: Bounds) -> Self {
        let mut cells = vec![None; bounds.width()];
        let origin = bounds.min.unsigned_abs();
        for (cell, bit) in cells[origin..].iter_mut().zip(initial) {
            *cell = Some(*bit);
        }

        Self {
            cells,
            origin,
            expansion: INITIAL_EXPANSION,
            growths: 0,
        }
    }

    /// Number of allocated cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of growth events so far.
    pub fn growths(&self) -> usize {
        self.growths
    }

    /// The allocated cells, leftmost first.
    pub fn cells(&self) -> &[Option<Bit>] {
        &self.cells
    }

    /// The logical positions currently backed by the buffer.
    pub fn bounds(&self) -> Bounds {
        let min = -to_offset(self.origin);
        Bounds {
            min,
            max: min + to_offset(self.cells.len()) - 1,
        }
    }

    /// Physical buffer index of a logical position. The position must be in bounds.
    pub fn index(&self, position: isize) -> usize {
        self.origin.wrapping_add_signed(position)
    }

    pub fn read(&self, position: isize) -> Option<Bit> {
        self.cells[self.index(position)]
    }

    pub fn write(&mut self, position: isize, bit: Bit) {
        let index = self.index(position);
        self.cells[index] = Some(bit);
    }

    /// Grows the buffer until `position` is backed by a cell.
    pub fn reserve(&mut self, position: isize) {
        while !self.bounds().contains(position) {
            if position < 0 {
                let mut grown = vec![None; self.expansion];
                grown.extend_from_slice(&self.cells);
                self.cells = grown;
                self.origin += self.expansion;
            } else {
                self.cells.resize(self.cells.len() + self.expansion, None);
            }

            self.growths += 1;
            self.expansion *= 2;
            debug!(len = self.cells.len(), position, "grew tape");
        }
    }

    /// The machine's answer: the run of non-blank cells ending at `position`, extending
    /// left up to the first blank or the start of the tape.
    pub fn answer(&self, position: isize) -> String {
        let end = self.index(position);
        let start = self.cells[..=end]
            .iter()
            .rposition(Option::is_none)
            .map_or(0, |blank| blank + 1);

        self.cells[start..=end]
            .iter()
            .map(|cell| cell_char(*cell))
            .collect()
    }
}
