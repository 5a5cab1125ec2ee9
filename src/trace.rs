//! Text renderings of machines and executions: the fixed-width trace line and the
//! specification listing.

use crate::types::{cell_char, Bit, Machine};
use std::fmt;

/// One line of an execution trace: a snapshot of the tape with the head cell bracketed.
///
/// ```text
///     0     0: 1 1 1
///     1     0:|1|1 1
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TraceLine<'t> {
    /// The step that produced this snapshot, `0` for the initial configuration.
    pub step: Option<u64>,
    /// The state that executed the step.
    pub state: Option<usize>,
    pub cells: &'t [Option<Bit>],
    /// Physical index of the head cell within `cells`.
    pub head: usize,
}

impl fmt::Display for TraceLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.step {
            Some(step) => write!(f, "{step:>5} ")?,
            None => f.write_str("      ")?,
        }
        match self.state {
            Some(state) => write!(f, "{state:>5X}:")?,
            None => f.write_str("     :")?,
        }

        // A pipe marks a head that has moved at least once.
        let delimiter = match self.step {
            Some(step) if step > 0 => '|',
            _ => ' ',
        };

        for cell in &self.cells[..self.head] {
            write!(f, " {}", cell_char(*cell))?;
        }
        write!(
            f,
            "{delimiter}{}{delimiter}",
            cell_char(self.cells[self.head])
        )?;
        for cell in &self.cells[self.head + 1..] {
            write!(f, "{} ", cell_char(*cell))?;
        }

        Ok(())
    }
}

/// Renders the transition table, one line per state and read symbol.
///
/// ```text
///     0 0 ->     0 0 R
///     0 1 ->     1 1 R
/// ```
pub fn render_listing(machine: &Machine) -> String {
    let mut listing = String::new();
    for state in machine.states() {
        for (read, transition) in state.transitions() {
            listing.push_str(&format!(
                "{:>5X} {} -> {:>5X} {} {}\n",
                state.id, read, transition.next_state, transition.write, transition.direction
            ));
        }
    }
    listing
}
