//! A catalogue of built-in machines, written as listings and embedded at compile time.

use crate::parser::parse;
use crate::types::{Machine, PenroseError};
use tracing::warn;

// Embedded programs: (name, description, listing)
const PROGRAM_TEXTS: [(&str, &str, &str); 2] = [
    (
        "unary-increment",
        "Penrose's UN+1: adds one to a unary number",
        include_str!("../programs/unary-increment.tm"),
    ),
    (
        "unary-add",
        "Adds two unary numbers separated by a single 0",
        include_str!("../programs/unary-add.tm"),
    ),
];

/// A built-in machine.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub name: &'static str,
    pub description: &'static str,
    pub machine: Machine,
}

lazy_static::lazy_static! {
    pub static ref PROGRAMS: Vec<Program> = PROGRAM_TEXTS
        .iter()
        .filter_map(|&(name, description, listing)| match parse(listing) {
            Ok(machine) => Some(Program { name, description, machine }),
            Err(e) => {
                warn!(program = name, error = %e, "failed to parse built-in program");
                None
            }
        })
        .collect();
}

pub struct ProgramManager;

impl ProgramManager {
    /// Get a program by its name
    pub fn get_program_by_name(name: &str) -> Result<&'static Program, PenroseError> {
        PROGRAMS
            .iter()
            .find(|program| program.name == name)
            .ok_or_else(|| {
                PenroseError::InvalidConfig(format!(
                    "Unknown program '{}'; available: {}",
                    name,
                    Self::list_program_names().join(", ")
                ))
            })
    }

    /// Get the names of all programs
    pub fn list_program_names() -> Vec<&'static str> {
        PROGRAMS.iter().map(|program| program.name).collect()
    }
}
