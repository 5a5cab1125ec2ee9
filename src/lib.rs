//! This crate decodes Turing machines written in Penrose's compact binary encoding
//! (from "The Emperor's New Mind") and simulates them on a tape that grows on demand.
//! It includes modules for decoding and encoding specifications, running machines with a
//! two-pass trace strategy, parsing the human-readable listing, and a small catalogue of
//! built-in programs.

pub mod config;
pub mod encoder;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod tape;
pub mod trace;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the resource limit and verbosity configuration.
pub use config::{Limits, Verbosity};
/// Re-exports the encoding functions from the encoder module.
pub use encoder::{decode, encode, tokenize, Token};
/// Re-exports the `SourceLoader` struct from the loader module.
pub use loader::SourceLoader;
/// Re-exports the execution engine and its pass results.
pub use machine::{Configuration, Discovery, Replay, TuringMachine};
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports `Program`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{Program, ProgramManager, PROGRAMS};
/// Re-exports the growable tape.
pub use tape::{Bounds, Tape};
/// Re-exports the trace and listing renderers.
pub use trace::{render_listing, TraceLine};
/// Re-exports the machine table types and the crate error.
pub use types::{Bit, Direction, Input, Machine, PenroseError, State, Transition};
