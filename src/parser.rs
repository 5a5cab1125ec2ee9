//! This module provides the parser for specification listings, utilizing the `pest` crate.
//! A listing is the human-readable form of a machine printed when no tape is given, and it
//! is also the format the built-in programs are written in.

use crate::types::{Bit, Direction, Machine, PenroseError, State, Transition};
use pest::{
    error::{Error, ErrorVariant},
    iterators::{Pair, Pairs},
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;
use std::collections::BTreeMap;

/// Derives a `PestParser` for the listing grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct ListingParser;

/// The two transitions of a state, filled in as entries are read.
type Slots = [Option<Transition>; 2];

/// Parses a specification listing into a `Machine`.
///
/// # Arguments
///
/// * `input` - Listing text, one `state read -> next write direction` entry per line.
///
/// # Returns
///
/// * `Ok(Machine)` if every state from 0 to the highest id defines both transitions once.
/// * `Err(PenroseError::ParseError)` for syntax errors and duplicate entries.
/// * `Err(PenroseError::ValidationError)` if a transition is missing.
/// * `Err(PenroseError::UnknownState)` if an entry points at a state that is not defined.
pub fn parse(input: &str) -> Result<Machine, PenroseError> {
    let mut pairs = ListingParser::parse(Rule::listing, input)
        .map_err(|e| PenroseError::ParseError(Box::new(e)))?;
    let Some(root) = pairs.next() else {
        return Err(PenroseError::ValidationError(
            "Listing defines no states".to_string(),
        ));
    };

    let mut table: BTreeMap<usize, Slots> = BTreeMap::new();
    for entry in root.into_inner() {
        if entry.as_rule() == Rule::entry {
            parse_entry(entry, &mut table)?;
        }
    }

    build_machine(table)
}

/// Parses one entry and stores its transition in `table`.
fn parse_entry(pair: Pair<Rule>, table: &mut BTreeMap<usize, Slots>) -> Result<(), PenroseError> {
    let span = pair.as_span();
    let mut pairs = pair.into_inner();

    let state = parse_state(&mut pairs)?;
    let read = parse_bit(&mut pairs)?;
    let next_state = parse_state(&mut pairs)?;
    let write = parse_bit(&mut pairs)?;
    let direction = parse_direction(&mut pairs)?;

    let slot = &mut table.entry(state).or_default()[read.value()];
    if slot.is_some() {
        return Err(parse_error(
            &format!("Duplicate transition for state {state:X} reading '{read}'"),
            span,
        ));
    }
    *slot = Some(Transition::new(write, direction, next_state));

    Ok(())
}

/// Turns the collected entries into a machine, requiring states `0..=max` to be complete.
fn build_machine(table: BTreeMap<usize, Slots>) -> Result<Machine, PenroseError> {
    let Some(&last) = table.keys().next_back() else {
        return Err(PenroseError::ValidationError(
            "Listing defines no states".to_string(),
        ));
    };

    let mut states = Vec::with_capacity(table.len());
    for id in 0..=last {
        let slots = table.get(&id).copied().unwrap_or_default();
        let [Some(on_read_0), Some(on_read_1)] = slots else {
            let read = if slots[0].is_none() { '0' } else { '1' };
            return Err(PenroseError::ValidationError(format!(
                "State {id:X} has no transition for reading '{read}'"
            )));
        };
        states.push(State::new(id, on_read_0, on_read_1));
    }

    Machine::new(states)
}

/// Creates a `PenroseError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> PenroseError {
    PenroseError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

/// Parses a hexadecimal state id from the current `Pair` in a `Pairs` iterator.
fn parse_state(pairs: &mut Pairs<Rule>) -> Result<usize, PenroseError> {
    let pair = next_pair(pairs, "state id")?;
    usize::from_str_radix(pair.as_str(), 16)
        .map_err(|_| parse_error("State id is too large", pair.as_span()))
}

fn parse_bit(pairs: &mut Pairs<Rule>) -> Result<Bit, PenroseError> {
    let pair = next_pair(pairs, "symbol")?;
    match pair.as_str() {
        "0" => Ok(Bit::Zero),
        "1" => Ok(Bit::One),
        other => Err(parse_error(
            &format!("Expected a symbol, found '{other}'"),
            pair.as_span(),
        )),
    }
}

/// Parses a direction. The grammar only admits `L`, `R` and `STOP`.
fn parse_direction(pairs: &mut Pairs<Rule>) -> Result<Direction, PenroseError> {
    let pair = next_pair(pairs, "direction")?;
    match pair.as_str() {
        "L" => Ok(Direction::Left),
        "R" => Ok(Direction::Right),
        "STOP" => Ok(Direction::Halt),
        other => Err(parse_error(
            &format!("Expected a direction, found '{other}'"),
            pair.as_span(),
        )),
    }
}

/// Takes the next `Pair`, failing if the entry ended early.
fn next_pair<'i>(pairs: &mut Pairs<'i, Rule>, what: &str) -> Result<Pair<'i, Rule>, PenroseError> {
    pairs
        .next()
        .ok_or_else(|| PenroseError::ValidationError(format!("Entry is missing its {what}")))
}
