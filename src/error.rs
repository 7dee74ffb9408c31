//! Error types shared by both solvers.
//!
//! Malformed input and exceeded capacities are hard errors. An infeasible
//! region is not an error; it simply does not count.

use std::collections::TryReserveError;

use thiserror::Error;

/// Input that does not follow the expected line format.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: expected '<x>,<y>,<z>', got '{text}'")]
    BadPoint { line: usize, text: String },
    #[error("line {line}: invalid glyph character {ch:?} in '{text}'")]
    InvalidGlyph { line: usize, ch: char, text: String },
    #[error("line {line}: glyph row outside of any shape: '{text}'")]
    OrphanRow { line: usize, text: String },
    #[error("line {line}: bad region specification '{text}'")]
    BadRegion { line: usize, text: String },
    #[error("line {line}: duplicate shape id {id}")]
    DuplicateShape { line: usize, id: usize },
    #[error("shape {id} has no cells")]
    EmptyShape { id: usize },
    #[error("shape id {id} is missing; ids must run densely from 0")]
    MissingShape { id: usize },
    #[error("line {line}: region lists {found} counts but only {shapes} shapes are defined")]
    TooManyCounts {
        line: usize,
        found: usize,
        shapes: usize,
    },
    #[error("no shapes defined")]
    NoShapes,
    #[error("need at least two points, got {0}")]
    TooFewPoints(usize),
}

/// A fixed limit of the packed representations was exceeded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CapacityError {
    #[error("shape id {id} exceeds the limit of {max} shapes")]
    TooManyShapes { id: usize, max: usize },
    #[error("shape {id} has more than {max} cells")]
    TooManyCells { id: usize, max: usize },
    #[error("more than {max} regions")]
    TooManyRegions { max: usize },
    #[error("board {width}x{height} needs more than {max_words} mask words")]
    BoardTooLarge {
        width: usize,
        height: usize,
        max_words: usize,
    },
    #[error("more than {max} points")]
    TooManyPoints { max: usize },
}

/// Umbrella error returned by the library entry points.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error")]
    Io(#[from] std::io::Error),
    #[error("could not parse input")]
    Parse(#[from] ParseError),
    #[error("capacity exceeded")]
    Capacity(#[from] CapacityError),
    #[error("out of memory while building placements")]
    OutOfMemory(#[from] TryReserveError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
