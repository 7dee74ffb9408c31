//! Polyomino Packing and Circuit Wiring Solvers
//!
//! Provides the two puzzle cores behind the `polypack` binary:
//!
//! - Region tiling: given a library of polyomino shapes and a list of
//!   rectangular regions, decide which regions can be tiled by the demanded
//!   multiset of shapes (rotations and reflections allowed).
//! - Circuit wiring: connect 3D junction boxes shortest-pair first and
//!   report circuit sizes and the edge that completes a single circuit.

pub mod circuits;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod parity;
pub mod pieces;
pub mod placement;
pub mod solver;

pub use error::{Error, Result};
pub use pieces::{Puzzle, Region, Shape};
pub use solver::{count_tileable, solve_region, Fill, SolverOptions, Tiling};
