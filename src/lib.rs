#![warn(missing_docs)]

//! # `solidus`
//!
//! A deductive solver for [Slant](https://en.wikipedia.org/wiki/Gokigen_Naname)
//! (Gokigen Naname) puzzles: place `╱` or `╲` in every cell of a grid so
//! that each numbered lattice point touches exactly that many diagonals and
//! the diagonals never close a loop.
//! Begin by building a board with a [`SlantBoardBuilder`](builder::SlantBoardBuilder),
//! from explicit clues or from the collection's run-length description
//! format, then call [`solve()`](Board::solve) and read the ordered move
//! log back off the board.
//!
//! # Internals
//!
//! This crate is driven by incremental constraint propagation rather than
//! search: a worklist of unsolved lattice points and cells is drained to
//! quiescence, applying local degree deductions (saturation, the
//! diagonal 1-vs-1 exclusion, parallel-pair transport through chains of
//! 2-clues) at each point. A cycle oracle over the induced connection
//! graph rejects any assignment that would close a loop. Where no rule
//! fires, the solver marks the move log, speculatively assigns one cell,
//! propagates, and rolls back; a contradiction under one orientation
//! commits the other. The engine is deterministic — identical input yields
//! an identical move log — and incomplete by design: hard puzzles may
//! stall rather than branch into full search.

pub use board::Board;
pub use builder::SlantBoardBuilder;
pub use cell::{Coord, Dimension, Location, Slash};
pub use solver::{Contradiction, SolveOptions, SolveStatus};

pub(crate) mod board;
mod tests;
pub(crate) mod cell;
pub(crate) mod rules;
pub(crate) mod solver;
pub(crate) mod step;
pub mod builder;
