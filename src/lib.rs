//! Hex Shape Packer Library
//!
//! Packs named polyhex shapes onto a bounded hexagonal board by exhaustive
//! backtracking over translations and the six 60° rotations of each shape.

pub mod board;
pub mod catalog;
pub mod config;
pub mod error;
pub mod geometry;
pub mod persistence;
pub mod shape;
pub mod solver;

pub use board::{format_board, Board, CellRecord, CellState};
pub use catalog::Catalog;
pub use error::{Error, IntegrityError, ParseError, Result};
pub use shape::{Color, Coord, Shape};
pub use solver::{
    place_shapes, solve, solve_with, ChannelStepper, NoopObserver, Outcome, Placement,
    SearchStats, SolveRequest, SolveResult, StepController, StepObserver,
};
