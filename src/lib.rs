//! Breadth- and depth-first solver for sliding-block puzzles such as Klotski
//! (Huarongdao).
//!
//! Tiles are rectangles on a fixed grid. A move shifts one tile by one cell
//! north, east, south or west, never off the board and never onto another
//! tile. A [`Solver`] searches for a sequence of moves that brings one tile to
//! a target cell.
//!
//! ```
//! use klotski_solver::{BoardState, Goal, Method, Solver, Tile, TileMode};
//!
//! let board = BoardState::new([(Tile::new("cao", 2, 2), (0, 0))], 3, 3, TileMode::Distinct)?;
//! let mut solver = Solver::new(board, Goal::new("cao", (1, 1)), Method::Bfs)?;
//! let outcome = solver.solve();
//! let labels: Vec<String> = outcome.path().unwrap().moves().map(|m| m.to_string()).collect();
//! assert_eq!(labels, ["cao-E", "cao-S"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use self::{
    board::*,
    error::*,
    layout::{parse_layout, Puzzle},
    solver::*,
    tile::*,
};

mod board;
mod error;
pub mod layout;
mod solver;
mod tile;
