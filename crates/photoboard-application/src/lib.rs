//! Application layer for PhotoBoard.
//!
//! Coordinates the domain (area store, reconciliation) with persistence,
//! the remote channel and media collaborators.

pub mod board;

pub use board::{BoardDependencies, BoardService};
