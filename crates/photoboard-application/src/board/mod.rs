//! The board application service: a single-writer actor with background
//! persistence and publish workers.

mod actor;
mod command;
mod service;
mod worker;


pub use service::{BoardDependencies, BoardService};
