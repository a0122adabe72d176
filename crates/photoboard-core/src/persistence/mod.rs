//! Persistence port.

pub mod repository;

pub use repository::{BoardRepository, MigrationOutcome};
