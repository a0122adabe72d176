//! Diffing incoming board snapshots against the current store.

pub mod engine;
pub mod plan;

pub use engine::ReconciliationEngine;
pub use plan::{Directive, MutationPlan};
