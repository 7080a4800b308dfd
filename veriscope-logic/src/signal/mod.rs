//! Detectors, clustering, confidence scoring and idempotent signal upsert.

pub mod cluster;
pub mod confidence;
pub mod detectors;
pub mod engine;
pub mod explanation;
pub mod repository;

pub use engine::{evaluate_day, EvalSummary};
