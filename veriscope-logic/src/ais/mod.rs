//! AIS ingestion: upstream client / simulation fallback, dedup, bounded queue,
//! and batch persistence.

pub mod client;
pub mod dedup;
pub mod ingestor;
pub mod message;
pub mod queue;
pub mod repository;
pub mod simulation;

pub use ingestor::{IngestMode, Ingestor, IngestorSnapshot};
pub use message::AisMessage;
