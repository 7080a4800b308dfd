//! Candidate selection, TTL dedupe and per-endpoint rate-limiting.

pub mod candidate;
pub mod dedupe;
pub mod rate_limit;
pub mod repository;

pub use candidate::{Candidate, CandidateFilter};
pub use rate_limit::RateLimiter;
