//! Daily aggregates and 30-day rolling baselines per port.

pub mod builder;

pub use builder::build_for_day;
