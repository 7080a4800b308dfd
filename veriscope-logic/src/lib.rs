#[macro_use]
extern crate lazy_static;

pub mod ais;
pub mod alert;
pub mod baseline;
pub mod delivery;
pub mod dispatcher;
pub mod geo;
pub mod metrics;
pub mod port_call;
pub mod settings;
pub mod signal;
pub mod types;
