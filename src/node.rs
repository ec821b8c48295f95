//! The managed node: local controller plus its HTTP query interface.

pub mod controller;
pub mod service;

pub use controller::LocalController;
pub use service::{router, PollingReply, TemperatureReport};
