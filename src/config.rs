//! Configuration structs, defaults, and JSON persistence.

pub mod persistence;
pub mod types;

pub use persistence::{load_config, save_config};
pub use types::{BmcSettings, Config, ControlSettings, NodeSettings, SensorSettings, SupervisorSettings};
