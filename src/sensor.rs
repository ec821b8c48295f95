//! Sensor gateway client and temperature-reading normalization.

pub mod gateway;
pub mod reading;

pub use gateway::{HttpSensorGateway, SensorSource};
pub use reading::{max_core_temperature, TelemetryNode};
