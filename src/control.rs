//! Shared control core: decision engine, health state, poll gating, outcomes.

pub mod engine;
pub mod gate;
pub mod health;
pub mod outcome;

pub use engine::{decide, ControlAction, SpeedSetting, TemperatureReading};
pub use gate::PollGate;
pub use health::{HealthFlag, HealthState};
pub use outcome::{CommandStep, ControlError, Outcome};
