//! Error taxonomy and the structured outcome returned by every public operation.
//!
//! Nothing here panics its way up to the scheduler: controllers convert
//! `ControlError` into an `Outcome` at the operation boundary, and nested
//! failure messages are accumulated (", "-joined) rather than replaced so a
//! recovery attempt never hides the original fault.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which step of a hardware command sequence failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStep {
    EnableManualControl,
    SetDutyCycle,
    DisableManualControl,
}

impl std::fmt::Display for CommandStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CommandStep::EnableManualControl => "enable manual fan control",
            CommandStep::SetDutyCycle => "set fan duty cycle",
            CommandStep::DisableManualControl => "disable manual fan control",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ControlError {
    /// Sensor gateway unreachable, non-200, or malformed payload.
    #[error("sensor gateway error: {0}")]
    Sensor(String),

    /// The telemetry tree carried no per-core temperature entries.
    #[error("sensor returned no core temperature entries")]
    EmptyReading,

    /// A retained per-core value did not parse as a number.
    #[error("temperature of {core} is not a number")]
    InvalidReading { core: String },

    /// Speed outside [20, 100] or not a number. Never retried, never clamped.
    #[error("speed '{value}' is invalid, speed must be a number between 20 and 100")]
    Validation { value: String },

    /// A hardware channel step failed; the sequence stops at this step.
    #[error("{step} failed")]
    Command {
        step: CommandStep,
        #[source]
        source: anyhow::Error,
    },

    /// Supervisor-to-node query timed out or could not connect. Affects only
    /// the supervisor's own tick; the target node's health is never touched.
    #[error("node query failed: {0}")]
    Unreachable(String),
}

impl ControlError {
    /// Render the full cause chain as one human-readable line.
    pub fn chain_message(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            message.push_str(", ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}

/// Result of one public operation or poll cycle: status plus diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    pub succeeded: bool,
    pub message: String,
}

impl Outcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self { succeeded: true, message: message.into() }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self { succeeded: false, message: message.into() }
    }

    pub fn from_error(err: &ControlError) -> Self {
        Self::failure(err.chain_message())
    }

    /// Append further context, keeping whatever is already there.
    pub fn append(&mut self, more: &str) {
        if more.is_empty() {
            return;
        }
        if !self.message.is_empty() {
            self.message.push_str(", ");
        }
        self.message.push_str(more);
    }
}
