//! Local controller: owns the node's health flag and poll gate, samples the
//! sensor gateway, and drives the node's own BMC channel.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::bmc::FanActuator;
use crate::control::{
    decide, ControlAction, ControlError, HealthFlag, HealthState, Outcome, PollGate,
    SpeedSetting, TemperatureReading,
};
use crate::node::service::TemperatureReport;
use crate::sensor::{max_core_temperature, SensorSource};

pub struct LocalController {
    sensor: Arc<dyn SensorSource>,
    actuator: FanActuator,
    health: HealthFlag,
    gate: PollGate,
    offset: i64,
}

impl LocalController {
    pub fn new(sensor: Arc<dyn SensorSource>, actuator: FanActuator, offset: i64) -> Self {
        Self {
            sensor,
            actuator,
            health: HealthFlag::new(),
            gate: PollGate::new(),
            offset,
        }
    }

    pub fn gate(&self) -> &PollGate {
        &self.gate
    }

    pub fn is_healthy(&self) -> bool {
        self.health.is_healthy()
    }

    async fn sample_temperature(&self) -> Result<TemperatureReading, ControlError> {
        let root = self.sensor.fetch().await?;
        let max_celsius = max_core_temperature(&root)?;
        Ok(TemperatureReading { max_celsius, healthy: self.health.is_healthy() })
    }

    /// Query surface behind GET /temperature. A failed sample degrades the
    /// node; the failure itself stays inside the structured report.
    pub async fn query_temperature(&self) -> TemperatureReport {
        match self.sample_temperature().await {
            Ok(reading) => TemperatureReport {
                status: true,
                temperature: Some(reading.max_celsius),
                healthy: reading.healthy,
                message: String::new(),
            },
            Err(err) => {
                self.health.degrade();
                warn!("Temperature query failed: {}", err.chain_message());
                TemperatureReport {
                    status: false,
                    temperature: None,
                    healthy: false,
                    message: err.chain_message(),
                }
            }
        }
    }

    /// Explicit duty cycle from an external request; the payload may carry
    /// the speed as a number or a numeric string.
    pub async fn apply_speed_value(&self, value: &serde_json::Value) -> Outcome {
        match SpeedSetting::from_value(value) {
            Ok(speed) => self.apply_speed(speed).await,
            Err(err) => {
                self.health.degrade();
                Outcome::from_error(&err)
            }
        }
    }

    pub async fn apply_speed(&self, speed: SpeedSetting) -> Outcome {
        match self.actuator.apply_speed(speed).await {
            Ok(()) => Outcome::success(format!(
                "The speed of fan has been set to {}%",
                speed.percent()
            )),
            Err(err) => {
                self.health.degrade();
                Outcome::from_error(&err)
            }
        }
    }

    pub async fn restore_default(&self) -> Outcome {
        match self.actuator.restore_default().await {
            Ok(()) => Outcome::success("Fan has been set to default speed"),
            Err(err) => {
                self.health.degrade();
                Outcome::from_error(&err)
            }
        }
    }

    /// Resume the scheduled loop and assert a freshly healthy state; the
    /// coupling is deliberate, a supervisor resuming the loop vouches for
    /// the node. Returns true if the loop was suspended.
    pub fn start_polling(&self) -> bool {
        self.health.restore();
        self.gate.resume()
    }

    /// Returns true if the loop was active.
    pub fn stop_polling(&self) -> bool {
        self.gate.suspend()
    }

    /// One scheduled poll-and-decide cycle.
    pub async fn run_cycle(&self) -> Outcome {
        if self.health.state() == HealthState::Degraded {
            // Self-suspension: a degraded node must not fight the supervisor
            // that has taken over its fans.
            let was_active = self.stop_polling();
            debug!("Loop suspension on degraded health (was_active={})", was_active);
            let mut outcome = Outcome::failure(
                "This node is not healthy, stop job and wait for a supervisor to set normal",
            );
            outcome.append(&self.restore_default().await.message);
            return outcome;
        }

        match self.cycle_inner().await {
            Ok(outcome) => outcome,
            Err(err) => {
                self.health.degrade();
                let mut outcome =
                    Outcome::failure(format!("Operate failed, {}", err.chain_message()));
                outcome.append(&self.actuate_recovery().await);
                outcome
            }
        }
    }

    async fn cycle_inner(&self) -> Result<Outcome, ControlError> {
        let reading = self.sample_temperature().await?;

        // The local controller never bypasses on its own reading.
        match decide(reading, false, self.offset) {
            ControlAction::SetSpeed(speed) => {
                self.actuator.apply_speed(speed).await?;
                // Only a fully successful proportional sequence re-asserts health.
                self.health.restore();
                Ok(Outcome::success(format!(
                    "CPU Temp: {} - The speed of fan has been set to {}%",
                    reading.max_celsius,
                    speed.percent()
                )))
            }
            ControlAction::RestoreDefault => {
                self.actuator.restore_default().await?;
                Ok(Outcome::success(format!(
                    "CPU Temp: {} - Fan has been set to default speed",
                    reading.max_celsius
                )))
            }
            ControlAction::Bypass => Ok(Outcome::success("bypass")),
        }
    }

    /// Compensating action after a failed cycle; its own outcome message is
    /// appended to the failure, whatever it is.
    async fn actuate_recovery(&self) -> String {
        match self.actuator.restore_default().await {
            Ok(()) => "Fan has been set to default speed".to_string(),
            Err(err) => err.chain_message(),
        }
    }
}
