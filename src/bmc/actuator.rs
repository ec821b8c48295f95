//! Fan actuator: the command sequences behind applySpeed and restoreDefault.

use std::sync::Arc;

use tracing::info;

use crate::bmc::channel::CommandChannel;
use crate::bmc::{DISABLE_MANUAL_CONTROL, ENABLE_MANUAL_CONTROL, SET_DUTY_CYCLE};
use crate::control::{CommandStep, ControlError, SpeedSetting};

pub struct FanActuator {
    channel: Arc<dyn CommandChannel>,
}

impl FanActuator {
    pub fn new(channel: Arc<dyn CommandChannel>) -> Self {
        Self { channel }
    }

    /// Two strictly sequential steps: enable manual control, then set the
    /// duty cycle. Manual-control-enable is a precondition for the duty cycle
    /// to take effect, so a first-step failure aborts the second.
    pub async fn apply_speed(&self, speed: SpeedSetting) -> Result<(), ControlError> {
        self.channel.run_raw(ENABLE_MANUAL_CONTROL).await.map_err(|source| {
            ControlError::Command { step: CommandStep::EnableManualControl, source }
        })?;

        let payload = format!("{} {}", SET_DUTY_CYCLE, speed.duty_cycle_hex());
        self.channel.run_raw(&payload).await.map_err(|source| {
            ControlError::Command { step: CommandStep::SetDutyCycle, source }
        })?;

        info!("The speed of fan has been set to {}%", speed.percent());
        Ok(())
    }

    /// Single step: hand fan control back to the BMC. Idempotent; does not
    /// depend on whether manual control was ever enabled.
    pub async fn restore_default(&self) -> Result<(), ControlError> {
        self.channel.run_raw(DISABLE_MANUAL_CONTROL).await.map_err(|source| {
            ControlError::Command { step: CommandStep::DisableManualControl, source }
        })?;

        info!("Fan has been set to default speed");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every raw payload; fails any payload containing `fail_on`.
    pub(crate) struct MockChannel {
        pub calls: Mutex<Vec<String>>,
        pub fail_on: Option<&'static str>,
    }

    impl MockChannel {
        pub fn ok() -> Arc<Self> {
            Arc::new(Self { calls: Mutex::new(Vec::new()), fail_on: None })
        }

        pub fn failing_on(needle: &'static str) -> Arc<Self> {
            Arc::new(Self { calls: Mutex::new(Vec::new()), fail_on: Some(needle) })
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandChannel for MockChannel {
        async fn run_raw(&self, bytes: &str) -> Result<()> {
            self.calls.lock().unwrap().push(bytes.to_string());
            if let Some(needle) = self.fail_on {
                if bytes.contains(needle) {
                    return Err(anyhow!("ipmitool raw failed: injected fault"));
                }
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn apply_speed_runs_both_steps_in_order() {
        let channel = MockChannel::ok();
        let actuator = FanActuator::new(channel.clone());

        actuator.apply_speed(SpeedSetting::new(30).unwrap()).await.unwrap();

        assert_eq!(
            channel.calls(),
            vec![ENABLE_MANUAL_CONTROL.to_string(), format!("{SET_DUTY_CYCLE} 0x1e")]
        );
    }

    #[tokio::test]
    async fn enable_failure_aborts_duty_cycle_step() {
        let channel = MockChannel::failing_on("0x01 0x00");
        let actuator = FanActuator::new(channel.clone());

        let err = actuator.apply_speed(SpeedSetting::new(40).unwrap()).await.unwrap_err();
        assert!(matches!(
            err,
            ControlError::Command { step: CommandStep::EnableManualControl, .. }
        ));
        // The duty-cycle command is never issued after a failed enable.
        assert_eq!(channel.calls().len(), 1);
    }

    #[tokio::test]
    async fn restore_default_is_idempotent() {
        let channel = MockChannel::ok();
        let actuator = FanActuator::new(channel.clone());

        actuator.restore_default().await.unwrap();
        actuator.restore_default().await.unwrap();

        assert_eq!(
            channel.calls(),
            vec![DISABLE_MANUAL_CONTROL.to_string(), DISABLE_MANUAL_CONTROL.to_string()]
        );
    }
}
