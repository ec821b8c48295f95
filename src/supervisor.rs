//! Remote supervisor: polls a managed node and takes over its fan decisions
//! only while that node reports itself unhealthy.
//!
//! "Master" and "checker" deployments are two instances of this same role,
//! each driving its own hardware command channel.

pub mod client;

pub use client::HttpNodeQuery;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::bmc::FanActuator;
use crate::control::{decide, ControlAction, ControlError, Outcome, PollGate, TemperatureReading};

/// Below this temperature the supervisor re-arms the node's own loop
/// before it even looks at the health flag.
pub const RESUME_THRESHOLD: i64 = 50;

/// Seam between the supervisor and the node's query interface.
#[async_trait]
pub trait NodeQuery: Send + Sync {
    /// Fails with `Unreachable` on timeout or connect failure; a supervisor
    /// cannot assert anything about health it did not observe.
    async fn temperature(&self) -> Result<TemperatureReading, ControlError>;

    /// Resume the node's loop (the node also resets its health flag).
    async fn start_polling(&self) -> Result<bool, ControlError>;
}

pub struct Supervisor {
    node: Arc<dyn NodeQuery>,
    actuator: FanActuator,
    gate: PollGate,
    offset: i64,
}

impl Supervisor {
    pub fn new(node: Arc<dyn NodeQuery>, actuator: FanActuator, offset: i64) -> Self {
        Self { node, actuator, gate: PollGate::new(), offset }
    }

    pub fn gate(&self) -> &PollGate {
        &self.gate
    }

    /// One supervision cycle. Any failure is contained here: the supervisor
    /// attempts its own default-speed recovery and appends that outcome to
    /// the original failure message.
    pub async fn run_cycle(&self) -> Outcome {
        match self.cycle_inner().await {
            Ok(outcome) => outcome,
            Err(err) => {
                let mut outcome =
                    Outcome::failure(format!("Operate failed, {}", err.chain_message()));
                match self.actuator.restore_default().await {
                    Ok(()) => outcome.append("Fan has been set to default speed"),
                    Err(recovery) => outcome.append(&recovery.chain_message()),
                }
                outcome
            }
        }
    }

    async fn cycle_inner(&self) -> Result<Outcome, ControlError> {
        let reading = self.node.temperature().await?;

        // Observed-behavior quirk kept on purpose: the resume side effect
        // fires for any cool reading, before the bypass check.
        if reading.max_celsius < RESUME_THRESHOLD {
            if let Err(err) = self.node.start_polling().await {
                warn!("Could not resume node loop: {}", err.chain_message());
            }
        }

        match decide(reading, true, self.offset) {
            ControlAction::Bypass => Ok(Outcome::success(format!(
                "Node is healthy with cpu temp: {}, bypass operate",
                reading.max_celsius
            ))),
            ControlAction::SetSpeed(speed) => {
                debug!("Node is not stable, supervisor takes control of fan speed");
                self.actuator.apply_speed(speed).await?;
                Ok(Outcome::success(format!(
                    "CPU Temp: {} - The speed of fan has been set to {}%",
                    reading.max_celsius,
                    speed.percent()
                )))
            }
            ControlAction::RestoreDefault => {
                debug!("Node is not stable, supervisor takes control of fan speed");
                self.actuator.restore_default().await?;
                Ok(Outcome::success(format!(
                    "CPU Temp: {} - Fan has been set to default speed",
                    reading.max_celsius
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::bmc::actuator::tests::MockChannel;
    use crate::bmc::{DISABLE_MANUAL_CONTROL, ENABLE_MANUAL_CONTROL};

    struct MockNode {
        reply: Result<TemperatureReading, &'static str>,
        start_calls: AtomicUsize,
    }

    impl MockNode {
        fn reading(max_celsius: i64, healthy: bool) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(TemperatureReading { max_celsius, healthy }),
                start_calls: AtomicUsize::new(0),
            })
        }

        fn unreachable() -> Arc<Self> {
            Arc::new(Self {
                reply: Err("query timed out"),
                start_calls: AtomicUsize::new(0),
            })
        }

        fn start_calls(&self) -> usize {
            self.start_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl NodeQuery for MockNode {
        async fn temperature(&self) -> Result<TemperatureReading, ControlError> {
            self.reply
                .clone()
                .map_err(|msg| ControlError::Unreachable(msg.to_string()))
        }

        async fn start_polling(&self) -> Result<bool, ControlError> {
            self.start_calls.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        }
    }

    fn supervisor(node: Arc<MockNode>, channel: Arc<MockChannel>) -> Supervisor {
        Supervisor::new(node, FanActuator::new(channel), 15)
    }

    #[tokio::test]
    async fn healthy_node_is_bypassed_without_hardware_action() {
        let node = MockNode::reading(45, true);
        let channel = MockChannel::ok();

        let outcome = supervisor(node.clone(), channel.clone()).run_cycle().await;

        assert!(outcome.succeeded);
        assert!(outcome.message.contains("bypass"));
        assert!(channel.calls().is_empty());
        // Cool reading: the resume side effect still fired before the bypass.
        assert_eq!(node.start_calls(), 1);
    }

    #[tokio::test]
    async fn warm_healthy_node_skips_resume_but_still_bypasses() {
        let node = MockNode::reading(60, true);
        let channel = MockChannel::ok();

        let outcome = supervisor(node.clone(), channel.clone()).run_cycle().await;

        assert!(outcome.succeeded);
        assert!(channel.calls().is_empty());
        assert_eq!(node.start_calls(), 0);
    }

    #[tokio::test]
    async fn unhealthy_node_gets_proportional_takeover() {
        let node = MockNode::reading(45, false);
        let channel = MockChannel::ok();

        let outcome = supervisor(node, channel.clone()).run_cycle().await;

        assert!(outcome.succeeded);
        let calls = channel.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], ENABLE_MANUAL_CONTROL);
        assert!(calls[1].ends_with("0x1e"));
    }

    #[tokio::test]
    async fn unhealthy_hot_node_gets_safety_reset() {
        let node = MockNode::reading(75, false);
        let channel = MockChannel::ok();

        let outcome = supervisor(node, channel.clone()).run_cycle().await;

        assert!(outcome.succeeded);
        assert_eq!(channel.calls(), vec![DISABLE_MANUAL_CONTROL.to_string()]);
    }

    #[tokio::test]
    async fn unreachable_node_fails_tick_with_recovery_only() {
        let node = MockNode::unreachable();
        let channel = MockChannel::ok();

        let outcome = supervisor(node.clone(), channel.clone()).run_cycle().await;

        assert!(!outcome.succeeded);
        assert!(outcome.message.contains("query timed out"));
        assert!(outcome.message.contains("Fan has been set to default speed"));
        // Recovery on the supervisor's own channel, nothing sent to the node.
        assert_eq!(channel.calls(), vec![DISABLE_MANUAL_CONTROL.to_string()]);
        assert_eq!(node.start_calls(), 0);
    }

    #[tokio::test]
    async fn takeover_failure_appends_recovery_message() {
        let node = MockNode::reading(45, false);
        let channel = MockChannel::failing_on("0x02 0xff");

        let outcome = supervisor(node, channel.clone()).run_cycle().await;

        assert!(!outcome.succeeded);
        assert!(outcome.message.contains("set fan duty cycle failed"));
        assert!(outcome.message.contains("Fan has been set to default speed"));
        // enable, failed set, then the compensating disable
        assert_eq!(channel.calls().len(), 3);
    }
}
