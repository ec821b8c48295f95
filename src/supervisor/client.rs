//! HTTP client for the node query interface, with a bounded timeout.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::config::SupervisorSettings;
use crate::control::{ControlError, TemperatureReading};
use crate::node::{PollingReply, TemperatureReport};
use crate::supervisor::NodeQuery;

pub struct HttpNodeQuery {
    client: reqwest::Client,
    base_url: String,
}

impl HttpNodeQuery {
    pub fn new(settings: &SupervisorSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs_f64(settings.query_timeout_secs))
            .build()
            .context("Failed to build node query HTTP client")?;
        Ok(Self {
            client,
            base_url: settings.node_url.trim_end_matches('/').to_string(),
        })
    }

    fn transport_error(err: reqwest::Error) -> ControlError {
        if err.is_timeout() {
            ControlError::Unreachable(format!("query timed out: {err}"))
        } else {
            ControlError::Unreachable(format!("cannot reach node: {err}"))
        }
    }
}

#[async_trait]
impl NodeQuery for HttpNodeQuery {
    async fn temperature(&self) -> Result<TemperatureReading, ControlError> {
        let response = self
            .client
            .get(format!("{}/temperature", self.base_url))
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ControlError::Unreachable(format!("node returned HTTP {status}")));
        }

        let report: TemperatureReport = response
            .json()
            .await
            .map_err(|e| ControlError::Unreachable(format!("malformed node reply: {e}")))?;

        // The node reported a failed sample: surface its own diagnostics.
        if !report.status {
            let message = if report.message.is_empty() {
                "cannot get CPU temperature".to_string()
            } else {
                report.message
            };
            return Err(ControlError::Sensor(message));
        }

        let max_celsius = report
            .temperature
            .ok_or_else(|| ControlError::Sensor("cannot get CPU temperature".to_string()))?;

        Ok(TemperatureReading { max_celsius, healthy: report.healthy })
    }

    async fn start_polling(&self) -> Result<bool, ControlError> {
        let response = self
            .client
            .post(format!("{}/polling/start", self.base_url))
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ControlError::Unreachable(format!("node returned HTTP {status}")));
        }

        let reply: PollingReply = response
            .json()
            .await
            .map_err(|e| ControlError::Unreachable(format!("malformed node reply: {e}")))?;

        Ok(reply.changed)
    }
}
