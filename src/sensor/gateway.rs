//! HTTP client for the node's temperature telemetry endpoint.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::trace;

use crate::config::SensorSettings;
use crate::control::ControlError;
use crate::sensor::reading::TelemetryNode;

/// Seam between the controller and whatever produces telemetry trees.
#[async_trait]
pub trait SensorSource: Send + Sync {
    async fn fetch(&self) -> Result<TelemetryNode, ControlError>;
}

pub struct HttpSensorGateway {
    client: reqwest::Client,
    url: String,
}

impl HttpSensorGateway {
    pub fn new(settings: &SensorSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs_f64(settings.timeout_secs))
            .build()
            .context("Failed to build sensor gateway HTTP client")?;
        Ok(Self { client, url: settings.url.clone() })
    }
}

#[async_trait]
impl SensorSource for HttpSensorGateway {
    async fn fetch(&self) -> Result<TelemetryNode, ControlError> {
        trace!("Fetching telemetry from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ControlError::Sensor(format!("cannot reach sensor gateway: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ControlError::Sensor(format!(
                "sensor gateway returned HTTP {status}"
            )));
        }

        response
            .json::<TelemetryNode>()
            .await
            .map_err(|e| ControlError::Sensor(format!("malformed telemetry payload: {e}")))
    }
}
