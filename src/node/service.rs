//! HTTP query interface served by the local controller.
//!
//! This is the surface supervisors poll: one temperature query plus loop
//! control, and the two direct fan operations for manual intervention.

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::control::Outcome;
use crate::node::controller::LocalController;

/// Wire shape of GET /temperature. `temperature` is absent when the sample
/// failed; `message` then carries the accumulated diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemperatureReport {
    pub status: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<i64>,
    pub healthy: bool,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingReply {
    /// True when the request actually flipped the loop state.
    pub changed: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetSpeedPayload {
    pub speed: serde_json::Value,
}

pub fn router(controller: Arc<LocalController>) -> Router {
    Router::new()
        .route("/temperature", get(temperature))
        .route("/polling/start", post(start_polling))
        .route("/polling/stop", post(stop_polling))
        .route("/fan/speed", post(set_speed))
        .route("/fan/default", post(restore_default))
        .with_state(controller)
}

async fn temperature(State(controller): State<Arc<LocalController>>) -> Json<TemperatureReport> {
    Json(controller.query_temperature().await)
}

async fn start_polling(State(controller): State<Arc<LocalController>>) -> Json<PollingReply> {
    Json(PollingReply { changed: controller.start_polling() })
}

async fn stop_polling(State(controller): State<Arc<LocalController>>) -> Json<PollingReply> {
    Json(PollingReply { changed: controller.stop_polling() })
}

async fn set_speed(
    State(controller): State<Arc<LocalController>>,
    Json(payload): Json<SetSpeedPayload>,
) -> Json<Outcome> {
    Json(controller.apply_speed_value(&payload.speed).await)
}

async fn restore_default(State(controller): State<Arc<LocalController>>) -> Json<Outcome> {
    Json(controller.restore_default().await)
}
