//! Telemetry payload normalization: nested per-core tree to one max reading.
//!
//! The gateway exposes an OpenHardwareMonitor-style tree: machine node,
//! CPU packages below it, each with a "Temperatures" group whose children
//! carry textual values like "45.5 °C". Thermal protection reacts to the
//! hottest point, so the maximum across cores is reported, not the mean.

use serde::Deserialize;

use crate::control::ControlError;

/// One node of the gateway's telemetry tree. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelemetryNode {
    #[serde(default, rename = "Text")]
    pub text: String,
    #[serde(default, rename = "Value")]
    pub value: String,
    #[serde(default, rename = "Children")]
    pub children: Vec<TelemetryNode>,
}

const UNIT_SUFFIX: &str = " °C";
const TEMPERATURE_GROUP: &str = "Temperatures";

/// Walk the tree, collect every core under a "Temperatures" group, and
/// return the rounded maximum. Any unparseable core fails the whole reading.
pub fn max_core_temperature(root: &TelemetryNode) -> Result<i64, ControlError> {
    let machine = root.children.first().ok_or(ControlError::EmptyReading)?;

    let mut cores: Vec<&TelemetryNode> = Vec::new();
    for package in &machine.children {
        for group in &package.children {
            if group.text == TEMPERATURE_GROUP {
                cores.extend(group.children.iter());
            }
        }
    }

    if cores.is_empty() {
        return Err(ControlError::EmptyReading);
    }

    let mut max_celsius = 0.0_f64;
    for core in cores {
        let celsius: f64 = core
            .value
            .replace(UNIT_SUFFIX, "")
            .trim()
            .parse()
            .map_err(|_| ControlError::InvalidReading { core: core.text.clone() })?;
        // f64 parsing accepts "NaN" and "inf"; neither is a temperature.
        if !celsius.is_finite() {
            return Err(ControlError::InvalidReading { core: core.text.clone() });
        }
        if celsius > max_celsius {
            max_celsius = celsius;
        }
    }

    Ok(max_celsius.round() as i64)
}
