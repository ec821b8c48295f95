//! Temperature-to-fan-speed decision policy, shared by both controller roles.
//!
//! The proportional band is strict on both ends: exactly 20 or 70 degrees
//! routes to the safety reset, as does anything implausibly cold, anything
//! hot, and any derived target the speed validation rejects.

use serde::{Deserialize, Serialize};

use crate::control::outcome::ControlError;

/// Lower bound of the proportional band (exclusive).
pub const PROPORTIONAL_FLOOR: i64 = 20;
/// Upper bound of the proportional band (exclusive).
pub const PROPORTIONAL_CEIL: i64 = 70;

/// One normalized poll of a node: rounded max across all cores, plus the
/// node's self-reported health at the time of the sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemperatureReading {
    pub max_celsius: i64,
    pub healthy: bool,
}

/// Fan duty cycle percentage, validated to [20, 100] on construction.
/// Out-of-range or non-numeric input is rejected, never clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedSetting(u8);

impl SpeedSetting {
    pub const MIN: i64 = 20;
    pub const MAX: i64 = 100;

    pub fn new(percent: i64) -> Result<Self, ControlError> {
        if (Self::MIN..=Self::MAX).contains(&percent) {
            Ok(Self(percent as u8))
        } else {
            Err(ControlError::Validation { value: percent.to_string() })
        }
    }

    pub fn parse(raw: &str) -> Result<Self, ControlError> {
        let percent: i64 = raw
            .trim()
            .parse()
            .map_err(|_| ControlError::Validation { value: raw.to_string() })?;
        Self::new(percent)
    }

    /// Accept a speed from a JSON payload, number or numeric string.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, ControlError> {
        match value {
            serde_json::Value::Number(n) => n
                .as_i64()
                .ok_or_else(|| ControlError::Validation { value: n.to_string() })
                .and_then(Self::new),
            serde_json::Value::String(s) => Self::parse(s),
            other => Err(ControlError::Validation { value: other.to_string() }),
        }
    }

    pub fn percent(&self) -> u8 {
        self.0
    }

    /// Duty-cycle argument for the raw BMC command, e.g. 30 -> "0x1e".
    pub fn duty_cycle_hex(&self) -> String {
        format!("0x{:x}", self.0)
    }
}

/// What the engine decided to do with one reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    /// Node reports itself healthy; a supervisor takes no hardware action.
    Bypass,
    /// Explicit duty cycle inside the proportional band.
    SetSpeed(SpeedSetting),
    /// Re-enable BMC-native automatic fan control.
    RestoreDefault,
}

/// Choose an action for one reading. `bypass_on_healthy` is a supervisor-side
/// capability; the local controller always evaluates with it disabled.
pub fn decide(reading: TemperatureReading, bypass_on_healthy: bool, offset: i64) -> ControlAction {
    if bypass_on_healthy && reading.healthy {
        return ControlAction::Bypass;
    }

    let t = reading.max_celsius;
    if t > PROPORTIONAL_FLOOR && t < PROPORTIONAL_CEIL {
        // An engine never hands an invalid target to the command sequence.
        match SpeedSetting::new(t - offset) {
            Ok(speed) => ControlAction::SetSpeed(speed),
            Err(_) => ControlAction::RestoreDefault,
        }
    } else {
        ControlAction::RestoreDefault
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(max_celsius: i64, healthy: bool) -> TemperatureReading {
        TemperatureReading { max_celsius, healthy }
    }

    #[test]
    fn proportional_band_subtracts_offset() {
        assert_eq!(
            decide(reading(45, false), false, 15),
            ControlAction::SetSpeed(SpeedSetting::new(30).unwrap())
        );
        assert_eq!(
            decide(reading(69, false), false, 15),
            ControlAction::SetSpeed(SpeedSetting::new(54).unwrap())
        );
    }

    #[test]
    fn band_boundaries_are_strict() {
        assert_eq!(decide(reading(20, false), false, 15), ControlAction::RestoreDefault);
        assert_eq!(decide(reading(70, false), false, 15), ControlAction::RestoreDefault);
        assert_eq!(decide(reading(75, false), false, 15), ControlAction::RestoreDefault);
        assert_eq!(decide(reading(-3, false), false, 15), ControlAction::RestoreDefault);
    }

    #[test]
    fn out_of_range_target_falls_back_to_safety_reset() {
        // 21 - 15 = 6, below the validation floor
        assert_eq!(decide(reading(21, false), false, 15), ControlAction::RestoreDefault);
        // 65 + 40 = 105, above the validation ceiling
        assert_eq!(decide(reading(65, false), false, -40), ControlAction::RestoreDefault);
    }

    #[test]
    fn bypass_only_with_capability_and_healthy_reading() {
        assert_eq!(decide(reading(95, true), true, 15), ControlAction::Bypass);
        assert_ne!(decide(reading(45, true), false, 15), ControlAction::Bypass);
        assert_ne!(decide(reading(45, false), true, 15), ControlAction::Bypass);
    }

    #[test]
    fn speed_setting_validation() {
        assert!(SpeedSetting::new(19).is_err());
        assert!(SpeedSetting::new(101).is_err());
        assert!(SpeedSetting::new(20).is_ok());
        assert!(SpeedSetting::new(100).is_ok());

        let err = SpeedSetting::parse("abc").unwrap_err();
        assert!(err.to_string().contains("invalid"));

        assert_eq!(SpeedSetting::parse(" 30 ").unwrap().percent(), 30);
        assert_eq!(SpeedSetting::new(30).unwrap().duty_cycle_hex(), "0x1e");
    }

    #[test]
    fn speed_setting_from_json_value() {
        assert_eq!(
            SpeedSetting::from_value(&serde_json::json!(42)).unwrap().percent(),
            42
        );
        assert_eq!(
            SpeedSetting::from_value(&serde_json::json!("42")).unwrap().percent(),
            42
        );
        assert!(SpeedSetting::from_value(&serde_json::json!(null)).is_err());
        assert!(SpeedSetting::from_value(&serde_json::json!(12.5)).is_err());
    }
}
