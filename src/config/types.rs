//! Configuration structs and defaults.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub bmc: BmcSettings,
    pub sensor: SensorSettings,
    pub control: ControlSettings,
    pub node: NodeSettings,
    pub supervisor: SupervisorSettings,
}

/// Target for the hardware management channel. An empty host selects the
/// local /dev/ipmi0 interface instead of lanplus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BmcSettings {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub pass: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorSettings {
    pub url: String,
    #[serde(default = "default_sensor_timeout")]
    pub timeout_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlSettings {
    /// Subtrahend for proportional control: target = max_celsius - offset.
    #[serde(default = "default_fan_speed_offset")]
    pub fan_speed_offset: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSettings {
    pub listen_addr: String,
    pub poll_interval_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorSettings {
    pub node_url: String,
    pub poll_interval_secs: f64,
    /// Bounded query timeout; an unreachable node must not stall the
    /// supervision schedule.
    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: f64,
}

fn default_sensor_timeout() -> f64 {
    5.0
}

fn default_fan_speed_offset() -> i64 {
    15
}

fn default_query_timeout() -> f64 {
    1.0
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bmc: BmcSettings {
                host: String::new(),
                user: String::new(),
                pass: String::new(),
            },
            sensor: SensorSettings {
                url: "http://127.0.0.1:8085/data.json".to_string(),
                timeout_secs: default_sensor_timeout(),
            },
            control: ControlSettings { fan_speed_offset: default_fan_speed_offset() },
            node: NodeSettings {
                listen_addr: "0.0.0.0:8086".to_string(),
                poll_interval_secs: 2.0,
            },
            supervisor: SupervisorSettings {
                node_url: "http://127.0.0.1:8086".to_string(),
                poll_interval_secs: 5.0,
                query_timeout_secs: default_query_timeout(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_take_defaults() {
        let json = r#"{
            "bmc": { "host": "192.168.1.189", "user": "root", "pass": "calvin" },
            "sensor": { "url": "http://10.0.0.5:8085/data.json" },
            "control": {},
            "node": { "listen_addr": "0.0.0.0:8086", "poll_interval_secs": 2.0 },
            "supervisor": { "node_url": "http://10.0.0.5:8086", "poll_interval_secs": 5.0 }
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.control.fan_speed_offset, 15);
        assert_eq!(config.supervisor.query_timeout_secs, 1.0);
        assert_eq!(config.sensor.timeout_secs, 5.0);
    }
}
