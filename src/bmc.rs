//! BMC fan control: raw command payloads, the command channel seam, and the
//! two-step actuator both roles drive their own channel with.

pub mod actuator;
pub mod channel;

pub use actuator::FanActuator;
pub use channel::{CommandChannel, IpmitoolChannel};

// Dell iDRAC OEM payloads for manual fan control.
pub const ENABLE_MANUAL_CONTROL: &str = "0x30 0x30 0x01 0x00";
pub const DISABLE_MANUAL_CONTROL: &str = "0x30 0x30 0x01 0x01";
pub const SET_DUTY_CYCLE: &str = "0x30 0x30 0x02 0xff";
