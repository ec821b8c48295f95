//! CLI definition and tracing setup.

pub mod cli;
pub mod logging;
