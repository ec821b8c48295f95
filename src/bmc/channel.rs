//! ipmitool subprocess channel: one raw command per invocation, sequentially.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::BmcSettings;

/// Single-writer hardware command channel. Each raw command either completes
/// or fails on its own; callers never issue the next step after a failure.
#[async_trait]
pub trait CommandChannel: Send + Sync {
    async fn run_raw(&self, bytes: &str) -> Result<()>;
}

pub struct IpmitoolChannel {
    settings: BmcSettings,
    dry_run: bool,
}

impl IpmitoolChannel {
    pub fn new(settings: BmcSettings, dry_run: bool) -> Self {
        Self { settings, dry_run }
    }

    /// Build an ipmitool Command with the correct interface flags.
    /// With a configured host, routes via lanplus to the remote BMC.
    /// Otherwise, uses the local /dev/ipmi0 interface.
    fn build_command(&self) -> std::process::Command {
        let mut cmd = std::process::Command::new("ipmitool");

        if self.settings.host.is_empty() {
            cmd.args(["-I", "open"]);
        } else {
            cmd.args([
                "-I",
                "lanplus",
                "-H",
                &self.settings.host,
                "-U",
                &self.settings.user,
                "-P",
                &self.settings.pass,
            ]);
        }

        cmd
    }
}

#[async_trait]
impl CommandChannel for IpmitoolChannel {
    async fn run_raw(&self, bytes: &str) -> Result<()> {
        if self.dry_run {
            info!("[DRY RUN] Would execute: ipmitool raw {}", bytes);
            return Ok(());
        }

        let mut cmd = self.build_command();
        cmd.arg("raw");
        for byte in bytes.split_whitespace() {
            cmd.arg(byte);
        }

        debug!("Executing: ipmitool raw {}", bytes);

        let output = tokio::process::Command::from(cmd)
            .output()
            .await
            .context("Failed to execute ipmitool")?;

        if !output.status.success() {
            return Err(anyhow!(
                "ipmitool raw failed: {}",
                String::from_utf8_lossy(&output.stderr)
            ));
        }

        Ok(())
    }
}
