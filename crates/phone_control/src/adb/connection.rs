//! adb connection management for network-attached devices

use serde::Serialize;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::adb::commands;
use crate::adb::registry::{Device, DeviceRegistry};
use crate::adb::runner::CommandRunner;
use crate::config::{secs, DeviceAddress, TimingConfig};
use crate::error::{ControlError, Result};

/// Result of a confirmed connect
#[derive(Debug, Clone, Serialize)]
pub struct ConnectOutcome {
    pub device: Device,
    pub message: String,
}

/// Result of a disconnect; always a success
#[derive(Debug, Clone, Serialize)]
pub struct DisconnectOutcome {
    /// Serial the disconnect was issued for, if anything was connected
    pub device: Option<String>,
    pub message: String,
}

/// Connects and disconnects adb-over-TCP devices
pub struct ConnectionManager<'a> {
    runner: &'a dyn CommandRunner,
    timing: &'a TimingConfig,
}

impl<'a> ConnectionManager<'a> {
    pub fn new(runner: &'a dyn CommandRunner, timing: &'a TimingConfig) -> Self {
        Self { runner, timing }
    }

    fn registry(&self) -> DeviceRegistry<'a> {
        DeviceRegistry::new(self.runner, self.timing)
    }

    /// Connect to a remote device via TCP/IP.
    ///
    /// The exit status of `adb connect` is only logged: the connect counts as
    /// successful only if a ready device is discoverable after the settle
    /// delay.
    pub async fn connect(&self, address: &DeviceAddress) -> Result<ConnectOutcome> {
        let serial = address.serial();
        info!("Connecting to {}...", serial);

        let result = self
            .runner
            .run(&commands::connect(&serial), secs(self.timing.timeouts.connect))
            .await;
        info!(
            "connect output: {} | error: {}",
            result.stdout.trim(),
            result.stderr.trim()
        );

        sleep(secs(self.timing.connection.connect_settle_delay)).await;

        if let Some(device) = self.registry().discover().await {
            info!("Connected device: {}", device.id);
            return Ok(ConnectOutcome {
                message: format!("Connected to {}", serial),
                device,
            });
        }

        warn!("No device found after connect to {}", serial);
        if result.channel_unavailable() {
            return Err(ControlError::ChannelUnavailable(result.diagnostic()));
        }

        let stdout = result.stdout.trim();
        let stderr = result.stderr.trim();
        let message = if !stdout.is_empty() {
            stdout.to_string()
        } else if !stderr.is_empty() {
            stderr.to_string()
        } else {
            "Connection failed".to_string()
        };
        Err(ControlError::ConnectionFailed(message))
    }

    /// Disconnect the current device; a no-op when nothing is connected.
    ///
    /// `address` overrides the discovered serial as the disconnect target.
    pub async fn disconnect(&self, address: Option<&DeviceAddress>) -> Result<DisconnectOutcome> {
        let Some(device) = self.registry().discover().await else {
            return Ok(DisconnectOutcome {
                device: None,
                message: "No device to disconnect".to_string(),
            });
        };

        let serial = address.map(DeviceAddress::serial).unwrap_or(device.id);
        let result = self
            .runner
            .run(
                &commands::disconnect(&serial),
                secs(self.timing.timeouts.disconnect),
            )
            .await;
        if !result.succeeded {
            warn!("disconnect {} reported: {}", serial, result.diagnostic());
        }

        sleep(secs(self.timing.connection.disconnect_settle_delay)).await;

        info!("Disconnected from {}", serial);
        Ok(DisconnectOutcome {
            message: format!("Disconnected from {}", serial),
            device: Some(serial),
        })
    }
}
