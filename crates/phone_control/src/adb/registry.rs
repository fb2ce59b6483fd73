//! Device discovery through `adb devices`
//!
//! Nothing discovered here is cached: every call re-reads the bridge, and a
//! [`Device`] is only meaningful for the duration of the call that produced it.

use serde::Serialize;
use tracing::{debug, warn};

use crate::adb::runner::{CommandResult, CommandRunner};
use crate::config::{secs, TimingConfig};
use crate::error::{ControlError, Result};

/// Type of adb transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    Usb,
    Remote,
}

/// State token reported by `adb devices`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceState {
    /// Token `device`: ready for commands
    Ready,
    Offline,
    Unauthorized,
    Other(String),
}

impl DeviceState {
    fn from_token(token: &str) -> Self {
        match token {
            "device" => Self::Ready,
            "offline" => Self::Offline,
            "unauthorized" => Self::Unauthorized,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// A device reported by the bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    /// USB serial or `ip:port`
    pub id: String,
    pub state: DeviceState,
    pub connection_type: ConnectionType,
}

impl Device {
    fn new(id: &str, state: DeviceState) -> Self {
        let connection_type = if id.contains(':') {
            ConnectionType::Remote
        } else {
            ConnectionType::Usb
        };
        Self {
            id: id.to_string(),
            state,
            connection_type,
        }
    }
}

/// Parse the line-oriented output of `adb devices`.
///
/// Device lines are `<serial>\t<state>`. The `List of devices attached`
/// header, daemon status lines (`* daemon ...`), blank lines and anything
/// else not in that shape (`error: ...`) are skipped.
pub fn parse_device_list(output: &str) -> Vec<Device> {
    let mut devices = Vec::new();

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('*') || line.starts_with("List of devices") {
            continue;
        }

        let Some((id, state)) = line.split_once('\t') else {
            continue;
        };
        let (id, state) = (id.trim(), state.trim());
        if id.is_empty() || id.contains(char::is_whitespace) || state.is_empty() {
            continue;
        }

        devices.push(Device::new(id, DeviceState::from_token(state)));
    }

    devices
}

/// Select the device actions should target: the first ready one in listing order
pub fn select_device(devices: &[Device]) -> Option<Device> {
    let mut ready = devices.iter().filter(|d| d.state.is_ready());
    let selected = ready.next().cloned();
    let others = ready.count();
    if let Some(device) = &selected {
        if others > 0 {
            warn!(
                "{} additional ready device(s) reported, using {}",
                others, device.id
            );
        }
    }
    selected
}

/// Queries the bridge for attached devices
pub struct DeviceRegistry<'a> {
    runner: &'a dyn CommandRunner,
    timing: &'a TimingConfig,
}

impl<'a> DeviceRegistry<'a> {
    pub fn new(runner: &'a dyn CommandRunner, timing: &'a TimingConfig) -> Self {
        Self { runner, timing }
    }

    /// Run `adb devices` and return the raw result
    pub async fn raw_listing(&self) -> CommandResult {
        self.runner
            .run(&["devices".to_string()], secs(self.timing.timeouts.discovery))
            .await
    }

    /// List every reported device, whatever its state
    pub async fn list_devices(&self) -> Result<Vec<Device>> {
        let result = self.raw_listing().await;
        if result.channel_unavailable() {
            return Err(ControlError::ChannelUnavailable(result.diagnostic()));
        }
        if !result.succeeded {
            debug!("adb devices failed: {}", result.diagnostic());
        }
        Ok(parse_device_list(&result.stdout))
    }

    /// Find the target device, reporting a missing bridge as an error
    pub async fn probe(&self) -> Result<Option<Device>> {
        let devices = self.list_devices().await?;
        let device = select_device(&devices);
        debug!("discovered device: {:?}", device.as_ref().map(|d| &d.id));
        Ok(device)
    }

    /// Find the target device; any failure reads as "no device"
    pub async fn discover(&self) -> Option<Device> {
        match self.probe().await {
            Ok(device) => device,
            Err(e) => {
                warn!("device discovery failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{device_listing, ScriptedRunner};

    #[test]
    fn test_parse_skips_header_and_daemon_lines() {
        let output = "* daemon not running; starting now at tcp:5037\n\
                      * daemon started successfully\n\
                      List of devices attached\n\
                      emulator-5554\tdevice\n\
                      \n";
        let devices = parse_device_list(output);
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].id, "emulator-5554");
        assert_eq!(devices[0].state, DeviceState::Ready);
        assert_eq!(devices[0].connection_type, ConnectionType::Usb);
    }

    #[test]
    fn test_parse_ignores_error_lines_between_devices() {
        let devices = parse_device_list(
            "List of devices attached\n\
             error: protocol fault (couldn't read status)\n\
             AAA\tdevice\n",
        );
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].id, "AAA");
    }

    #[test]
    fn test_parse_keeps_multi_word_state_as_not_ready() {
        let devices = parse_device_list("AAA\tno permissions (user not in plugdev)\n");
        assert_eq!(devices.len(), 1);
        assert!(!devices[0].state.is_ready());
    }

    #[test]
    fn test_parse_remote_device() {
        let devices = parse_device_list("List of devices attached\n192.168.1.5:5555\toffline\n");
        assert_eq!(devices[0].connection_type, ConnectionType::Remote);
        assert_eq!(devices[0].state, DeviceState::Offline);
    }

    #[test]
    fn test_select_requires_exact_device_token() {
        let devices = parse_device_list(
            "List of devices attached\n\
             AAA\toffline\n\
             BBB\tunauthorized\n\
             CCC\tdevices\n\
             DDD\tdevice\n",
        );
        assert_eq!(select_device(&devices).map(|d| d.id), Some("DDD".to_string()));
    }

    #[test]
    fn test_select_offline_only_is_none() {
        let devices = parse_device_list("List of devices attached\n192.168.29.67:5555\toffline\n");
        assert!(select_device(&devices).is_none());
    }

    #[test]
    fn test_select_first_of_many() {
        let devices = parse_device_list(&device_listing(&[
            ("first", "device"),
            ("second", "device"),
        ]));
        assert_eq!(select_device(&devices).unwrap().id, "first");
    }

    #[test]
    fn test_parse_garbage_is_empty() {
        assert!(parse_device_list("error: protocol fault\n").is_empty());
        assert!(parse_device_list("adb server version (41) doesn't match\n").is_empty());
        assert!(parse_device_list("").is_empty());
    }

    #[tokio::test]
    async fn test_discover_returns_ready_device() {
        let runner = ScriptedRunner::new().with_devices(&[("R58M123", "device")]);
        let timing = TimingConfig::default().without_delays();
        let registry = DeviceRegistry::new(&runner, &timing);

        let device = registry.discover().await.unwrap();
        assert_eq!(device.id, "R58M123");
        assert_eq!(runner.calls(), vec![vec!["devices".to_string()]]);
    }

    #[tokio::test]
    async fn test_discover_swallows_missing_bridge() {
        let runner = ScriptedRunner::new().on(&["devices"], CommandResult::spawn_failed("no adb"));
        let timing = TimingConfig::default().without_delays();
        let registry = DeviceRegistry::new(&runner, &timing);

        assert!(registry.discover().await.is_none());
        assert!(matches!(
            registry.probe().await,
            Err(ControlError::ChannelUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_discover_after_timeout_is_none() {
        let runner = ScriptedRunner::new().on(
            &["devices"],
            CommandResult::timed_out(std::time::Duration::from_secs(3), "", ""),
        );
        let timing = TimingConfig::default().without_delays();
        let registry = DeviceRegistry::new(&runner, &timing);

        assert!(registry.discover().await.is_none());
    }
}
