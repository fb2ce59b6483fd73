//! Stateless service tying discovery, connection and actions together

use serde::Serialize;
use std::sync::Arc;

use crate::actions::{ActionOutcome, ActionRequest, ActionSequencer};
use crate::adb::{
    parse_device_list, select_device, AdbRunner, CommandRunner, ConnectOutcome,
    ConnectionManager, Device, DeviceRegistry, DisconnectOutcome,
};
use crate::config::{DeviceAddress, TimingConfig, TIMING_CONFIG, VOICE_FEATURES, VOICE_LANGUAGE};
use crate::error::Result;

/// Connection status as reported to clients
#[derive(Debug, Clone, Serialize)]
pub struct PhoneStatus {
    pub connected: bool,
    pub device: Option<String>,
}

/// Readiness of the voice-command feature set
#[derive(Debug, Clone, Serialize)]
pub struct VoiceStatus {
    pub status: &'static str,
    pub phone_connected: bool,
    pub device: Option<String>,
    pub features: Vec<&'static str>,
    pub language: &'static str,
    pub connection_type: &'static str,
}

/// Raw bridge output for diagnostics
#[derive(Debug, Clone, Serialize)]
pub struct DeviceDiagnostics {
    pub adb_available: bool,
    pub output: String,
    pub error: String,
    pub device_connected: bool,
    pub devices: Vec<Device>,
}

/// Entry point for every device operation.
///
/// Holds no device state: each call re-derives the device from the bridge.
/// Cloning is cheap and clones share the same runner.
#[derive(Clone)]
pub struct PhoneController {
    runner: Arc<dyn CommandRunner>,
    timing: Arc<TimingConfig>,
}

impl PhoneController {
    /// Controller using `adb` from the execution path and the global timing
    pub fn new() -> Self {
        Self::with_runner(Arc::new(AdbRunner::new()))
    }

    pub fn with_runner(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            timing: Arc::new(TIMING_CONFIG.clone()),
        }
    }

    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = Arc::new(timing);
        self
    }

    fn registry(&self) -> DeviceRegistry<'_> {
        DeviceRegistry::new(self.runner.as_ref(), &self.timing)
    }

    fn connections(&self) -> ConnectionManager<'_> {
        ConnectionManager::new(self.runner.as_ref(), &self.timing)
    }

    fn sequencer(&self) -> ActionSequencer<'_> {
        ActionSequencer::new(self.runner.as_ref(), &self.timing)
    }

    /// Currently discoverable device, if any
    pub async fn discover(&self) -> Option<Device> {
        self.registry().discover().await
    }

    pub async fn status(&self) -> PhoneStatus {
        let device = self.discover().await.map(|d| d.id);
        PhoneStatus {
            connected: device.is_some(),
            device,
        }
    }

    pub async fn connect(&self, address: &DeviceAddress) -> Result<ConnectOutcome> {
        self.connections().connect(address).await
    }

    pub async fn disconnect(&self, address: Option<&DeviceAddress>) -> Result<DisconnectOutcome> {
        self.connections().disconnect(address).await
    }

    pub async fn perform(&self, request: &ActionRequest) -> Result<ActionOutcome> {
        self.sequencer().perform(request).await
    }

    pub async fn voice_status(&self) -> VoiceStatus {
        let device = self.discover().await.map(|d| d.id);
        VoiceStatus {
            status: if device.is_some() { "ready" } else { "disconnected" },
            phone_connected: device.is_some(),
            device,
            features: VOICE_FEATURES.to_vec(),
            language: VOICE_LANGUAGE,
            connection_type: "USB/WiFi via ADB",
        }
    }

    /// Raw `adb devices` output plus the parsed view of it
    pub async fn device_diagnostics(&self) -> DeviceDiagnostics {
        let raw = self.registry().raw_listing().await;
        let devices = parse_device_list(&raw.stdout);
        let device_connected = select_device(&devices).is_some();
        DeviceDiagnostics {
            adb_available: raw.succeeded,
            output: raw.stdout,
            error: raw.stderr,
            device_connected,
            devices,
        }
    }
}

impl Default for PhoneController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adb::CommandResult;
    use crate::test_utils::{device_listing, ScriptedRunner};

    fn controller(runner: ScriptedRunner) -> (PhoneController, Arc<ScriptedRunner>) {
        let runner = Arc::new(runner);
        let controller = PhoneController::with_runner(runner.clone())
            .with_timing(TimingConfig::default().without_delays());
        (controller, runner)
    }

    #[tokio::test]
    async fn test_status_rederives_device_every_call() {
        let runner = ScriptedRunner::new().on_sequence(
            &["devices"],
            vec![
                CommandResult::exited(0, device_listing(&[("AAA", "device")]), ""),
                CommandResult::exited(0, device_listing(&[]), ""),
            ],
        );
        let (controller, runner) = controller(runner);

        let first = controller.status().await;
        assert!(first.connected);
        assert_eq!(first.device.as_deref(), Some("AAA"));

        let second = controller.status().await;
        assert!(!second.connected);
        assert_eq!(runner.count(&["devices"]), 2);
    }

    #[tokio::test]
    async fn test_voice_status_disconnected() {
        let (controller, _) = controller(ScriptedRunner::new().with_devices(&[]));
        let status = controller.voice_status().await;
        assert_eq!(status.status, "disconnected");
        assert!(!status.phone_connected);
        assert_eq!(status.features, vec!["call", "message", "send_message"]);
    }

    #[tokio::test]
    async fn test_diagnostics_pass_raw_output_through() {
        let (controller, _) =
            controller(ScriptedRunner::new().with_devices(&[("AAA", "unauthorized")]));
        let diagnostics = controller.device_diagnostics().await;
        assert!(diagnostics.adb_available);
        assert!(diagnostics.output.contains("AAA\tunauthorized"));
        assert!(!diagnostics.device_connected);
        assert_eq!(diagnostics.devices.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_requests_do_not_share_state() {
        let (controller, runner) =
            controller(ScriptedRunner::new().with_devices(&[("AAA", "device")]));
        let a = controller.clone();
        let b = controller.clone();

        let call = ActionRequest::call("111");
        let compose = ActionRequest::open_message("222");
        let (first, second) = tokio::join!(a.perform(&call), b.perform(&compose));
        assert!(first.is_ok());
        assert!(second.is_ok());
        assert_eq!(runner.count(&["tel:111"]), 1);
        assert_eq!(runner.count(&["sms:222"]), 1);
    }
}
