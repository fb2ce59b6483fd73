use phone_control::{DeviceAddress, Detector, PhoneController};
use std::sync::Arc;

/// Shared state handed to every request handler.
///
/// Nothing in here describes the device: handlers ask the controller, which
/// asks the bridge.
#[derive(Clone)]
pub struct AppState {
    pub controller: PhoneController,
    /// `None` when no detection model could be loaded
    pub detector: Option<Arc<dyn Detector>>,
    /// Address used when a connect request names none
    pub default_address: DeviceAddress,
}

impl AppState {
    pub fn new(controller: PhoneController) -> Self {
        Self {
            controller,
            detector: None,
            default_address: DeviceAddress::default(),
        }
    }

    pub fn with_detector(mut self, detector: Arc<dyn Detector>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn with_default_address(mut self, address: DeviceAddress) -> Self {
        self.default_address = address;
        self
    }
}
