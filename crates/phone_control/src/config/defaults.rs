//! Default device address used when a request does not name one

/// Address of the phone on the local network
pub const DEFAULT_DEVICE_IP: &str = "192.168.29.67";

/// adb-over-TCP port
pub const DEFAULT_DEVICE_PORT: u16 = 5555;

/// Executable name of the device bridge
pub const DEFAULT_ADB_PATH: &str = "adb";

/// Features advertised by the voice status endpoint
pub const VOICE_FEATURES: [&str; 3] = ["call", "message", "send_message"];

/// Recognition language advertised by the voice status endpoint
pub const VOICE_LANGUAGE: &str = "en-IN";

/// Network endpoint of a device reachable over adb TCP/IP
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceAddress {
    pub ip: String,
    pub port: u16,
}

impl DeviceAddress {
    pub fn new(ip: impl Into<String>, port: u16) -> Self {
        Self {
            ip: ip.into(),
            port,
        }
    }

    /// `ip:port` form understood by `adb connect`
    pub fn serial(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }
}

impl Default for DeviceAddress {
    fn default() -> Self {
        Self::new(DEFAULT_DEVICE_IP, DEFAULT_DEVICE_PORT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_address_serial() {
        assert_eq!(DeviceAddress::default().serial(), "192.168.29.67:5555");
    }
}
