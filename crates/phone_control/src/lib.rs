//! phone_control: Android device command orchestration
//!
//! This library drives a phone through the `adb` bridge:
//! - Device discovery that never trusts a previous answer
//! - adb-over-TCP connect/disconnect confirmed by discovery
//! - Call, open-message and send-message actions run as timed command batches
//! - The contract for the object-detection collaborator
//!
//! # Example
//!
//! ```no_run
//! use phone_control::{ActionRequest, PhoneController};
//!
//! #[tokio::main]
//! async fn main() {
//!     let controller = PhoneController::new();
//!
//!     let request = ActionRequest::send_message("+91 98765 43210", "On my way");
//!     match controller.perform(&request).await {
//!         Ok(outcome) => println!("{}", outcome.message),
//!         Err(e) => eprintln!("{} ({})", e, e.code()),
//!     }
//! }
//! ```

// Core modules
pub mod error;

// Configuration module
pub mod config;

// Device bridge
pub mod adb;

// Core functionality
pub mod actions;
pub mod controller;
pub mod detection;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;

// Re-export commonly used types and functions
pub use error::{ControlError, ErrorKind, Result};

// Config re-exports
pub use config::{DeviceAddress, TimingConfig, DEFAULT_DEVICE_IP, DEFAULT_DEVICE_PORT, TIMING_CONFIG};

// ADB re-exports
pub use adb::{AdbRunner, CommandResult, CommandRunner, CommandStatus, Device, DeviceState};

// Actions re-exports
pub use actions::{ActionKind, ActionOutcome, ActionRequest, Completion};

// Controller re-exports
pub use controller::{DeviceDiagnostics, PhoneController, PhoneStatus, VoiceStatus};

// Detection re-exports
pub use detection::{detect_objects, Detection, DetectionError, Detector};
