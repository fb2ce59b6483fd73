//! Configuration module for phone_control
//!
//! This module contains:
//! - `defaults`: Default device address and advertised features
//! - `timing`: Settle delays and command timeouts

mod defaults;
mod timing;

pub use defaults::{
    DeviceAddress, DEFAULT_ADB_PATH, DEFAULT_DEVICE_IP, DEFAULT_DEVICE_PORT, VOICE_FEATURES,
    VOICE_LANGUAGE,
};
pub use timing::{
    secs, CommandTimeoutConfig, ConnectionTimingConfig, SequenceTimingConfig, TimingConfig,
    TIMING_CONFIG,
};
