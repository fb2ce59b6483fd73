//! ADB (Android Debug Bridge) module for Android device control
//!
//! This module provides:
//! - `runner`: Bounded execution of single adb commands
//! - `registry`: Device discovery
//! - `connection`: adb-over-TCP connect/disconnect
//! - `commands`: Argument lists for the commands issued

pub mod commands;
mod connection;
mod registry;
mod runner;

pub use connection::{ConnectOutcome, ConnectionManager, DisconnectOutcome};
pub use registry::{
    parse_device_list, select_device, ConnectionType, Device, DeviceRegistry, DeviceState,
};
pub use runner::{AdbRunner, CommandResult, CommandRunner, CommandStatus};
