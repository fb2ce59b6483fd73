//! phone-server - HTTP front end for phone control and object detection
//!
//! Usage:
//!     phone-server [OPTIONS]
//!
//! Environment Variables:
//!     PHONE_SERVER_HOST: Bind address (default: 0.0.0.0)
//!     PHONE_SERVER_PORT: Listen port (default: 5000)
//!     PHONE_CONTROL_ADB: adb executable (default: adb from PATH)
//!     PHONE_CONTROL_DEVICE_IP / PHONE_CONTROL_DEVICE_PORT: default connect target
//!     PHONE_CONTROL_*_DELAY / PHONE_CONTROL_*_TIMEOUT: timing overrides in seconds
//!     RUST_LOG: log filter

use anyhow::Result;
use clap::Parser;
use phone_control::{
    AdbRunner, DeviceAddress, PhoneController, DEFAULT_DEVICE_IP, DEFAULT_DEVICE_PORT,
};
use phone_server::AppState;
use std::sync::Arc;

/// Phone control server
#[derive(Parser, Debug)]
#[command(name = "phone-server")]
#[command(about = "HTTP server driving an Android phone over adb")]
#[command(after_help = r#"Examples:
    # Serve on the default port
    phone-server

    # Point at a phone on another network address
    phone-server --default-ip 192.168.1.100 --default-port 5555

    # Use an adb binary outside PATH
    phone-server --adb-path /opt/platform-tools/adb
"#)]
struct Cli {
    /// Address to bind
    #[arg(long, env = "PHONE_SERVER_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short = 'p', long, env = "PHONE_SERVER_PORT", default_value_t = 5000)]
    port: u16,

    /// adb executable name or path
    #[arg(long, env = "PHONE_CONTROL_ADB", default_value = "adb")]
    adb_path: String,

    /// Device IP used when a connect request names none
    #[arg(long, env = "PHONE_CONTROL_DEVICE_IP", default_value = DEFAULT_DEVICE_IP)]
    default_ip: String,

    /// Device port used when a connect request names none
    #[arg(long, env = "PHONE_CONTROL_DEVICE_PORT", default_value_t = DEFAULT_DEVICE_PORT)]
    default_port: u16,

    /// Only log warnings and errors
    #[arg(short = 'q', long)]
    quiet: bool,
}

/// Resolve adb once at startup. A missing binary is not fatal: every phone
/// endpoint then reports the bridge as unavailable.
fn resolve_adb(adb_path: &str) -> String {
    match which::which(adb_path) {
        Ok(path) => {
            tracing::info!("using adb at {}", path.display());
            path.to_string_lossy().into_owned()
        }
        Err(e) => {
            tracing::warn!("adb not found ({adb_path}): {e}; phone endpoints will fail");
            adb_path.to_string()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.quiet {
        tracing::Level::WARN
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let runner = AdbRunner::with_path(resolve_adb(&cli.adb_path));
    let controller = PhoneController::with_runner(Arc::new(runner));

    // No detection backend ships with the server; /detect answers "Model not loaded".
    tracing::warn!("object detection model not configured");

    let state = AppState::new(controller)
        .with_default_address(DeviceAddress::new(cli.default_ip, cli.default_port));

    phone_server::serve(&cli.host, cli.port, state).await
}
