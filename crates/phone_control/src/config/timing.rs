//! Timing configuration for device operations

use lazy_static::lazy_static;
use std::env;
use std::time::Duration;

fn env_secs(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|v: &f64| v.is_finite() && *v >= 0.0)
        .unwrap_or(default)
}

/// Settle delays between the steps of the send-message sequence
#[derive(Debug, Clone)]
pub struct SequenceTimingConfig {
    pub compose_open_delay: f64,
    pub text_clear_delay: f64,
    pub text_input_delay: f64,
    pub focus_move_delay: f64,
}

impl Default for SequenceTimingConfig {
    fn default() -> Self {
        Self {
            compose_open_delay: env_secs("PHONE_CONTROL_COMPOSE_OPEN_DELAY", 1.5),
            text_clear_delay: env_secs("PHONE_CONTROL_TEXT_CLEAR_DELAY", 0.5),
            text_input_delay: env_secs("PHONE_CONTROL_TEXT_INPUT_DELAY", 0.5),
            focus_move_delay: env_secs("PHONE_CONTROL_FOCUS_MOVE_DELAY", 0.3),
        }
    }
}

/// Settle delays for connect/disconnect
#[derive(Debug, Clone)]
pub struct ConnectionTimingConfig {
    pub connect_settle_delay: f64,
    pub disconnect_settle_delay: f64,
}

impl Default for ConnectionTimingConfig {
    fn default() -> Self {
        Self {
            connect_settle_delay: env_secs("PHONE_CONTROL_CONNECT_SETTLE_DELAY", 1.0),
            disconnect_settle_delay: env_secs("PHONE_CONTROL_DISCONNECT_SETTLE_DELAY", 1.0),
        }
    }
}

/// Upper bounds for each class of adb invocation
#[derive(Debug, Clone)]
pub struct CommandTimeoutConfig {
    pub discovery: f64,
    pub connect: f64,
    pub disconnect: f64,
    pub intent: f64,
    pub key_event: f64,
    pub text_input: f64,
}

impl Default for CommandTimeoutConfig {
    fn default() -> Self {
        Self {
            discovery: env_secs("PHONE_CONTROL_DISCOVERY_TIMEOUT", 3.0),
            connect: env_secs("PHONE_CONTROL_CONNECT_TIMEOUT", 10.0),
            disconnect: env_secs("PHONE_CONTROL_DISCONNECT_TIMEOUT", 5.0),
            intent: env_secs("PHONE_CONTROL_INTENT_TIMEOUT", 5.0),
            key_event: env_secs("PHONE_CONTROL_KEY_EVENT_TIMEOUT", 2.0),
            text_input: env_secs("PHONE_CONTROL_TEXT_INPUT_TIMEOUT", 5.0),
        }
    }
}

/// Master timing configuration
#[derive(Debug, Clone, Default)]
pub struct TimingConfig {
    pub sequence: SequenceTimingConfig,
    pub connection: ConnectionTimingConfig,
    pub timeouts: CommandTimeoutConfig,
}

impl TimingConfig {
    /// Configuration with every settle delay removed; timeouts are kept.
    pub fn without_delays(mut self) -> Self {
        self.sequence = SequenceTimingConfig {
            compose_open_delay: 0.0,
            text_clear_delay: 0.0,
            text_input_delay: 0.0,
            focus_move_delay: 0.0,
        };
        self.connection = ConnectionTimingConfig {
            connect_settle_delay: 0.0,
            disconnect_settle_delay: 0.0,
        };
        self
    }
}

/// Convert a seconds value from the config into a `Duration`
pub fn secs(value: f64) -> Duration {
    Duration::from_secs_f64(value.max(0.0))
}

lazy_static! {
    /// Global timing configuration instance
    pub static ref TIMING_CONFIG: TimingConfig = TimingConfig::default();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_without_delays_keeps_timeouts() {
        let config = TimingConfig::default().without_delays();
        assert_eq!(config.sequence.compose_open_delay, 0.0);
        assert_eq!(config.connection.connect_settle_delay, 0.0);
        assert!(config.timeouts.discovery > 0.0);
    }

    #[test]
    fn test_secs_clamps_negative() {
        assert_eq!(secs(-1.0), Duration::ZERO);
        assert_eq!(secs(1.5), Duration::from_millis(1500));
    }
}
