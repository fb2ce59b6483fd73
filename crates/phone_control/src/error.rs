//! Error types for device control operations

use thiserror::Error;

/// Coarse classification used by callers to pick a response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed request fields
    Validation,
    /// No qualifying device is discoverable
    DeviceUnavailable,
    /// The adb bridge is missing, failing or timing out
    Channel,
}

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("Phone not connected")]
    DeviceNotConnected,

    #[error("Phone number not provided")]
    MissingTargetAddress,

    #[error("Message not provided")]
    MissingMessageBody,

    #[error("Command channel unavailable: {0}")]
    ChannelUnavailable(String),

    #[error("{action} failed: {detail}")]
    CommandFailed { action: String, detail: String },

    #[error("{0}")]
    ConnectionFailed(String),
}

impl ControlError {
    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::DeviceNotConnected => "device-not-connected",
            Self::MissingTargetAddress => "missing-target-address",
            Self::MissingMessageBody => "missing-message-body",
            Self::ChannelUnavailable(_) => "command-channel-unavailable",
            Self::CommandFailed { .. } => "command-failed",
            Self::ConnectionFailed(_) => "connection-failed",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingTargetAddress | Self::MissingMessageBody => ErrorKind::Validation,
            Self::DeviceNotConnected | Self::ConnectionFailed(_) => ErrorKind::DeviceUnavailable,
            Self::ChannelUnavailable(_) | Self::CommandFailed { .. } => ErrorKind::Channel,
        }
    }
}

pub type Result<T> = std::result::Result<T, ControlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_classified() {
        assert_eq!(ControlError::MissingTargetAddress.kind(), ErrorKind::Validation);
        assert_eq!(ControlError::MissingMessageBody.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_device_not_connected_message() {
        let err = ControlError::DeviceNotConnected;
        assert_eq!(err.to_string(), "Phone not connected");
        assert_eq!(err.code(), "device-not-connected");
        assert_eq!(err.kind(), ErrorKind::DeviceUnavailable);
    }

    #[test]
    fn test_channel_errors_are_classified() {
        let err = ControlError::CommandFailed {
            action: "call".to_string(),
            detail: "exit 1".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Channel);
        assert_eq!(err.to_string(), "call failed: exit 1");
        assert_eq!(
            ControlError::ChannelUnavailable("adb missing".to_string()).code(),
            "command-channel-unavailable"
        );
    }
}
