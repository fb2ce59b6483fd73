//! Per-call request and outcome values for device actions

use serde::Serialize;

use crate::actions::text::{dial_address, sanitize_digits};
use crate::error::{ControlError, Result};

const UNKNOWN_CONTACT: &str = "Unknown";

/// The fixed set of device actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    Call,
    OpenMessage,
    SendMessage,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::OpenMessage => "open-message",
            Self::SendMessage => "send-message",
        }
    }
}

/// An action to perform against the connected device
#[derive(Debug, Clone)]
pub struct ActionRequest {
    pub kind: ActionKind,
    pub phone_number: String,
    pub contact: Option<String>,
    pub message: Option<String>,
}

impl ActionRequest {
    fn new(kind: ActionKind, phone_number: impl Into<String>) -> Self {
        Self {
            kind,
            phone_number: phone_number.into(),
            contact: None,
            message: None,
        }
    }

    pub fn call(phone_number: impl Into<String>) -> Self {
        Self::new(ActionKind::Call, phone_number)
    }

    pub fn open_message(phone_number: impl Into<String>) -> Self {
        Self::new(ActionKind::OpenMessage, phone_number)
    }

    pub fn send_message(phone_number: impl Into<String>, message: impl Into<String>) -> Self {
        let mut request = Self::new(ActionKind::SendMessage, phone_number);
        request.message = Some(message.into());
        request
    }

    /// Set the display name of the recipient
    pub fn with_contact(mut self, contact: Option<String>) -> Self {
        self.contact = contact.filter(|c| !c.trim().is_empty());
        self
    }

    /// Recipient display name, `Unknown` when none was given
    pub fn contact_name(&self) -> &str {
        self.contact.as_deref().unwrap_or(UNKNOWN_CONTACT)
    }

    /// Normalised address the device should dial or message.
    ///
    /// Send-message addresses are reduced to digits only; call and
    /// open-message keep a leading `+`.
    pub fn target_address(&self) -> Result<String> {
        if self.phone_number.trim().is_empty() {
            return Err(ControlError::MissingTargetAddress);
        }
        let target = match self.kind {
            ActionKind::SendMessage => sanitize_digits(&self.phone_number),
            ActionKind::Call | ActionKind::OpenMessage => dial_address(&self.phone_number),
        };
        if target.is_empty() {
            return Err(ControlError::MissingTargetAddress);
        }
        Ok(target)
    }

    /// Message body for send-message
    pub fn message_body(&self) -> Result<&str> {
        match self.message.as_deref() {
            Some(body) if !body.trim().is_empty() => Ok(body),
            _ => Err(ControlError::MissingMessageBody),
        }
    }

    /// Check every field the action needs before any command is issued
    pub fn validate(&self) -> Result<()> {
        self.target_address()?;
        if self.kind == ActionKind::SendMessage {
            self.message_body()?;
        }
        Ok(())
    }
}

/// Whether the action reached its end state on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Completion {
    Complete,
    /// Only the compose view could be opened; the user has to press send
    ManualCompletionRequired,
}

impl Completion {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::ManualCompletionRequired => "partial-success-manual-completion-required",
        }
    }
}

/// Successful (possibly degraded) result of an action
#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome {
    pub kind: ActionKind,
    pub device: String,
    pub message: String,
    pub contact: String,
    pub phone_number: String,
    pub completion: Completion,
}

impl ActionOutcome {
    pub fn requires_manual_completion(&self) -> bool {
        self.completion == Completion::ManualCompletionRequired
    }
}
