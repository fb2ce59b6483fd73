//! Device actions: request validation and step sequencing
//!
//! This module provides:
//! - `request`: Action requests and outcomes
//! - `sequencer`: Timed command batches for each action
//! - `text`: Phone number sanitising and text escaping

mod request;
mod sequencer;
mod text;

pub use request::{ActionKind, ActionOutcome, ActionRequest, Completion};
pub use sequencer::{send_message_steps, ActionSequencer, ActionStep, SequenceReport, StepReport};
pub use text::{dial_address, escape_text, sanitize_digits};
