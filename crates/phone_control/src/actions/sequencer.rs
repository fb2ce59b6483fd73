//! Ordered, timed command batches for device actions
//!
//! Sequences are open loop: the bridge cannot observe on-device UI state, so
//! a step that "succeeded" only means adb accepted the command. Steps after
//! the device check run unconditionally and nothing is rolled back.

use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::actions::request::{ActionKind, ActionOutcome, ActionRequest, Completion};
use crate::actions::text::escape_text;
use crate::adb::commands::{self, keycode};
use crate::adb::{CommandResult, CommandRunner, Device, DeviceRegistry};
use crate::config::{secs, TimingConfig};
use crate::error::{ControlError, Result};

/// One command in a sequence
#[derive(Debug, Clone)]
pub struct ActionStep {
    pub label: &'static str,
    pub args: Vec<String>,
    pub timeout: Duration,
    /// Wait after the command before the next step
    pub post_delay: Duration,
    /// Skip the remaining steps when this one fails
    pub abort_on_failure: bool,
}

impl ActionStep {
    fn new(label: &'static str, args: Vec<String>, timeout: f64) -> Self {
        Self {
            label,
            args,
            timeout: secs(timeout),
            post_delay: Duration::ZERO,
            abort_on_failure: false,
        }
    }

    fn then_wait(mut self, delay: f64) -> Self {
        self.post_delay = secs(delay);
        self
    }

    fn required(mut self) -> Self {
        self.abort_on_failure = true;
        self
    }
}

/// Result of one executed step
#[derive(Debug, Clone)]
pub struct StepReport {
    pub label: &'static str,
    pub result: CommandResult,
}

/// Results of an executed sequence
#[derive(Debug, Clone, Default)]
pub struct SequenceReport {
    pub steps: Vec<StepReport>,
    /// Set when a required step failed and later steps were skipped
    pub aborted: bool,
}

impl SequenceReport {
    pub fn all_succeeded(&self) -> bool {
        !self.aborted && self.steps.iter().all(|s| s.result.succeeded)
    }

    pub fn first_failure(&self) -> Option<&StepReport> {
        self.steps.iter().find(|s| !s.result.succeeded)
    }
}

/// Steps for sending a text message to `digits` from `device_id`
pub fn send_message_steps(
    device_id: &str,
    digits: &str,
    body: &str,
    timing: &TimingConfig,
) -> Vec<ActionStep> {
    let delays = &timing.sequence;
    let timeouts = &timing.timeouts;
    vec![
        open_compose_step(device_id, digits, timing).then_wait(delays.compose_open_delay),
        ActionStep::new(
            "clear field",
            commands::key_event(device_id, keycode::DEL),
            timeouts.key_event,
        )
        .then_wait(delays.text_clear_delay),
        ActionStep::new(
            "type message",
            commands::input_text(device_id, &escape_text(body)),
            timeouts.text_input,
        )
        .then_wait(delays.text_input_delay),
        ActionStep::new(
            "focus send",
            commands::key_event(device_id, keycode::TAB),
            timeouts.key_event,
        )
        .then_wait(delays.focus_move_delay),
        ActionStep::new(
            "press send",
            commands::key_event(device_id, keycode::ENTER),
            timeouts.key_event,
        ),
    ]
}

fn open_compose_step(device_id: &str, address: &str, timing: &TimingConfig) -> ActionStep {
    ActionStep::new(
        "open compose",
        commands::open_compose(device_id, address),
        timing.timeouts.intent,
    )
}

fn step_error(action: ActionKind, step: &StepReport) -> ControlError {
    if step.result.channel_unavailable() {
        ControlError::ChannelUnavailable(step.result.diagnostic())
    } else {
        ControlError::CommandFailed {
            action: action.as_str().to_string(),
            detail: format!("{}: {}", step.label, step.result.diagnostic()),
        }
    }
}

/// Runs device actions as command sequences
pub struct ActionSequencer<'a> {
    runner: &'a dyn CommandRunner,
    timing: &'a TimingConfig,
}

impl<'a> ActionSequencer<'a> {
    pub fn new(runner: &'a dyn CommandRunner, timing: &'a TimingConfig) -> Self {
        Self { runner, timing }
    }

    /// Execute steps in order, honouring post-delays and required steps
    pub async fn execute(&self, steps: &[ActionStep]) -> SequenceReport {
        let mut report = SequenceReport::default();

        for step in steps {
            let result = self.runner.run(&step.args, step.timeout).await;
            let failed = !result.succeeded;
            if failed {
                warn!("step '{}' failed: {}", step.label, result.diagnostic());
            } else {
                debug!("step '{}' ok", step.label);
            }
            report.steps.push(StepReport {
                label: step.label,
                result,
            });

            if failed && step.abort_on_failure {
                report.aborted = true;
                break;
            }
            if !step.post_delay.is_zero() {
                sleep(step.post_delay).await;
            }
        }

        report
    }

    /// Validate, resolve the device, and dispatch on the action kind
    pub async fn perform(&self, request: &ActionRequest) -> Result<ActionOutcome> {
        let span = info_span!("action", id = %Uuid::new_v4(), kind = request.kind.as_str());
        async {
            let outcome = match request.kind {
                ActionKind::Call => self.handle_call(request).await,
                ActionKind::OpenMessage => self.handle_open_message(request).await,
                ActionKind::SendMessage => self.handle_send_message(request).await,
            };
            match &outcome {
                Ok(o) => info!("{} ({})", o.message, o.completion.code()),
                Err(e) => warn!("action failed: {} ({})", e, e.code()),
            }
            outcome
        }
        .instrument(span)
        .await
    }

    /// Validation and device resolution shared by every action
    async fn prepare(&self, request: &ActionRequest) -> Result<(Device, String)> {
        request.validate()?;
        let target = request.target_address()?;
        let device = DeviceRegistry::new(self.runner, self.timing)
            .probe()
            .await?
            .ok_or(ControlError::DeviceNotConnected)?;
        Ok((device, target))
    }

    fn outcome(
        &self,
        request: &ActionRequest,
        device: Device,
        message: String,
        completion: Completion,
    ) -> ActionOutcome {
        ActionOutcome {
            kind: request.kind,
            device: device.id,
            message,
            contact: request.contact_name().to_string(),
            phone_number: request.phone_number.clone(),
            completion,
        }
    }

    async fn run_single(&self, kind: ActionKind, step: ActionStep) -> Result<()> {
        let report = self.execute(&[step.required()]).await;
        match report.first_failure() {
            Some(failed) => Err(step_error(kind, failed)),
            None => Ok(()),
        }
    }

    async fn handle_call(&self, request: &ActionRequest) -> Result<ActionOutcome> {
        let (device, number) = self.prepare(request).await?;
        info!("Initiating call to {} ({})", request.contact_name(), number);

        let step = ActionStep::new(
            "start call",
            commands::start_call(&device.id, &number),
            self.timing.timeouts.intent,
        );
        self.run_single(ActionKind::Call, step).await?;

        let message = format!("Calling {}", request.contact_name());
        Ok(self.outcome(request, device, message, Completion::Complete))
    }

    async fn handle_open_message(&self, request: &ActionRequest) -> Result<ActionOutcome> {
        let (device, number) = self.prepare(request).await?;

        let step = open_compose_step(&device.id, &number, self.timing);
        self.run_single(ActionKind::OpenMessage, step).await?;

        let message = format!("Message app opened for {}", request.contact_name());
        Ok(self.outcome(request, device, message, Completion::Complete))
    }

    /// Open compose, clear, type, move focus, send.
    ///
    /// If any step cannot be confirmed the compose view is opened again on its
    /// own and the outcome asks the user to finish sending by hand.
    async fn handle_send_message(&self, request: &ActionRequest) -> Result<ActionOutcome> {
        let (device, digits) = self.prepare(request).await?;
        let body = request.message_body()?;
        info!("Sending message to {} ({})", request.contact_name(), digits);

        let steps = send_message_steps(&device.id, &digits, body, self.timing);
        let report = self.execute(&steps).await;
        if report.all_succeeded() {
            let message = format!("Message sent to {}", request.contact_name());
            return Ok(self.outcome(request, device, message, Completion::Complete));
        }

        if let Some(failed) = report.first_failure() {
            warn!(
                "send sequence unconfirmed at '{}', falling back to compose view",
                failed.label
            );
        }
        let compose_opened = report
            .steps
            .first()
            .map(|s| s.result.succeeded)
            .unwrap_or(false);

        let fallback = self
            .execute(&[open_compose_step(&device.id, &digits, self.timing)])
            .await;
        if compose_opened || fallback.all_succeeded() {
            let message = "Message app opened - please send manually".to_string();
            return Ok(self.outcome(
                request,
                device,
                message,
                Completion::ManualCompletionRequired,
            ));
        }

        let failed = fallback
            .first_failure()
            .or_else(|| report.first_failure())
            .ok_or_else(|| ControlError::CommandFailed {
                action: ActionKind::SendMessage.as_str().to_string(),
                detail: "compose view did not open".to_string(),
            })?;
        Err(step_error(ActionKind::SendMessage, failed))
    }
}
