//! Test utilities for driving controllers without a real device
//!
//! [`ScriptedRunner`] answers commands from a table of canned results and
//! records every invocation for later assertions.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::adb::{CommandResult, CommandRunner};

struct Rule {
    needle: Vec<String>,
    responses: VecDeque<CommandResult>,
}

impl Rule {
    fn matches(&self, args: &[String]) -> bool {
        !self.needle.is_empty()
            && args
                .windows(self.needle.len())
                .any(|window| window == self.needle.as_slice())
    }

    fn next_response(&mut self) -> CommandResult {
        if self.responses.len() > 1 {
            self.responses.pop_front().unwrap_or_else(success)
        } else {
            self.responses.front().cloned().unwrap_or_else(success)
        }
    }
}

fn success() -> CommandResult {
    CommandResult::exited(0, "", "")
}

/// Build `adb devices` output for the given `(id, state)` pairs
pub fn device_listing(devices: &[(&str, &str)]) -> String {
    let mut output = String::from("List of devices attached\n");
    for (id, state) in devices {
        output.push_str(&format!("{}\t{}\n", id, state));
    }
    output.push('\n');
    output
}

/// A [`CommandRunner`] that replays canned results.
///
/// Rules match when their tokens appear as a contiguous run in the argument
/// list; the first matching rule wins. Unmatched commands succeed with empty
/// output.
#[derive(Default)]
pub struct ScriptedRunner {
    rules: Mutex<Vec<Rule>>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every command containing `needle` with `result`
    pub fn on(self, needle: &[&str], result: CommandResult) -> Self {
        self.on_sequence(needle, vec![result])
    }

    /// Answer successive matches with successive results, repeating the last
    pub fn on_sequence(self, needle: &[&str], results: Vec<CommandResult>) -> Self {
        self.rules
            .lock()
            .expect("rules lock poisoned")
            .push(Rule {
                needle: needle.iter().map(|s| s.to_string()).collect(),
                responses: results.into(),
            });
        self
    }

    /// Make `adb devices` report the given devices
    pub fn with_devices(self, devices: &[(&str, &str)]) -> Self {
        self.on(
            &["devices"],
            CommandResult::exited(0, device_listing(devices), ""),
        )
    }

    /// Every argument list passed to `run`, in order
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }

    /// Number of recorded calls containing `needle`
    pub fn count(&self, needle: &[&str]) -> usize {
        let needle: Vec<String> = needle.iter().map(|s| s.to_string()).collect();
        self.calls()
            .iter()
            .filter(|args| args.windows(needle.len()).any(|w| w == needle.as_slice()))
            .count()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, args: &[String], _timeout: Duration) -> CommandResult {
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .push(args.to_vec());

        let mut rules = self.rules.lock().expect("rules lock poisoned");
        rules
            .iter_mut()
            .find(|rule| rule.matches(args))
            .map(Rule::next_response)
            .unwrap_or_else(success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_rule_matches_whole_tokens() {
        let runner = ScriptedRunner::new().on(&["connect"], CommandResult::exited(1, "", "nope"));

        let disconnect = runner
            .run(&args(&["disconnect", "1.2.3.4:5555"]), Duration::ZERO)
            .await;
        assert!(disconnect.succeeded);

        let connect = runner
            .run(&args(&["connect", "1.2.3.4:5555"]), Duration::ZERO)
            .await;
        assert!(!connect.succeeded);
        assert_eq!(runner.count(&["connect"]), 1);
    }

    #[tokio::test]
    async fn test_sequence_repeats_last() {
        let runner = ScriptedRunner::new().on_sequence(
            &["devices"],
            vec![
                CommandResult::exited(0, "first", ""),
                CommandResult::exited(0, "second", ""),
            ],
        );
        let devices = args(&["devices"]);
        assert_eq!(runner.run(&devices, Duration::ZERO).await.stdout, "first");
        assert_eq!(runner.run(&devices, Duration::ZERO).await.stdout, "second");
        assert_eq!(runner.run(&devices, Duration::ZERO).await.stdout, "second");
    }
}
