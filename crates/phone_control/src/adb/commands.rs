//! Argument lists for the adb commands this crate issues
//!
//! Commands are built as argv vectors and never pass through a host shell.
//! `adb shell` still joins its trailing arguments into one remote command
//! line, so free text must be escaped with [`crate::actions::escape_text`]
//! before it reaches [`input_text`].

/// Android key codes used by the messaging sequence
pub mod keycode {
    pub const TAB: u16 = 61;
    pub const ENTER: u16 = 66;
    pub const DEL: u16 = 67;
}

const ACTION_CALL: &str = "android.intent.action.CALL";
const ACTION_SENDTO: &str = "android.intent.action.SENDTO";

/// Build ADB command prefix targeting one device
fn device_prefix(device_id: &str) -> Vec<String> {
    vec!["-s".to_string(), device_id.to_string()]
}

fn shell(device_id: &str, args: &[&str]) -> Vec<String> {
    let mut argv = device_prefix(device_id);
    argv.push("shell".to_string());
    argv.extend(args.iter().map(|s| s.to_string()));
    argv
}

/// `adb connect ip:port`
pub fn connect(serial: &str) -> Vec<String> {
    vec!["connect".to_string(), serial.to_string()]
}

/// `adb disconnect <serial>`
pub fn disconnect(serial: &str) -> Vec<String> {
    vec!["disconnect".to_string(), serial.to_string()]
}

/// Start a phone call to `number`
pub fn start_call(device_id: &str, number: &str) -> Vec<String> {
    let uri = format!("tel:{}", number);
    shell(device_id, &["am", "start", "-a", ACTION_CALL, "-d", &uri])
}

/// Open the SMS compose view addressed to `number`
pub fn open_compose(device_id: &str, number: &str) -> Vec<String> {
    let uri = format!("sms:{}", number);
    shell(device_id, &["am", "start", "-a", ACTION_SENDTO, "-d", &uri])
}

/// Press a single key
pub fn key_event(device_id: &str, code: u16) -> Vec<String> {
    let code = code.to_string();
    shell(device_id, &["input", "keyevent", &code])
}

/// Type already-escaped text into the focused field
pub fn input_text(device_id: &str, escaped: &str) -> Vec<String> {
    shell(device_id, &["input", "text", escaped])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_call_args() {
        assert_eq!(
            start_call("emulator-5554", "5551234"),
            vec![
                "-s",
                "emulator-5554",
                "shell",
                "am",
                "start",
                "-a",
                "android.intent.action.CALL",
                "-d",
                "tel:5551234"
            ]
        );
    }

    #[test]
    fn test_open_compose_uses_sms_uri() {
        let args = open_compose("X", "9198765");
        assert_eq!(args.last().unwrap(), "sms:9198765");
        assert!(args.contains(&"android.intent.action.SENDTO".to_string()));
    }

    #[test]
    fn test_input_text_passes_escaped_word_through() {
        let args = input_text("X", r"hello\ \$5");
        assert_eq!(args[3..], ["input", "text", r"hello\ \$5"]);
    }

    #[test]
    fn test_key_event() {
        assert_eq!(key_event("X", keycode::ENTER)[3..], ["input", "keyevent", "66"]);
    }
}
