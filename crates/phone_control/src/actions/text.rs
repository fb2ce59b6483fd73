//! Sanitising of phone numbers and escaping of injected text

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_DIGITS: Regex = Regex::new(r"[^0-9]").expect("valid regex");
}

/// Keep only ASCII digits: `"+91 98-765"` becomes `"9198765"`
pub fn sanitize_digits(address: &str) -> String {
    NON_DIGITS.replace_all(address, "").into_owned()
}

/// Digits with an optional leading `+`, for `tel:`/`sms:` URIs
pub fn dial_address(address: &str) -> String {
    let address = address.trim();
    let digits = sanitize_digits(address);
    if address.starts_with('+') && !digits.is_empty() {
        format!("+{}", digits)
    } else {
        digits
    }
}

/// Characters the device shell would otherwise interpret in an unquoted word
const SHELL_SPECIALS: &[char] = &[
    '\\', '\'', '"', '$', '`', ' ', '\t', '&', '|', ';', '<', '>', '(', ')', '*', '?', '[',
    ']', '{', '}', '#', '~', '!',
];

/// Escape text for the remote shell that `adb shell input text` runs under.
///
/// `adb shell` joins its arguments into one command line, so the result is
/// passed as a bare word: every shell-special character (whitespace included)
/// gets a backslash and the device shell strips them again. Line breaks
/// cannot be typed and become spaces.
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() * 2);
    for ch in text.chars() {
        let ch = if ch == '\n' || ch == '\r' { ' ' } else { ch };
        if SHELL_SPECIALS.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_digits() {
        assert_eq!(sanitize_digits("+91 98-765"), "9198765");
        assert_eq!(sanitize_digits("(555) 123-4567"), "5551234567");
        assert_eq!(sanitize_digits("call me"), "");
    }

    #[test]
    fn test_dial_address_keeps_leading_plus() {
        assert_eq!(dial_address(" +91 98-765 "), "+9198765");
        assert_eq!(dial_address("555 1234"), "5551234");
        assert_eq!(dial_address("+"), "");
    }

    #[test]
    fn test_escape_shell_specials() {
        assert_eq!(escape_text(r#"it's "cool" $5"#), r#"it\'s\ \"cool\"\ \$5"#);
    }

    #[test]
    fn test_escape_backslash_and_backtick() {
        assert_eq!(escape_text(r"a\$"), r"a\\\$");
        assert_eq!(escape_text("`id`"), "\\`id\\`");
    }

    #[test]
    fn test_escape_spaces_and_line_breaks() {
        assert_eq!(escape_text("on my way"), r"on\ my\ way");
        assert_eq!(escape_text("a\nb"), r"a\ b");
    }

    #[test]
    fn test_escape_plain_word_unchanged() {
        assert_eq!(escape_text("hello,world.5"), "hello,world.5");
    }

    /// Run the escaped text through a real shell the way the device parses
    /// the joined `adb shell` command line.
    #[cfg(unix)]
    #[tokio::test]
    async fn test_device_shell_receives_literal_text() {
        for message in [
            r#"it's "cool" $5"#,
            "on my way & back; (soon) *really*?",
            r"back\slash `id` $(id) #tag ~me {a,b} [x]!",
        ] {
            let line = format!("printf %s {}", escape_text(message));
            let output = tokio::process::Command::new("sh")
                .arg("-c")
                .arg(&line)
                .output()
                .await
                .unwrap();
            assert!(output.status.success(), "shell rejected: {line}");
            assert_eq!(String::from_utf8_lossy(&output.stdout), message);
        }
    }
}
