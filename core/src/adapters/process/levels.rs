//! Log level inference for child process output.

use std::sync::OnceLock;

use regex::Regex;

/// Severity inferred from a line of child output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineLevel {
    Error,
    Warn,
    Info,
    Debug,
}

fn socat_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // "2024/05/01 10:00:00 socat[1234] E connect(5, ...): Connection refused"
    PATTERN.get_or_init(|| Regex::new(r"socat\[\d+\] ([FEWNID]) ").expect("valid regex"))
}

fn bracket_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // "[ERROR] ...", "[WARN] ...", "2024-05-01T10:00:00Z [DEBUG] ..."
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\[(ERROR|ERR|WARN|WARNING|INFO|DEBUG|TRACE)\]").expect("valid regex")
    })
}

/// Infers the level of a line written by a child process.
///
/// Lines that carry no recognizable marker are treated as informational.
pub fn infer_level(line: &str) -> LineLevel {
    if let Some(caps) = socat_pattern().captures(line) {
        return match &caps[1] {
            "F" | "E" => LineLevel::Error,
            "W" => LineLevel::Warn,
            "N" | "I" => LineLevel::Info,
            _ => LineLevel::Debug,
        };
    }

    if let Some(caps) = bracket_pattern().captures(line) {
        return match caps[1].to_uppercase().as_str() {
            "ERROR" | "ERR" => LineLevel::Error,
            "WARN" | "WARNING" => LineLevel::Warn,
            "INFO" => LineLevel::Info,
            _ => LineLevel::Debug,
        };
    }

    LineLevel::Info
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_socat_levels() {
        assert_eq!(
            infer_level(
                "2024/05/01 10:00:00 socat[1234] E connect(5, AF=2 10.0.0.4:8080, 16): \
                 Connection refused"
            ),
            LineLevel::Error
        );
        assert_eq!(
            infer_level("2024/05/01 10:00:00 socat[1234] W exiting on signal 15"),
            LineLevel::Warn
        );
        assert_eq!(
            infer_level("2024/05/01 10:00:00 socat[1234] N listening on AF=2 0.0.0.0:8081"),
            LineLevel::Info
        );
        assert_eq!(
            infer_level("2024/05/01 10:00:00 socat[1234] D read(6, 0x7f, 8192)"),
            LineLevel::Debug
        );
    }

    #[test]
    fn test_infer_bracket_levels() {
        assert_eq!(infer_level("[ERROR] upstream gone"), LineLevel::Error);
        assert_eq!(infer_level("2024-05-01T10:00:00Z [warn] slow"), LineLevel::Warn);
        assert_eq!(infer_level("[DEBUG] tick"), LineLevel::Debug);
    }

    #[test]
    fn test_unmarked_lines_are_info() {
        assert_eq!(infer_level("Forwarding from 0.0.0.0:8081 -> 8080"), LineLevel::Info);
        assert_eq!(infer_level(""), LineLevel::Info);
    }
}
