//! Attribute validators and duration handling
//!
//! Durations in configuration use the familiar `1h30m`, `500ms`, `45s` syntax.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("duration string cannot be empty")]
    Empty,
    #[error("invalid duration {0:?}: expected <number><unit> pairs such as \"1h30m\", units ns, us, ms, s, m, h")]
    Format(String),
    #[error("duration {0:?} is out of range")]
    Overflow(String),
}

fn component_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d+(?:\.\d*)?|\.\d+)(ns|us|µs|ms|s|m|h)").expect("static duration regex")
    })
}

/// Parse a duration string such as `"1h30m"`, `"1.5s"` or `"250ms"`
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DurationError::Empty);
    }
    if trimmed == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total_nanos: f64 = 0.0;
    let mut consumed = 0;
    for caps in component_regex().captures_iter(trimmed) {
        let whole = caps.get(0).ok_or_else(|| DurationError::Format(input.to_string()))?;
        if whole.start() != consumed {
            return Err(DurationError::Format(input.to_string()));
        }
        consumed = whole.end();

        let number: f64 = caps[1]
            .parse()
            .map_err(|_| DurationError::Format(input.to_string()))?;
        let unit_nanos = match &caps[2] {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => return Err(DurationError::Format(input.to_string())),
        };
        total_nanos += number * unit_nanos;
    }

    if consumed != trimmed.len() {
        return Err(DurationError::Format(input.to_string()));
    }
    if !total_nanos.is_finite() || total_nanos > u64::MAX as f64 {
        return Err(DurationError::Overflow(input.to_string()));
    }

    Ok(Duration::from_nanos(total_nanos.round() as u64))
}

/// Format a duration in the same syntax [`parse_duration`] accepts
pub fn format_duration(duration: Duration) -> String {
    if duration.is_zero() {
        return "0s".to_string();
    }
    if duration < Duration::from_secs(1) {
        let nanos = duration.subsec_nanos();
        return if nanos % 1_000_000 == 0 {
            format!("{}ms", nanos / 1_000_000)
        } else if nanos % 1_000 == 0 {
            format!("{}us", nanos / 1_000)
        } else {
            format!("{}ns", nanos)
        };
    }

    let secs = duration.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    let nanos = duration.subsec_nanos();

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{}h", hours));
    }
    if minutes > 0 {
        out.push_str(&format!("{}m", minutes));
    }
    if seconds > 0 || nanos > 0 {
        if nanos > 0 {
            let frac = format!("{:09}", nanos);
            out.push_str(&format!("{}.{}s", seconds, frac.trim_end_matches('0')));
        } else {
            out.push_str(&format!("{}s", seconds));
        }
    }
    out
}

/// Check applied to a configured attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum Validator {
    /// String must be one of the listed values
    OneOf(&'static [&'static str]),
    /// String must be one of the listed values, ignoring case
    OneOfCaseInsensitive(&'static [&'static str]),
    /// String must parse as a duration
    Duration,
    /// Integer must be at least this value
    AtLeast(i64),
}

impl Validator {
    /// Validate a non-null value; returns the problem description on failure
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match self {
            Validator::OneOf(allowed) => {
                let s = value.as_str().unwrap_or_default();
                if allowed.contains(&s) {
                    Ok(())
                } else {
                    Err(format!("value must be one of {:?}, got {:?}", allowed, s))
                }
            }
            Validator::OneOfCaseInsensitive(allowed) => {
                let s = value.as_str().unwrap_or_default();
                if allowed.iter().any(|a| a.eq_ignore_ascii_case(s)) {
                    Ok(())
                } else {
                    Err(format!(
                        "value must be one of {:?} (case-insensitive), got {:?}",
                        allowed, s
                    ))
                }
            }
            Validator::Duration => {
                let s = value.as_str().unwrap_or_default();
                parse_duration(s).map(|_| ()).map_err(|e| e.to_string())
            }
            Validator::AtLeast(min) => match value.as_i64() {
                Some(n) if n >= *min => Ok(()),
                Some(n) => Err(format!("value must be at least {}, got {}", min, n)),
                None => Err("value must be an integer".to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_duration("10us").unwrap(), Duration::from_micros(10));
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert_eq!(parse_duration(""), Err(DurationError::Empty));
        assert!(matches!(parse_duration("10"), Err(DurationError::Format(_))));
        assert!(matches!(parse_duration("1d"), Err(DurationError::Format(_))));
        assert!(matches!(parse_duration("1h x"), Err(DurationError::Format(_))));
        assert!(matches!(parse_duration("-5s"), Err(DurationError::Format(_))));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(5400)), "1h30m");
        assert_eq!(format_duration(Duration::from_secs(3600)), "1h");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::ZERO), "0s");
    }

    #[test]
    fn test_validators() {
        let levels = Validator::OneOf(&["DEBUG", "ERROR"]);
        assert!(levels.check(&json!("DEBUG")).is_ok());
        assert!(levels.check(&json!("debug")).is_err());

        let clouds = Validator::OneOfCaseInsensitive(&["aws", "gcp"]);
        assert!(clouds.check(&json!("AWS")).is_ok());
        assert!(clouds.check(&json!("azure")).is_err());

        assert!(Validator::Duration.check(&json!("15m")).is_ok());
        assert!(Validator::Duration.check(&json!("fifteen")).is_err());

        assert!(Validator::AtLeast(1).check(&json!(3)).is_ok());
        assert!(Validator::AtLeast(1).check(&json!(0)).is_err());
    }
}
