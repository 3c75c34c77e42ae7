//! Stock value formatters.
//!
//! Each constructor returns a [`Formatter`] ready for
//! [`OptionSpec::with_formatter`](crate::OptionSpec::with_formatter).
//!
//! ```
//! use jargon_core::formatters;
//! use serde_json::json;
//!
//! let level = formatters::choice(&["low", "high"]);
//! assert_eq!(level("high"), Ok(json!("high")));
//! assert!(level("medium").is_err());
//! ```

use std::sync::Arc;

use serde_json::{Number, Value};

use crate::option::Formatter;

/// Passes the raw string through.
pub fn string() -> Formatter {
    Arc::new(|raw: &str| Ok::<_, String>(Value::String(raw.to_string())))
}

/// Parses a signed 64-bit integer.
pub fn integer() -> Formatter {
    Arc::new(|raw: &str| {
        raw.trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| "expected an integer".to_string())
    })
}

/// Parses a finite floating point number.
pub fn number() -> Formatter {
    Arc::new(|raw: &str| {
        raw.trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| "expected a number".to_string())
    })
}

/// Parses `true/false`, `yes/no`, `on/off` and `1/0`, case-insensitively.
pub fn boolean() -> Formatter {
    Arc::new(|raw: &str| match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
        "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
        _ => Err("expected a boolean".to_string()),
    })
}

/// Accepts only one of the given values.
pub fn choice(choices: &[&str]) -> Formatter {
    let choices: Vec<String> = choices.iter().map(|c| c.to_string()).collect();
    Arc::new(move |raw: &str| {
        if choices.iter().any(|c| c == raw) {
            Ok(Value::String(raw.to_string()))
        } else {
            Err(format!("expected one of: {}", choices.join(", ")))
        }
    })
}
