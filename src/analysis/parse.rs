//! Detector output adapter
//!
//! Accepted shapes:
//!
//! - linguist JSON: `{"Go": {"size": 123, "percentage": "80.00"}}`
//! - plain mapping: `{"Go": 80.0}`
//! - ordered pairs: `[["Go", 80.0], ["Python", "20.00"]]`
//! - linguist text: one `80.00%  12345  Go` line per language
//!
//! Anything else is rejected rather than coerced.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::census::LanguageStats;
use crate::error::AnalysisError;

lazy_static! {
    static ref TEXT_LINE: Regex =
        Regex::new(r"^\s*(\d+(?:\.\d+)?)%\s+(?:\d+\s+)?(\S.*?)\s*$").expect("valid regex");
}

/// Parse raw detector output into language shares
pub fn parse_detector_output(raw: &str) -> Result<LanguageStats, AnalysisError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(LanguageStats::new());
    }

    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        let value: Value = serde_json::from_str(trimmed)?;
        return parse_json(&value);
    }

    parse_text(trimmed)
}

fn parse_json(value: &Value) -> Result<LanguageStats, AnalysisError> {
    let mut stats = LanguageStats::new();

    match value {
        Value::Object(map) => {
            for (language, entry) in map {
                let raw = match entry {
                    Value::Object(details) => details.get("percentage").ok_or_else(|| {
                        AnalysisError::UnrecognizedOutput(format!(
                            "entry for '{}' has no percentage",
                            language
                        ))
                    })?,
                    other => other,
                };
                add(&mut stats, language, percentage(language, raw)?)?;
            }
        }
        Value::Array(pairs) => {
            for pair in pairs {
                match pair.as_array().map(Vec::as_slice) {
                    Some([Value::String(language), raw]) => {
                        add(&mut stats, language, percentage(language, raw)?)?;
                    }
                    _ => {
                        return Err(AnalysisError::UnrecognizedOutput(format!(
                            "expected [language, percentage] pair, got {}",
                            pair
                        )))
                    }
                }
            }
        }
        other => {
            return Err(AnalysisError::UnrecognizedOutput(format!(
                "expected object or array, got {}",
                other
            )))
        }
    }

    Ok(stats)
}

fn parse_text(text: &str) -> Result<LanguageStats, AnalysisError> {
    let mut stats = LanguageStats::new();

    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        let captures = TEXT_LINE.captures(line).ok_or_else(|| {
            AnalysisError::UnrecognizedOutput(format!("unexpected line '{}'", line.trim()))
        })?;
        let language = &captures[2];
        let value = captures[1]
            .parse::<f64>()
            .map_err(|_| invalid(language, &captures[1]))?;
        add(&mut stats, language, value)?;
    }

    Ok(stats)
}

/// Read a percentage given as a JSON number or numeric string
fn percentage(language: &str, raw: &Value) -> Result<f64, AnalysisError> {
    let value = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().ok(),
        _ => None,
    };
    value.ok_or_else(|| invalid(language, &raw.to_string()))
}

fn add(stats: &mut LanguageStats, language: &str, value: f64) -> Result<(), AnalysisError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(invalid(language, &value.to_string()));
    }
    *stats.entry(language.to_string()).or_insert(0.0) += value;
    Ok(())
}

fn invalid(language: &str, value: &str) -> AnalysisError {
    AnalysisError::InvalidPercentage {
        language: language.to_string(),
        value: value.to_string(),
    }
}
