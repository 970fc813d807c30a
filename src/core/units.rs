use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::error::{TransformError, TransformResult};

static RE_SHORTHAND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([0-9]*\.?[0-9]+)\s*([kK])?\s*$").unwrap());

/// Expands a shorthand quantity such as `"128k"` into base units.
///
/// A trailing `k`/`K` multiplies the numeric prefix by 1000. Values without a
/// suffix must be whole numbers; a fractional prefix is only accepted with the
/// suffix (`"44.1k"`) and rounded to the nearest unit.
pub fn parse_shorthand(field: &str, value: &str) -> TransformResult<u64> {
    let malformed = || TransformError::MalformedProfileValue {
        field: field.to_string(),
        value: value.to_string(),
    };

    let capture = RE_SHORTHAND.captures(value).ok_or_else(malformed)?;
    let digits = capture.get(1).map(|m| m.as_str()).ok_or_else(malformed)?;
    let multiplier = if capture.get(2).is_some() { 1000 } else { 1 };

    if let Ok(whole) = digits.parse::<u64>() {
        return whole.checked_mul(multiplier).ok_or_else(malformed);
    }

    let number = digits.parse::<f64>().map_err(|_| malformed())?;
    let mut scaled = number * multiplier as f64;
    if multiplier > 1 {
        scaled = scaled.round();
    }
    // u64::MAX as f64 rounds up to 2^64
    if !scaled.is_finite() || scaled.fract() != 0.0 || scaled >= u64::MAX as f64 {
        return Err(malformed());
    }
    Ok(scaled as u64)
}

/// Accepts a JSON number in canonical units.
pub fn from_number(field: &str, value: f64) -> TransformResult<u64> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value >= u64::MAX as f64 {
        return Err(TransformError::MalformedProfileValue {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
    Ok(value as u64)
}
