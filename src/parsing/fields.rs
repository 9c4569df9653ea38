
use crate::parsing::table_io::TableError;

/// Tokens that mean "no value" in the input tables
const MISSING_TOKENS: [&str; 6] = ["", "NA", "NaN", "nan", "None", "."];

/// Returns true if the raw field represents a missing value
pub fn is_missing(value: &str) -> bool {
    MISSING_TOKENS.contains(&value.trim())
}

/// Parses a required positive integer field, such as a position
pub fn parse_u64(value: &str, column: &str, line: u64) -> Result<u64, TableError> {
    value.trim().parse::<u64>()
        .map_err(|_| TableError::InvalidInteger {
            column: column.to_string(),
            line,
            value: value.to_string()
        })
}

/// Parses an optional count field, such as a sample size; missing tokens become None.
/// Float-typed counts are accepted when integral, so "257841.0" gives 257841.
pub fn parse_optional_count(value: &str, column: &str, line: u64) -> Result<Option<u64>, TableError> {
    if is_missing(value) {
        return Ok(None);
    }
    if let Ok(count) = value.trim().parse::<u64>() {
        return Ok(Some(count));
    }
    match value.trim().parse::<f64>() {
        Ok(v) if v >= 0.0 && v.fract() == 0.0 && v < u64::MAX as f64 => Ok(Some(v as u64)),
        _ => Err(TableError::InvalidInteger {
            column: column.to_string(),
            line,
            value: value.to_string()
        })
    }
}

/// Parses an optional float field; missing tokens become None, anything else must parse
pub fn parse_optional_f64(value: &str, column: &str, line: u64) -> Result<Option<f64>, TableError> {
    if is_missing(value) {
        return Ok(None);
    }
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_nan() => Ok(None),
        Ok(v) => Ok(Some(v)),
        Err(_) => Err(TableError::InvalidFloat {
            column: column.to_string(),
            line,
            value: value.to_string()
        })
    }
}

/// Lenient float parse: anything that does not parse as a finite-or-infinite number becomes None
pub fn coerce_f64(value: &str) -> Option<f64> {
    match value.trim().parse::<f64>() {
        Ok(v) if !v.is_nan() => Some(v),
        _ => None
    }
}

/// Formats a float for output; very small or very large magnitudes switch to exponent notation
/// so that p-values like 1e-300 do not expand into hundreds of digits.
pub fn format_f64(value: f64) -> String {
    let magnitude = value.abs();
    if value != 0.0 && value.is_finite() && !(1e-5..1e16).contains(&magnitude) {
        format!("{value:e}")
    } else {
        format!("{value}")
    }
}

/// Formats an optional float, None becomes the empty field
pub fn format_optional_f64(value: Option<f64>) -> String {
    value.map(format_f64).unwrap_or_default()
}

/// Formats any optional displayable value, None becomes the empty field
pub fn format_optional<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
