//! Scalar parsers. Every parser is total: malformed or missing input maps
//! to the field's empty value instead of an error.

use super::Value;

/// Stand-in for an unknown start time. Sorts after every real timestamp.
pub const FAR_FUTURE: &str = "9999-01-01T00:00:00";

const BYTE_SUFFIXES: &str = "KMGTPE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseRule {
    Text,
    Count,
    ByteSize,
    Date,
}

impl ParseRule {
    pub fn parse(self, raw: &str) -> Value {
        match self {
            ParseRule::Text => Value::Text(parse_text(raw)),
            ParseRule::Count => Value::Count(parse_count(raw)),
            ParseRule::ByteSize => Value::Bytes(parse_byte_size(raw)),
            ParseRule::Date => Value::Text(parse_date(raw)),
        }
    }
}

pub fn parse_text(raw: &str) -> String {
    raw.to_string()
}

pub fn parse_count(raw: &str) -> u64 {
    raw.trim().parse().unwrap_or(0)
}

/// `<number><suffix>` where the suffix is one of `K M G T P E` (powers of 1024).
pub fn parse_byte_size(raw: &str) -> f64 {
    let raw = raw.trim();
    if raw.is_empty() || raw == "16?" {
        return 0.0;
    }

    let (number, exponent) = match raw.chars().last() {
        Some(c) if c.is_ascii_alphabetic() => {
            let Some(idx) = BYTE_SUFFIXES.find(c.to_ascii_uppercase()) else {
                return 0.0;
            };
            (&raw[..raw.len() - 1], idx as i32 + 1)
        }
        _ => (raw, 0),
    };

    match number.parse::<f64>() {
        Ok(n) if n.is_finite() && n >= 0.0 => n * 1024f64.powi(exponent),
        _ => 0.0,
    }
}

pub fn parse_date(raw: &str) -> String {
    if raw.trim().is_empty() {
        FAR_FUTURE.to_string()
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_identity() {
        assert_eq!(parse_text("s21n01"), "s21n01");
        assert_eq!(parse_text(""), "");
    }

    #[test]
    fn count_defaults_to_zero() {
        assert_eq!(parse_count("16"), 16);
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("n/a"), 0);
    }

    #[test]
    fn byte_size_suffixes() {
        assert_eq!(parse_byte_size("512"), 512.0);
        assert_eq!(parse_byte_size("2K"), 2048.0);
        assert_eq!(parse_byte_size("2048000K"), 2_097_152_000.0);
        assert_eq!(parse_byte_size("1.5M"), 1.5 * 1024.0 * 1024.0);
        assert_eq!(parse_byte_size("1G"), 1_073_741_824.0);
        assert_eq!(parse_byte_size("1E"), 1024f64.powi(6));
    }

    #[test]
    fn byte_size_sentinels_are_zero() {
        assert_eq!(parse_byte_size(""), 0.0);
        assert_eq!(parse_byte_size("16?"), 0.0);
        assert_eq!(parse_byte_size("12Q"), 0.0);
        assert_eq!(parse_byte_size("K"), 0.0);
    }

    #[test]
    fn date_blank_is_far_future() {
        assert_eq!(parse_date(""), FAR_FUTURE);
        assert_eq!(parse_date("   "), FAR_FUTURE);
        assert_eq!(parse_date("2024-03-01T10:00:00"), "2024-03-01T10:00:00");
        assert!(FAR_FUTURE > "2024-03-01T10:00:00");
    }
}
