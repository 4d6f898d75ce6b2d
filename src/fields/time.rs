//! Slurm duration strings: `[DD-][hh:]mm:ss[.frac]`.

use std::fmt;

/// The components of a Slurm duration.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Elapsed {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: f64,
}

impl Elapsed {
    /// Flatten to a single count of seconds.
    pub fn total_seconds(&self) -> f64 {
        self.days as f64 * 86_400.0
            + self.hours as f64 * 3_600.0
            + self.minutes as f64 * 60.0
            + self.seconds
    }

    /// True when the duration renders as `00:00:00`.
    pub fn is_zero(&self) -> bool {
        self.days == 0 && self.hours == 0 && self.minutes == 0 && self.seconds < 1.0
    }

    /// `hh:mm:ss` without the day component; fractional seconds are truncated.
    pub fn clock(&self) -> String {
        format!(
            "{:02}:{:02}:{:02}",
            self.hours,
            self.minutes,
            self.seconds.trunc() as u64
        )
    }
}

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.days > 0 {
            write!(f, "{}-{}", self.days, self.clock())
        } else {
            f.write_str(&self.clock())
        }
    }
}

fn digits(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn seconds(s: &str) -> Option<f64> {
    let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
    digits(whole)?;
    if !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Parse a duration, returning `None` when the input is not one
/// (empty, `UNLIMITED`, `INVALID`, garbage).
pub fn try_parse_time(raw: &str) -> Option<Elapsed> {
    let raw = raw.trim();
    let (days, clock) = match raw.split_once('-') {
        Some((days, rest)) => (digits(days)?, rest),
        None => (0, raw),
    };

    let parts: Vec<&str> = clock.split(':').collect();
    let (hours, minutes, secs) = match parts.as_slice() {
        [m, s] => (0, *m, *s),
        [h, m, s] => (digits(h)?, *m, *s),
        _ => return None,
    };

    Some(Elapsed {
        days,
        hours,
        minutes: digits(minutes)?,
        seconds: seconds(secs)?,
    })
}

/// Parse a duration; anything unparsable yields all-zero components.
pub fn parse_time(raw: &str) -> Elapsed {
    try_parse_time(raw).unwrap_or_default()
}

/// Seconds represented by a duration string, 0 when unparsable.
pub fn elapsed_to_seconds(raw: &str) -> f64 {
    parse_time(raw).total_seconds()
}
