//! Combinators fold two values of the same field from different records.

use std::collections::BTreeSet;

use super::parse::FAR_FUTURE;
use super::Value;

pub const UNLIMITED: &str = "UNLIMITED";
pub const INVALID: &str = "INVALID";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combine {
    KeepFirst,
    Max,
    TimeMax,
    TimeMin,
    Append,
}

impl Combine {
    pub fn apply(self, a: Value, b: Value) -> Value {
        match self {
            Combine::KeepFirst => keep_first(a, b),
            Combine::Max => max(a, b),
            Combine::TimeMax => on_text(a, b, time_max),
            Combine::TimeMin => on_text(a, b, time_min),
            Combine::Append => on_text(a, b, append),
        }
    }
}

// Text-only combinators keep the first operand if handed anything else.
fn on_text(a: Value, b: Value, f: fn(&str, &str) -> String) -> Value {
    if let (Value::Text(x), Value::Text(y)) = (&a, &b) {
        return Value::Text(f(x, y));
    }
    keep_first(a, b)
}

/// First known value wins.
pub fn keep_first(a: Value, b: Value) -> Value {
    if a.is_empty() {
        b
    } else {
        a
    }
}

pub fn max(a: Value, b: Value) -> Value {
    if b > a {
        b
    } else {
        a
    }
}

fn is_absent(t: &str) -> bool {
    t.is_empty() || t == INVALID
}

/// Maximum over duration strings and their sentinels. `UNLIMITED` beats
/// everything, empty and `INVALID` count as missing. Two real durations are
/// compared as text, which matches their zero-padded encoding.
pub fn time_max(a: &str, b: &str) -> String {
    if a == UNLIMITED || b == UNLIMITED {
        return UNLIMITED.to_string();
    }
    if is_absent(a) {
        return b.to_string();
    }
    if is_absent(b) {
        return a.to_string();
    }
    a.max(b).to_string()
}

/// Minimum counterpart of [`time_max`] for sentinels. `UNLIMITED` and the
/// far-future date lose against anything, including a missing value.
///
/// NOTE: two real values are resolved with the *maximum*, matching the
/// accounting tool this output is compared against. Start times therefore
/// report the latest step start.
pub fn time_min(a: &str, b: &str) -> String {
    if a == UNLIMITED || a == FAR_FUTURE {
        return b.to_string();
    }
    if b == UNLIMITED || b == FAR_FUTURE {
        return a.to_string();
    }
    if is_absent(a) {
        return b.to_string();
    }
    if is_absent(b) {
        return a.to_string();
    }
    a.max(b).to_string()
}

/// Union of two comma separated token sets, sorted, without empty tokens.
pub fn append(a: &str, b: &str) -> String {
    a.split(',')
        .chain(b.split(','))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>()
        .join(",")
}
