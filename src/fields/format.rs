//! Rendering of merged values, including values derived from other fields
//! of the same job (efficiency, CPU shares, column alignment).

use std::collections::BTreeSet;

use super::parse::FAR_FUTURE;
use super::time::{elapsed_to_seconds, try_parse_time};
use super::{FieldId, Value};
use crate::slurm::MergedJob;

/// Shown in place of a value that is unknown or zero.
pub const PLACEHOLDER: &str = "--";

const UNIT_PREFIXES: [&str; 7] = [" ", "K", "M", "G", "T", "P", "E"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Plain,
    /// Byte count annotated with the node(s) stored in `node`.
    ByteSize { node: FieldId },
    /// Share of the total CPU time.
    CpuShare,
    Duration,
    /// Duration followed by the job's CPU efficiency.
    CpuTime,
    MemRequest,
    State,
    Date,
}

impl Format {
    pub fn apply(self, value: &Value, job: &MergedJob) -> String {
        let record = &job.record;
        match self {
            Format::Plain => match value {
                Value::Text(s) => s.clone(),
                Value::Count(n) => n.to_string(),
                Value::Bytes(b) => format_bs(*b),
            },
            Format::ByteSize { node } => {
                let size = format_bs(value.as_bytes());
                let nodes = record[node].as_text();
                if nodes.is_empty() {
                    size
                } else {
                    format!("{size} ({nodes})")
                }
            }
            Format::CpuShare => {
                let total = elapsed_to_seconds(record[FieldId::TotalCpu].as_text());
                if total == 0.0 {
                    return PLACEHOLDER.to_string();
                }
                let share = elapsed_to_seconds(value.as_text()) / total * 100.0;
                format!("{share:5.1}%")
            }
            Format::Duration => format_duration(value.as_text(), day_width(job)),
            Format::CpuTime => {
                let shown = format_duration(value.as_text(), day_width(job));
                if shown == PLACEHOLDER || try_parse_time(value.as_text()).is_none() {
                    return shown;
                }
                format!("{shown} (efficiency: {:.2}%)", job_efficiency(job))
            }
            Format::MemRequest => format_mem_request(value.as_text()),
            Format::State => format_state(
                value.as_text(),
                &job.queue.reason,
                &job.queue.dependencies,
            ),
            Format::Date => format_date(value.as_text()),
        }
    }
}

/// Render a byte count with the largest binary prefix that keeps the
/// mantissa below 1024, e.g. `1.00G` for 2^30 and `0.00 ` for zero.
pub fn format_bs(bytes: f64) -> String {
    let mut value = if bytes.is_finite() && bytes > 0.0 { bytes } else { 0.0 };
    let mut unit = 0;
    while value >= 1024.0 && unit < UNIT_PREFIXES.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2}{}", UNIT_PREFIXES[unit])
}

/// Percentage of the reserved cores kept busy over the job's wall time.
/// Zero when any input is zero.
pub fn efficiency(total_cpu_seconds: f64, elapsed_seconds: f64, ncpus: u64) -> f64 {
    if total_cpu_seconds == 0.0 || elapsed_seconds == 0.0 || ncpus == 0 {
        return 0.0;
    }
    100.0 * total_cpu_seconds / (ncpus as f64 * elapsed_seconds)
}

pub fn job_efficiency(job: &MergedJob) -> f64 {
    let record = &job.record;
    efficiency(
        elapsed_to_seconds(record[FieldId::TotalCpu].as_text()),
        elapsed_to_seconds(record[FieldId::Elapsed].as_text()),
        record[FieldId::Ncpus].as_count(),
    )
}

/// Width of the widest day component among the durations printed in the
/// report, so their clock parts line up.
fn day_width(job: &MergedJob) -> usize {
    let record = &job.record;
    [
        record[FieldId::Timelimit].as_text(),
        record[FieldId::Elapsed].as_text(),
        record[FieldId::TotalCpu].as_text(),
        "-",
    ]
    .iter()
    .filter_map(|t| t.trim().split_once('-').map(|(days, _)| days.len()))
    .max()
    .unwrap_or(0)
}

/// Render a duration with its day part right-aligned to `day_width`.
/// Non-durations such as `UNLIMITED` are passed through.
pub fn format_duration(raw: &str, day_width: usize) -> String {
    let Some(t) = try_parse_time(raw) else {
        let raw = raw.trim();
        return if raw.is_empty() || raw == super::combine::INVALID {
            PLACEHOLDER.to_string()
        } else {
            raw.to_string()
        };
    };
    if t.is_zero() {
        return PLACEHOLDER.to_string();
    }

    let clock = t.clock();
    if day_width == 0 {
        t.to_string()
    } else if t.days > 0 {
        format!("{:>day_width$}-{clock}", t.days)
    } else {
        format!("{}{clock}", " ".repeat(day_width + 1))
    }
}

/// `4000Mc` is per core, `4000Mn` per node.
pub fn format_mem_request(raw: &str) -> String {
    if let Some(amount) = raw.strip_suffix('c') {
        format!("{amount}/core")
    } else if let Some(amount) = raw.strip_suffix('n') {
        format!("{amount}/node")
    } else {
        raw.to_string()
    }
}

/// Collapse the merged state set. `COMPLETED` is dropped when some other
/// state is present (a cancelled job has completed steps). The pending
/// reason and dependency list follow when known.
pub fn format_state(states: &str, reason: &str, dependencies: &str) -> String {
    let tokens: BTreeSet<&str> = states
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    let significant: Vec<&str> = tokens
        .iter()
        .copied()
        .filter(|t| *t != "COMPLETED")
        .collect();

    let mut out = if significant.is_empty() {
        tokens.into_iter().collect::<Vec<_>>().join(",")
    } else {
        significant.join(",")
    };
    if !reason.is_empty() {
        out.push(' ');
        out.push_str(reason);
    }
    if !dependencies.is_empty() {
        out.push_str(&format!(" ({dependencies})"));
    }
    out
}

pub fn format_date(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("unknown") || trimmed == FAR_FUTURE {
        PLACEHOLDER.to_string()
    } else {
        raw.to_string()
    }
}
