use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::JobinfoError;
use crate::fields::{FieldDef, FieldId, FIELDS};
use crate::record::Record;

/// A validated Slurm job id: `<jobid>` or `<jobid>_<taskid>` for array tasks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Step id of the job's batch script.
    pub fn batch_step(&self) -> String {
        format!("{}.batch", self.0)
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

impl FromStr for JobId {
    type Err = JobinfoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let valid = match s.split_once('_') {
            Some((job, task)) => all_digits(job) && all_digits(task),
            None => all_digits(s),
        };
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(JobinfoError::InvalidJobId(s.to_string()))
        }
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Scheduling metadata of a pending job, as reported by `squeue`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueInfo {
    pub dependencies: String,
    pub reason: String,
}

impl QueueInfo {
    /// Parse a `dependencies;reason` line. `squeue` prints `(null)` and
    /// `None` when there is nothing to report.
    pub fn parse(line: &str) -> Self {
        let (dependencies, reason) = line.trim().split_once(';').unwrap_or((line.trim(), ""));
        let clean = |s: &str| match s.trim() {
            "(null)" | "None" => String::new(),
            other => other.to_string(),
        };
        Self {
            dependencies: clean(dependencies),
            reason: clean(reason),
        }
    }
}

/// The reconciled view of one job.
#[derive(Debug, Clone)]
pub struct MergedJob {
    pub id: JobId,
    pub record: Record,
    pub queue: QueueInfo,
}

impl MergedJob {
    pub fn new(id: JobId, record: Record) -> Self {
        Self {
            id,
            record,
            queue: QueueInfo::default(),
        }
    }

    /// Leading word of every merged state token (`CANCELLED by 1000` is `CANCELLED`).
    pub fn states(&self) -> impl Iterator<Item = &str> {
        self.record[FieldId::State]
            .as_text()
            .split(',')
            .filter_map(|t| t.split_whitespace().next())
    }

    pub fn has_state(&self, state: &str) -> bool {
        self.states().any(|s| s == state)
    }

    pub fn is_running(&self) -> bool {
        self.has_state("RUNNING")
    }

    pub fn is_pending(&self) -> bool {
        self.has_state("PENDING")
    }

    pub fn owner(&self) -> &str {
        self.record[FieldId::User].as_text()
    }

    pub fn format_field(&self, id: FieldId) -> String {
        id.def().format.apply(&self.record[id], self)
    }

    /// Every visible field with its rendered value, in registry order.
    pub fn visible_fields(&self) -> Vec<(&'static FieldDef, String)> {
        FIELDS
            .iter()
            .filter(|f| f.visible)
            .map(|f| (f, self.format_field(f.id)))
            .collect()
    }
}
