//! Optional GPU utilization lookup for jobs on GPU nodes.
//!
//! The stage is independent of the merge pipeline: it takes the job's node
//! list and run time window and returns one average per node. Callers treat
//! any error as a warning.

pub mod nodelist;
pub mod prometheus;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::Serialize;

use crate::error::{JobinfoError, Result};
use crate::fields::parse::FAR_FUTURE;
use crate::fields::FieldId;
use crate::slurm::MergedJob;

pub use nodelist::expand_nodelist;
pub use prometheus::PrometheusClient;

/// Source of GPU utilization samples.
#[allow(async_fn_in_trait)]
pub trait GpuMetrics {
    /// Mean utilization in percent of `node` over `window`.
    async fn average_utilization(&self, node: &str, window: &TimeWindow) -> Result<f64>;
}

/// A closed interval of Unix timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
}

impl TimeWindow {
    /// Window the job has been running in. A job that is still running, or
    /// has no usable end time, ends `now`. `None` when the start is unknown.
    pub fn for_job(job: &MergedJob, now: DateTime<Local>) -> Option<Self> {
        let start = slurm_timestamp(job.record[FieldId::Start].as_text())?;
        let end = if job.is_running() {
            now.timestamp()
        } else {
            slurm_timestamp(job.record[FieldId::End].as_text()).unwrap_or(now.timestamp())
        };
        (start <= end).then_some(Self { start, end })
    }
}

/// Unix time of a Slurm `YYYY-MM-DDTHH:MM:SS` timestamp in local time.
fn slurm_timestamp(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw == FAR_FUTURE {
        return None;
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|t| t.timestamp())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GpuUsage {
    pub node: String,
    pub percent: f64,
}

/// Average utilization of every node in `nodelist`.
pub async fn collect_gpu_usage<G: GpuMetrics>(
    metrics: &G,
    nodelist: &str,
    window: &TimeWindow,
) -> Result<Vec<GpuUsage>> {
    let nodes = expand_nodelist(nodelist)?;
    if nodes.is_empty() {
        return Err(JobinfoError::Metrics("job has no allocated nodes".to_string()));
    }

    let mut usage = Vec::with_capacity(nodes.len());
    for node in nodes {
        let percent = metrics.average_utilization(&node, window).await?;
        usage.push(GpuUsage { node, percent });
    }
    Ok(usage)
}
