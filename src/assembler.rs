//! Orchestration: fetch, merge and enrich everything known about one job.
//!
//! 1. Accounting records are merged into the base record; none is fatal.
//! 2. A running job is overlaid with live statistics when the caller owns
//!    it or is root.
//! 3. A pending job gets its dependencies and pending reason.
//! 4. A GPU job with a known start gets per-node GPU utilization.
//!
//! Steps 2-4 are optional. Their failures become warnings on the report.

use chrono::{DateTime, Local};

use crate::error::{JobinfoError, Result};
use crate::fields::FieldId;
use crate::gpu::{collect_gpu_usage, GpuMetrics, GpuUsage, TimeWindow};
use crate::identity::Caller;
use crate::record::{LiveRecord, Record};
use crate::slurm::{JobId, JobSource, MergedJob, QueueInfo};

/// Everything printed for a job.
#[derive(Debug, Clone)]
pub struct Report {
    pub job: MergedJob,
    pub gpu_usage: Vec<GpuUsage>,
    pub warnings: Vec<String>,
}

pub struct JobReportAssembler<S, G> {
    source: S,
    metrics: Option<G>,
    caller: Caller,
    gpu_partition: String,
}

impl<S: JobSource, G: GpuMetrics> JobReportAssembler<S, G> {
    pub fn new(source: S, caller: Caller) -> Self {
        Self {
            source,
            metrics: None,
            caller,
            gpu_partition: "gpu".to_string(),
        }
    }

    pub fn with_gpu_metrics(mut self, metrics: G) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_gpu_partition(mut self, partition: impl Into<String>) -> Self {
        self.gpu_partition = partition.into();
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn metrics(&self) -> Option<&G> {
        self.metrics.as_ref()
    }

    pub async fn assemble(&self, id: &JobId) -> Result<Report> {
        self.assemble_at(id, Local::now()).await
    }

    /// Like [`assemble`](Self::assemble) with an explicit current time, which
    /// closes the GPU window of a running job.
    pub async fn assemble_at(&self, id: &JobId, now: DateTime<Local>) -> Result<Report> {
        let mut warnings = Vec::new();
        let mut job = self.merge_historical(id).await?;

        if job.is_running() {
            if self.caller.may_inspect(job.owner()) {
                self.overlay_live(&mut job, &mut warnings).await;
            } else {
                tracing::debug!(job_id = %id, owner = job.owner(), "Skipping live statistics of foreign job");
            }
        }

        if job.is_pending() {
            job.queue = self.queue_info(id, &mut warnings).await;
        }

        let gpu_usage = self.gpu_usage(&job, now, &mut warnings).await;

        Ok(Report {
            job,
            gpu_usage,
            warnings,
        })
    }

    async fn merge_historical(&self, id: &JobId) -> Result<MergedJob> {
        let lines = self.source.historical(id).await?;
        tracing::debug!(job_id = %id, records = lines.len(), "Fetched accounting records");

        let record = match Record::merge(lines.iter().map(|l| Record::from_line(l))) {
            Ok(record) => record,
            Err(JobinfoError::EmptyMerge) => return Err(JobinfoError::JobNotFound(id.to_string())),
            Err(e) => return Err(e),
        };
        Ok(MergedJob::new(id.clone(), record))
    }

    async fn overlay_live(&self, job: &mut MergedJob, warnings: &mut Vec<String>) {
        let lines = match self.source.live(&job.id).await {
            Ok(lines) => lines,
            Err(e) => {
                warn(warnings, format!("live statistics unavailable: {e}"));
                return;
            }
        };

        let Ok(live) = LiveRecord::merge(lines.iter().map(|l| LiveRecord::from_line(l))) else {
            tracing::debug!(job_id = %job.id, "No live statistics reported");
            return;
        };
        tracing::debug!(job_id = %job.id, records = lines.len(), "Merging live statistics");
        job.record.overlay_live(live);
    }

    async fn queue_info(&self, id: &JobId, warnings: &mut Vec<String>) -> QueueInfo {
        match self.source.queue(id).await {
            Ok(Some(line)) => QueueInfo::parse(&line),
            Ok(None) => QueueInfo::default(),
            Err(e) => {
                warn(warnings, format!("queue information unavailable: {e}"));
                QueueInfo::default()
            }
        }
    }

    async fn gpu_usage(
        &self,
        job: &MergedJob,
        now: DateTime<Local>,
        warnings: &mut Vec<String>,
    ) -> Vec<GpuUsage> {
        let Some(metrics) = &self.metrics else {
            return Vec::new();
        };
        if job.record[FieldId::Partition].as_text() != self.gpu_partition {
            return Vec::new();
        }
        let Some(window) = TimeWindow::for_job(job, now) else {
            return Vec::new();
        };

        let nodes = job.record[FieldId::NodeList].as_text();
        match collect_gpu_usage(metrics, nodes, &window).await {
            Ok(usage) => usage,
            Err(e) => {
                warn(warnings, format!("GPU utilization unavailable: {e}"));
                Vec::new()
            }
        }
    }
}

fn warn(warnings: &mut Vec<String>, message: String) {
    tracing::warn!(%message, "Optional step failed");
    warnings.push(message);
}
