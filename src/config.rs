use std::path::PathBuf;
use std::time::Duration;

/// Programs used to query the Slurm accounting store, the per-process
/// statistics of running jobs and the scheduling queue.
#[derive(Debug, Clone)]
pub struct SlurmConfig {
    pub sacct: PathBuf,
    pub sstat: PathBuf,
    pub squeue: PathBuf,
}

impl Default for SlurmConfig {
    fn default() -> Self {
        Self {
            sacct: PathBuf::from("sacct"),
            sstat: PathBuf::from("sstat"),
            squeue: PathBuf::from("squeue"),
        }
    }
}

/// Configuration for the optional GPU utilization lookup.
///
/// The lookup only runs for jobs in `gpu_partition` and only when a
/// metrics endpoint is configured.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Base URL of a Prometheus-compatible server, e.g. `http://prometheus:9090`.
    pub prometheus_url: Option<String>,
    /// Query template; `{node}` is replaced by the node name.
    pub query: String,
    /// Resolution of the range query.
    pub step: Duration,
    /// Upper bound for a single HTTP request.
    pub timeout: Duration,
    /// Partition name that marks a job as a GPU job.
    pub gpu_partition: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            prometheus_url: None,
            query: r#"avg(nvidia_gpu_duty_cycle{instance=~"{node}(:.*)?"})"#.to_string(),
            step: Duration::from_secs(60),
            timeout: Duration::from_secs(10),
            gpu_partition: "gpu".to_string(),
        }
    }
}

impl MetricsConfig {
    /// The GPU stage is only attempted when an endpoint is known.
    pub fn is_enabled(&self) -> bool {
        self.prometheus_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }

    /// Render the query for a single node.
    pub fn query_for(&self, node: &str) -> String {
        self.query.replace("{node}", node)
    }
}

#[derive(Debug, Clone, Default)]
pub struct JobinfoConfig {
    pub slurm: SlurmConfig,
    pub metrics: MetricsConfig,
}

impl JobinfoConfig {
    pub fn with_prometheus_url(mut self, url: impl Into<String>) -> Self {
        self.metrics.prometheus_url = Some(url.into());
        self
    }

    pub fn with_gpu_partition(mut self, partition: impl Into<String>) -> Self {
        self.metrics.gpu_partition = partition.into();
        self
    }

    pub fn with_metrics_timeout(mut self, timeout: Duration) -> Self {
        self.metrics.timeout = timeout;
        self
    }
}
