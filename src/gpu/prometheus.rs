use std::time::Duration;

use serde::Deserialize;

use crate::config::MetricsConfig;
use crate::error::{JobinfoError, Result};
use crate::gpu::{GpuMetrics, TimeWindow};

/// Body of a Prometheus `query_range` response.
#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    pub status: String,
    #[serde(default)]
    pub data: Option<QueryData>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QueryData {
    #[serde(default)]
    pub result: Vec<Series>,
}

#[derive(Debug, Deserialize)]
pub struct Series {
    /// `[unix_time, "value"]` pairs.
    #[serde(default)]
    pub values: Vec<(f64, String)>,
}

/// Mean over every sample of every returned series.
pub fn mean_utilization(node: &str, response: QueryResponse) -> Result<f64> {
    if response.status != "success" {
        let reason = response.error.unwrap_or(response.status);
        return Err(JobinfoError::Metrics(format!("query for {node} failed: {reason}")));
    }

    let samples: Vec<f64> = response
        .data
        .map(|d| d.result)
        .unwrap_or_default()
        .into_iter()
        .flat_map(|series| series.values)
        .filter_map(|(_, value)| value.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .collect();

    if samples.is_empty() {
        return Err(JobinfoError::Metrics(format!("no GPU samples for {node}")));
    }
    Ok(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// [`GpuMetrics`] backed by the Prometheus HTTP API.
#[derive(Debug, Clone)]
pub struct PrometheusClient {
    http: reqwest::Client,
    base_url: String,
    config: MetricsConfig,
}

impl PrometheusClient {
    pub fn new(config: MetricsConfig) -> Result<Self> {
        let base_url = config
            .prometheus_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| JobinfoError::Config("no Prometheus URL configured".to_string()))?
            .trim_end_matches('/')
            .to_string();

        let http = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            http,
            base_url,
            config,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/v1/query_range", self.base_url)
    }

    fn step(&self) -> String {
        let step = self.config.step.max(Duration::from_secs(1));
        format!("{}s", step.as_secs())
    }
}

impl GpuMetrics for PrometheusClient {
    async fn average_utilization(&self, node: &str, window: &TimeWindow) -> Result<f64> {
        let query = self.config.query_for(node);
        tracing::debug!(
            node,
            query = %query,
            start = window.start,
            end = window.end,
            "Querying GPU utilization"
        );

        let response: QueryResponse = self
            .http
            .get(self.endpoint())
            .query(&[
                ("query", query),
                ("start", window.start.to_string()),
                ("end", window.end.to_string()),
                ("step", self.step()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        mean_utilization(node, response)
    }
}
