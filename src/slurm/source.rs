use std::path::Path;
use std::process::{Output, Stdio};

use tokio::process::Command;

use crate::config::SlurmConfig;
use crate::error::{JobinfoError, Result};
use crate::fields::{format_arg, FIELDS, LIVE_FIELDS};
use crate::slurm::JobId;

/// Where raw job data comes from. Every method returns pipe-delimited
/// lines, one per record, with columns in registry order.
#[allow(async_fn_in_trait)]
pub trait JobSource {
    /// Accounting records of the job and its steps, one value per registered field.
    async fn historical(&self, job: &JobId) -> Result<Vec<String>>;

    /// Per-process statistics of a running job and its batch step, one
    /// value per prefer-live field.
    async fn live(&self, job: &JobId) -> Result<Vec<String>>;

    /// A single `dependencies;reason` line from the scheduling queue.
    async fn queue(&self, job: &JobId) -> Result<Option<String>>;
}

/// [`JobSource`] backed by the `sacct`, `sstat` and `squeue` commands.
#[derive(Debug, Clone)]
pub struct SlurmCommands {
    config: SlurmConfig,
}

impl SlurmCommands {
    pub fn new(config: SlurmConfig) -> Self {
        Self { config }
    }

    pub fn sacct_args(job: &JobId) -> Vec<String> {
        vec![
            "--noheader".to_string(),
            "--parsable2".to_string(),
            format!("--format={}", format_arg(FIELDS.iter())),
            format!("--jobs={job}"),
        ]
    }

    pub fn sstat_args(job: &JobId) -> Vec<String> {
        vec![
            "--noheader".to_string(),
            "--parsable2".to_string(),
            "--allsteps".to_string(),
            format!(
                "--format={}",
                format_arg(LIVE_FIELDS.iter().map(|id| id.def()))
            ),
            format!("--jobs={job},{}", job.batch_step()),
        ]
    }

    pub fn squeue_args(job: &JobId) -> Vec<String> {
        vec![
            "--noheader".to_string(),
            format!("--jobs={job}"),
            "--format=%E;%r".to_string(),
        ]
    }

    async fn run(&self, program: &Path, args: &[String]) -> Result<Vec<String>> {
        tracing::debug!(program = %program.display(), ?args, "Running command");

        let result = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        Self::process_output(program, result)
    }

    fn process_output(program: &Path, result: std::io::Result<Output>) -> Result<Vec<String>> {
        let program = program.display().to_string();
        match result {
            Ok(output) if output.status.success() => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                let lines: Vec<String> = stdout
                    .lines()
                    .filter(|l| !l.trim().is_empty())
                    .map(str::to_string)
                    .collect();
                tracing::debug!(program = %program, lines = lines.len(), "Command finished");
                Ok(lines)
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                let message = if stderr.is_empty() {
                    format!("exit code: {:?}", output.status.code())
                } else {
                    stderr
                };
                Err(JobinfoError::CommandFailed { program, message })
            }
            Err(e) => Err(JobinfoError::CommandFailed {
                program,
                message: e.to_string(),
            }),
        }
    }
}

impl JobSource for SlurmCommands {
    async fn historical(&self, job: &JobId) -> Result<Vec<String>> {
        self.run(&self.config.sacct, &Self::sacct_args(job)).await
    }

    async fn live(&self, job: &JobId) -> Result<Vec<String>> {
        self.run(&self.config.sstat, &Self::sstat_args(job)).await
    }

    async fn queue(&self, job: &JobId) -> Result<Option<String>> {
        let lines = self.run(&self.config.squeue, &Self::squeue_args(job)).await?;
        Ok(lines.into_iter().next())
    }
}
