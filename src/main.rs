use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use jobinfo::assembler::JobReportAssembler;
use jobinfo::config::{JobinfoConfig, SlurmConfig};
use jobinfo::error::{JobinfoError, Result};
use jobinfo::gpu::PrometheusClient;
use jobinfo::identity::Caller;
use jobinfo::report::{render_json, render_table};
use jobinfo::slurm::{JobId, SlurmCommands};

#[derive(Parser, Debug)]
#[command(name = "jobinfo")]
#[command(version)]
#[command(about = "Collect accounting, live and queue information about a Slurm job")]
struct Args {
    /// The job id (`<jobid>` or `<jobid>_<taskid>` for array tasks)
    #[arg(value_parser = parse_job_id)]
    job_id: JobId,

    /// Output format
    #[arg(long, short = 'o', default_value = "table")]
    output: OutputFormat,

    /// Log debug information to stderr
    #[arg(long, short = 'v')]
    verbose: bool,

    // === Slurm commands ===
    /// Path to sacct
    #[arg(long, env = "JOBINFO_SACCT", default_value = "sacct")]
    sacct: PathBuf,

    /// Path to sstat
    #[arg(long, env = "JOBINFO_SSTAT", default_value = "sstat")]
    sstat: PathBuf,

    /// Path to squeue
    #[arg(long, env = "JOBINFO_SQUEUE", default_value = "squeue")]
    squeue: PathBuf,

    // === GPU utilization ===
    /// Prometheus server queried for GPU utilization of GPU jobs
    #[arg(long, env = "JOBINFO_PROMETHEUS_URL")]
    prometheus_url: Option<String>,

    /// Partition whose jobs are GPU jobs
    #[arg(long, env = "JOBINFO_GPU_PARTITION", default_value = "gpu")]
    gpu_partition: String,

    /// Timeout for a single metrics request, in seconds
    #[arg(long, env = "JOBINFO_METRICS_TIMEOUT", default_value = "10")]
    metrics_timeout: u64,

    /// Skip the GPU utilization lookup
    #[arg(long)]
    no_gpu: bool,
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn parse_job_id(raw: &str) -> std::result::Result<JobId, String> {
    raw.parse().map_err(|e: JobinfoError| e.to_string())
}

impl Args {
    fn config(&self) -> JobinfoConfig {
        let config = JobinfoConfig {
            slurm: SlurmConfig {
                sacct: self.sacct.clone(),
                sstat: self.sstat.clone(),
                squeue: self.squeue.clone(),
            },
            ..JobinfoConfig::default()
        }
        .with_gpu_partition(self.gpu_partition.clone())
        .with_metrics_timeout(Duration::from_secs(self.metrics_timeout));

        match &self.prometheus_url {
            Some(url) => config.with_prometheus_url(url.clone()),
            None => config,
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: Args) -> Result<()> {
    let config = args.config();
    let caller = Caller::current();
    tracing::debug!(user = %caller.user, privileged = caller.privileged, job_id = %args.job_id, "Starting jobinfo");

    let mut assembler: JobReportAssembler<SlurmCommands, PrometheusClient> =
        JobReportAssembler::new(SlurmCommands::new(config.slurm.clone()), caller)
            .with_gpu_partition(config.metrics.gpu_partition.clone());

    if !args.no_gpu && config.metrics.is_enabled() {
        match PrometheusClient::new(config.metrics.clone()) {
            Ok(client) => assembler = assembler.with_gpu_metrics(client),
            Err(e) => eprintln!("Warning: GPU utilization unavailable: {e}"),
        }
    }

    let report = assembler.assemble(&args.job_id).await?;

    match args.output {
        OutputFormat::Table => print!("{}", render_table(&report)),
        OutputFormat::Json => println!("{}", render_json(&report)?),
    }
    for warning in &report.warnings {
        eprintln!("Warning: {warning}");
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
