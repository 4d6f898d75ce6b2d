//! Report rendering: the two-column text table and its JSON counterpart.

use serde::Serialize;

use crate::assembler::Report;
use crate::error::Result;
use crate::gpu::GpuUsage;
use crate::slurm::JobId;

pub const LABEL_WIDTH: usize = 20;
pub const GPU_LABEL: &str = "GPU utilization";

/// One `label: value` line per visible field, then one line per GPU node.
pub fn table_lines(report: &Report) -> Vec<String> {
    let mut lines: Vec<String> = report
        .job
        .visible_fields()
        .into_iter()
        .map(|(def, value)| format!("{:<LABEL_WIDTH$}: {}", def.description, value))
        .collect();

    lines.extend(report.gpu_usage.iter().map(|usage| {
        format!(
            "{:<LABEL_WIDTH$}: {:.1}% ({})",
            GPU_LABEL, usage.percent, usage.node
        )
    }));
    lines
}

pub fn render_table(report: &Report) -> String {
    let mut out = table_lines(report).join("\n");
    out.push('\n');
    out
}

#[derive(Serialize)]
struct FieldOutput {
    field: &'static str,
    description: &'static str,
    value: String,
}

#[derive(Serialize)]
struct ReportOutput<'a> {
    job_id: &'a JobId,
    fields: Vec<FieldOutput>,
    gpu_usage: &'a [GpuUsage],
    warnings: &'a [String],
}

pub fn render_json(report: &Report) -> Result<String> {
    let output = ReportOutput {
        job_id: &report.job.id,
        fields: report
            .job
            .visible_fields()
            .into_iter()
            .map(|(def, value)| FieldOutput {
                field: def.name,
                description: def.description,
                value,
            })
            .collect(),
        gpu_usage: &report.gpu_usage,
        warnings: &report.warnings,
    };
    Ok(serde_json::to_string_pretty(&output)?)
}
