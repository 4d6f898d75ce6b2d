
use jobinfo::assembler::{JobReportAssembler, Report};
use jobinfo::error::JobinfoError;
use jobinfo::fields::FieldId;
use jobinfo::gpu::GpuUsage;
use jobinfo::identity::Caller;
use jobinfo::report::table_lines;
use test_harness::{
    accounting_line, job_id, live_line, local_time, FakeMetrics, FakeSource,
};

fn assembler(source: FakeSource, caller: Caller) -> JobReportAssembler<FakeSource, FakeMetrics> {
    JobReportAssembler::new(source, caller)
}

fn line_for(report: &Report, label: &str) -> String {
    table_lines(report)
        .into_iter()
        .find(|l| l.starts_with(label))
        .unwrap_or_else(|| panic!("no {label:?} line"))
}

fn running_job(ncpus: &str) -> FakeSource {
    FakeSource {
        historical: vec![accounting_line(&[
            (FieldId::JobName, "sim"),
            (FieldId::User, "alice"),
            (FieldId::Partition, "normal"),
            (FieldId::Ncpus, ncpus),
            (FieldId::State, "RUNNING"),
            (FieldId::Start, "2024-05-01T10:00:00"),
            (FieldId::End, "Unknown"),
            (FieldId::TotalCpu, "01:00:00"),
            (FieldId::Elapsed, "00:30:00"),
        ])],
        live: vec![live_line(&[
            (FieldId::MaxRss, "2048000K"),
            (FieldId::MaxRssNode, "node01"),
        ])],
        ..FakeSource::default()
    }
}

#[tokio::test]
async fn test_running_job_owned_by_caller_gets_live_statistics() {
    let assembler = assembler(running_job("1"), Caller::new("alice", false));

    let report = assembler.assemble(&job_id("1001")).await.unwrap();

    assert!(report.warnings.is_empty());
    assert_eq!(
        line_for(&report, "Used CPU time"),
        "Used CPU time       : 01:00:00 (efficiency: 200.00%)"
    );
    assert_eq!(
        line_for(&report, "Max Mem used"),
        "Max Mem used        : 1.95G (node01)"
    );
    assert_eq!(line_for(&report, "State"), "State               : RUNNING");
    assert_eq!(line_for(&report, "End"), "End                 : --");
}

#[tokio::test]
async fn test_efficiency_accounts_for_every_core() {
    let assembler = assembler(running_job("4"), Caller::new("alice", false));

    let report = assembler.assemble(&job_id("1001")).await.unwrap();

    assert_eq!(
        line_for(&report, "Used CPU time"),
        "Used CPU time       : 01:00:00 (efficiency: 50.00%)"
    );
    assert_eq!(line_for(&report, "Cores"), "Cores               : 4");
}

#[tokio::test]
async fn test_foreign_running_job_skips_live_statistics() {
    let assembler = assembler(running_job("4"), Caller::new("bob", false));

    let report = assembler.assemble(&job_id("1001")).await.unwrap();

    assert_eq!(assembler_live_calls(&assembler), 0);
    assert_eq!(line_for(&report, "Max Mem used"), "Max Mem used        : 0.00 ");
}

#[tokio::test]
async fn test_root_reads_live_statistics_of_any_job() {
    let assembler = assembler(running_job("4"), Caller::new("root", true));

    let report = assembler.assemble(&job_id("1001")).await.unwrap();

    assert_eq!(assembler_live_calls(&assembler), 1);
    assert_eq!(
        line_for(&report, "Max Mem used"),
        "Max Mem used        : 1.95G (node01)"
    );
}

fn assembler_live_calls(assembler: &JobReportAssembler<FakeSource, FakeMetrics>) -> usize {
    assembler.source().live_calls.get()
}

#[tokio::test]
async fn test_live_failure_is_a_warning() {
    let source = FakeSource {
        fail_live: true,
        ..running_job("4")
    };
    let assembler = assembler(source, Caller::new("alice", false));

    let report = assembler.assemble(&job_id("1001")).await.unwrap();

    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("live statistics"));
    assert_eq!(line_for(&report, "Max Mem used"), "Max Mem used        : 0.00 ");
}

#[tokio::test]
async fn test_empty_live_output_keeps_accounting_values() {
    let mut source = running_job("4");
    source.live.clear();
    source.historical = vec![accounting_line(&[
        (FieldId::User, "alice"),
        (FieldId::State, "RUNNING"),
        (FieldId::MaxRss, "1G"),
        (FieldId::MaxRssNode, "node07"),
    ])];
    let assembler = assembler(source, Caller::new("alice", false));

    let report = assembler.assemble(&job_id("1001")).await.unwrap();

    assert!(report.warnings.is_empty());
    assert_eq!(
        line_for(&report, "Max Mem used"),
        "Max Mem used        : 1.00G (node07)"
    );
}

#[tokio::test]
async fn test_pending_job_shows_reason_and_dependencies() {
    let source = FakeSource {
        historical: vec![accounting_line(&[
            (FieldId::User, "alice"),
            (FieldId::State, "PENDING"),
            (FieldId::Start, "Unknown"),
        ])],
        queue: Some("afterok:123;Resources".to_string()),
        ..FakeSource::default()
    };
    let assembler = assembler(source, Caller::new("alice", false));

    let report = assembler.assemble(&job_id("1002")).await.unwrap();

    assert!(line_for(&report, "State").ends_with("Resources (afterok:123)"));
    assert_eq!(
        line_for(&report, "State"),
        "State               : PENDING Resources (afterok:123)"
    );
    assert_eq!(line_for(&report, "Start"), "Start               : --");
    assert_eq!(assembler.source().live_calls.get(), 0);
}

#[tokio::test]
async fn test_queue_failure_is_a_warning() {
    let source = FakeSource {
        historical: vec![accounting_line(&[(FieldId::State, "PENDING")])],
        fail_queue: true,
        ..FakeSource::default()
    };
    let assembler = assembler(source, Caller::new("alice", false));

    let report = assembler.assemble(&job_id("1002")).await.unwrap();

    assert_eq!(report.warnings.len(), 1);
    assert_eq!(line_for(&report, "State"), "State               : PENDING");
}

#[tokio::test]
async fn test_finished_job_does_not_query_queue() {
    let source = FakeSource::with_historical(vec![
        accounting_line(&[(FieldId::State, "CANCELLED")]),
        accounting_line(&[(FieldId::State, "COMPLETED")]),
    ]);
    let assembler = assembler(source, Caller::new("alice", false));

    let report = assembler.assemble(&job_id("1003")).await.unwrap();

    assert_eq!(line_for(&report, "State"), "State               : CANCELLED");
    assert_eq!(assembler.source().queue_calls.get(), 0);
    assert_eq!(assembler.source().live_calls.get(), 0);
}

#[tokio::test]
async fn test_unknown_job_is_fatal() {
    let assembler = assembler(FakeSource::default(), Caller::new("alice", false));

    let err = assembler.assemble(&job_id("404")).await.unwrap_err();

    assert!(matches!(err, JobinfoError::JobNotFound(ref id) if id == "404"));
}

#[tokio::test]
async fn test_accounting_failure_is_fatal() {
    let source = FakeSource {
        fail_historical: true,
        ..FakeSource::default()
    };
    let assembler = assembler(source, Caller::new("alice", false));

    let err = assembler.assemble(&job_id("1")).await.unwrap_err();

    assert!(matches!(err, JobinfoError::CommandFailed { .. }));
}

fn gpu_job(state: &str, end: &str) -> FakeSource {
    FakeSource::with_historical(vec![accounting_line(&[
        (FieldId::User, "alice"),
        (FieldId::Partition, "gpu"),
        (FieldId::NodeList, "gpu[01-02]"),
        (FieldId::State, state),
        (FieldId::Start, "2024-05-01T10:00:00"),
        (FieldId::End, end),
    ])])
}

#[tokio::test]
async fn test_gpu_job_reports_per_node_utilization() {
    let metrics = FakeMetrics::with_nodes(&[("gpu01", 50.0), ("gpu02", 75.0)]);
    let assembler = assembler(gpu_job("COMPLETED", "2024-05-01T11:00:00"), Caller::new("alice", false))
        .with_gpu_metrics(metrics);

    let report = assembler
        .assemble_at(&job_id("2001"), local_time("2024-06-01T00:00:00"))
        .await
        .unwrap();

    assert_eq!(
        report.gpu_usage,
        vec![
            GpuUsage { node: "gpu01".into(), percent: 50.0 },
            GpuUsage { node: "gpu02".into(), percent: 75.0 },
        ]
    );
    let lines = table_lines(&report);
    assert_eq!(lines[lines.len() - 2], "GPU utilization     : 50.0% (gpu01)");
    assert_eq!(lines[lines.len() - 1], "GPU utilization     : 75.0% (gpu02)");

    let queries = assembler.metrics().unwrap().queries.borrow();
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[0].1.end - queries[0].1.start, 3_600);
}

#[tokio::test]
async fn test_running_gpu_job_window_ends_now() {
    let metrics = FakeMetrics::with_nodes(&[("gpu01", 10.0), ("gpu02", 20.0)]);
    let now = local_time("2024-05-01T10:30:00");
    let assembler = assembler(gpu_job("RUNNING", "Unknown"), Caller::new("bob", false))
        .with_gpu_metrics(metrics);

    assembler.assemble_at(&job_id("2002"), now).await.unwrap();

    let queries = assembler.metrics().unwrap().queries.borrow();
    assert_eq!(queries[0].1.end, now.timestamp());
    assert_eq!(queries[0].1.end - queries[0].1.start, 1_800);
}

#[tokio::test]
async fn test_gpu_failure_is_a_warning() {
    let metrics = FakeMetrics::with_nodes(&[("gpu01", 50.0)]);
    let assembler = assembler(gpu_job("COMPLETED", "2024-05-01T11:00:00"), Caller::new("alice", false))
        .with_gpu_metrics(metrics);

    let report = assembler
        .assemble_at(&job_id("2003"), local_time("2024-06-01T00:00:00"))
        .await
        .unwrap();

    assert!(report.gpu_usage.is_empty());
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("gpu02"));
}

#[tokio::test]
async fn test_gpu_stage_skipped_outside_gpu_partition() {
    let assembler = assembler(running_job("4"), Caller::new("alice", false))
        .with_gpu_metrics(FakeMetrics::default());

    let report = assembler.assemble(&job_id("1001")).await.unwrap();

    assert!(report.gpu_usage.is_empty());
    assert!(report.warnings.is_empty());
    assert!(assembler.metrics().unwrap().queries.borrow().is_empty());
}

#[tokio::test]
async fn test_gpu_stage_skipped_without_start_time() {
    let source = FakeSource::with_historical(vec![accounting_line(&[
        (FieldId::Partition, "gpu"),
        (FieldId::NodeList, "None assigned"),
        (FieldId::State, "PENDING"),
        (FieldId::Start, "Unknown"),
    ])]);
    let assembler = assembler(source, Caller::new("alice", false))
        .with_gpu_metrics(FakeMetrics::default());

    let report = assembler.assemble(&job_id("2004")).await.unwrap();

    assert!(report.gpu_usage.is_empty());
    assert!(report.warnings.is_empty());
}

#[tokio::test]
async fn test_custom_gpu_partition() {
    let metrics = FakeMetrics::with_nodes(&[("gpu01", 1.0), ("gpu02", 2.0)]);
    let assembler = assembler(gpu_job("COMPLETED", "2024-05-01T11:00:00"), Caller::new("alice", false))
        .with_gpu_metrics(metrics)
        .with_gpu_partition("a100");

    let report = assembler
        .assemble_at(&job_id("2005"), local_time("2024-06-01T00:00:00"))
        .await
        .unwrap();

    assert!(report.gpu_usage.is_empty());
}
