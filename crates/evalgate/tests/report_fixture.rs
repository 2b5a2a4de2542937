use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use evalgate::models::{EvalReport, EvalThresholds};
use evalgate::report::{build_eval_report_at, load_eval_records, write_report_artifact};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("{prefix}-{nanos}"))
}

fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/eval_records_sample.jsonl")
}

#[test]
fn fixture_metrics_match_expected_rates() {
    let records = load_eval_records(&fixture_path()).expect("fixture should load");
    let report = build_eval_report_at(
        &records,
        &EvalThresholds::default(),
        "2026-02-25T00:00:00Z",
    );

    assert_eq!(report.record_count, 5);
    let quality = report.metrics.quality;
    assert_eq!(quality.schema_valid_rate, 0.8);
    assert_eq!(quality.patch_apply_success, 0.6);
    assert_eq!(quality.edit_after_generate_rate, 0.4);
    assert_eq!(quality.publish_conversion_proxy, 0.2);
    assert_eq!(quality.safety_html_tailwind_compliance, 1.0);
    assert_eq!(report.metrics.operational.fallback_rate, 0.2);
    assert_eq!(report.metrics.operational.p95_latency_ms, Some(3000));
}

#[test]
fn fixture_fails_the_default_gates() {
    let records = load_eval_records(&fixture_path()).expect("fixture should load");
    let report = build_eval_report_at(
        &records,
        &EvalThresholds::default(),
        "2026-02-25T00:00:00Z",
    );

    let failed = report
        .gates
        .iter()
        .filter(|(_, passed)| !**passed)
        .map(|(key, _)| key.as_str())
        .collect::<Vec<_>>();
    assert_eq!(failed, vec!["patch_apply_success", "schema_valid_rate"]);
    assert_eq!(report.gates.len(), 7);
    assert!(!report.overall_pass);
}

#[test]
fn record_id_falls_back_to_id_field() {
    let records = load_eval_records(&fixture_path()).expect("fixture should load");

    let ids = records
        .iter()
        .map(|record| record.record_id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec!["rec-1", "rec-2", "rec-3", "rec-4", "rec-5"]);
    assert_eq!(records[4].latency_ms, Some(3000));
}

#[test]
fn relaxed_thresholds_pass_the_fixture() {
    let records = load_eval_records(&fixture_path()).expect("fixture should load");
    let thresholds = EvalThresholds {
        schema_valid_rate: 0.8,
        patch_apply_success: 0.6,
        ..EvalThresholds::default()
    };
    let report = build_eval_report_at(&records, &thresholds, "2026-02-25T00:00:00Z");

    assert!(report.gates.values().all(|passed| *passed));
    assert!(report.overall_pass);
}

#[test]
fn written_report_round_trips_through_the_artifact() {
    let temp = unique_temp_dir("evalgate-report-artifact");
    let path = temp.join("nested").join("offline_eval_report.json");
    let records = load_eval_records(&fixture_path()).expect("fixture should load");
    let report = build_eval_report_at(
        &records,
        &EvalThresholds::default(),
        "2026-02-25T00:00:00Z",
    );

    write_report_artifact(&path, &report).expect("report should be writable");

    let raw = std::fs::read_to_string(&path).expect("report should be readable");
    assert!(raw.ends_with("}\n"));
    let decoded: EvalReport = serde_json::from_str(&raw).expect("report should decode");
    assert_eq!(decoded, report);

    let value: serde_json::Value = serde_json::from_str(&raw).expect("report should be json");
    assert!(value["metrics"]["fallback_rate"].is_number());
    assert_eq!(value["thresholds"]["p95_latency_ms_max"], 45000);
}

#[test]
fn invalid_jsonl_line_reports_line_number() {
    let temp = unique_temp_dir("evalgate-report-invalid");
    std::fs::create_dir_all(&temp).expect("temp dir should be creatable");
    let path = temp.join("broken.jsonl");
    std::fs::write(&path, "{\"record_id\":\"ok\"}\n\n{not json}\n")
        .expect("input should be writable");

    let error = load_eval_records(&path).expect_err("broken line should fail");
    assert!(error.to_string().contains("invalid JSONL at line 3"));
}
