use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use serde_json::Value;
use tracing::debug;

use crate::gates::{gate_metrics, overall_pass};
use crate::metrics::compute_metrics;
use crate::models::{EvalRecord, EvalReport, EvalThresholds};
use crate::utils::time::now_utc_rfc3339;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifactLayout {
    pub report_json: PathBuf,
}

#[must_use]
pub fn build_artifact_layout(out_dir: &Path) -> ReportArtifactLayout {
    ReportArtifactLayout {
        report_json: out_dir.join("offline_eval_report.json"),
    }
}

pub fn load_eval_records(path: &Path) -> Result<Vec<EvalRecord>> {
    if !path.exists() {
        bail!("input file not found: {}", path.display());
    }

    let input = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read input file: {}", path.display()))?;
    let records = parse_eval_records(&input, path)?;
    debug!(path = %path.display(), records = records.len(), "loaded eval records");
    Ok(records)
}

/// Parses JSONL text into records. The first malformed line aborts the whole
/// batch; `source` only labels error messages.
pub fn parse_eval_records(input: &str, source: &Path) -> Result<Vec<EvalRecord>> {
    let mut records = Vec::new();

    for (index, line) in input.lines().enumerate() {
        let line_number = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let value = serde_json::from_str::<Value>(trimmed).map_err(|error| {
            anyhow!(
                "invalid JSONL at line {line_number} in {}: {error}",
                source.display()
            )
        })?;
        let Value::Object(payload) = value else {
            bail!(
                "each JSONL line must be an object (line {line_number} in {})",
                source.display()
            );
        };
        records.push(EvalRecord::from_payload(&payload));
    }

    Ok(records)
}

/// Builds a report stamped with an explicit timestamp.
#[must_use]
pub fn build_eval_report_at(
    records: &[EvalRecord],
    thresholds: &EvalThresholds,
    generated_at: impl Into<String>,
) -> EvalReport {
    let metrics = compute_metrics(records);
    let gates = gate_metrics(&metrics, thresholds);
    let overall_pass = overall_pass(&gates);

    EvalReport {
        generated_at: generated_at.into(),
        record_count: records.len(),
        metrics,
        thresholds: *thresholds,
        gates,
        overall_pass,
    }
}

pub fn build_eval_report(
    records: &[EvalRecord],
    thresholds: &EvalThresholds,
) -> Result<EvalReport> {
    let generated_at = now_utc_rfc3339()?;
    Ok(build_eval_report_at(records, thresholds, generated_at))
}

pub fn write_report_artifact(path: &Path, report: &EvalReport) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("failed to create report artifact directory: {}", parent.display())
        })?;
    }

    let mut encoded =
        serde_json::to_vec_pretty(report).context("failed to encode eval report json")?;
    encoded.push(b'\n');
    std::fs::write(path, encoded)
        .with_context(|| format!("failed to write eval report artifact: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{build_eval_report_at, parse_eval_records};
    use crate::models::{EvalRecord, EvalThresholds};

    #[test]
    fn skips_blank_lines_and_keeps_order() {
        let input = "{\"record_id\":\"a\"}\n\n   \n{\"record_id\":\"b\"}\n";
        let records = parse_eval_records(input, Path::new("batch.jsonl")).expect("valid jsonl");

        let ids = records
            .iter()
            .map(|record| record.record_id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn invalid_json_names_line_and_source() {
        let input = "{\"record_id\":\"a\"}\n{not json}\n";
        let error = parse_eval_records(input, Path::new("batch.jsonl"))
            .expect_err("malformed line must fail");

        let message = error.to_string();
        assert!(message.contains("line 2"), "{message}");
        assert!(message.contains("batch.jsonl"), "{message}");
    }

    #[test]
    fn non_object_line_is_rejected() {
        let error = parse_eval_records("[1, 2]\n", Path::new("batch.jsonl"))
            .expect_err("array line must fail");

        assert!(
            error.to_string().contains("must be an object (line 1"),
            "unexpected error: {error}"
        );
    }

    #[test]
    fn overall_pass_is_conjunction_of_gates() {
        let records = vec![
            EvalRecord {
                schema_valid: true,
                latency_ms: Some(100),
                ..EvalRecord::default()
            },
            EvalRecord {
                patch_apply_success: true,
                fallback_used: true,
                ..EvalRecord::default()
            },
        ];
        let threshold_sets = [
            EvalThresholds::default(),
            EvalThresholds {
                schema_valid_rate: 0.5,
                patch_apply_success: 0.5,
                edit_after_generate_rate: 0.0,
                publish_conversion_proxy: 0.0,
                safety_html_tailwind_compliance: 0.0,
                fallback_rate_max: 0.5,
                p95_latency_ms_max: 100,
            },
        ];

        for thresholds in threshold_sets {
            let report = build_eval_report_at(&records, &thresholds, "2026-01-01T00:00:00Z");
            assert_eq!(
                report.overall_pass,
                report.gates.values().all(|passed| *passed)
            );
        }
    }

    #[test]
    fn empty_batch_reports_zero_rates_and_null_latency() {
        let report = build_eval_report_at(&[], &EvalThresholds::default(), "2026-01-01T00:00:00Z");

        assert_eq!(report.record_count, 0);
        assert_eq!(report.metrics.quality.schema_valid_rate, 0.0);
        assert_eq!(report.metrics.operational.p95_latency_ms, None);
        assert_eq!(report.gates.get("p95_latency_ms_max"), Some(&true));
        assert!(!report.overall_pass);
    }
}
