//! `ai_eval_runs` / `ai_eval_samples` layout. The samples table has no
//! provider or request columns, so those are folded into `metadata` and each
//! row is keyed by `sample_key`.

use anyhow::Result;
use serde_json::{Map, Value, json};

use super::literal::{sql_bool, sql_int, sql_jsonb, sql_text, sql_uuid};
use super::script::{
    RunRow, RunStatus, UTC_NOW_SQL, UuidField, checked_uuid, fold_secondary_ids, gates_json,
    insert_statement, metrics_json, thresholds_json,
};
use crate::models::EvalRecord;

pub const RUNS_TABLE: &str = "public.ai_eval_runs";
pub const SAMPLES_TABLE: &str = "public.ai_eval_samples";

pub const RUN_COLUMNS: &[&str] = &[
    "id",
    "run_type",
    "status",
    "dataset_ref",
    "commit_sha",
    "metrics",
    "thresholds",
    "metadata",
    "started_at",
    "completed_at",
];

pub const SAMPLE_COLUMNS: &[&str] = &[
    "run_id",
    "sample_key",
    "latency_ms",
    "schema_valid",
    "patch_apply_success",
    "edited_after_generate",
    "published_within_7d",
    "safety_html_tailwind_compliant",
    "metadata",
];

#[must_use]
pub const fn run_status(overall_pass: bool) -> RunStatus {
    if overall_pass {
        RunStatus::Passed
    } else {
        RunStatus::Failed
    }
}

#[must_use]
pub fn sample_key(record: &EvalRecord, ordinal: usize) -> String {
    format!("{}:{ordinal}", record.record_id)
}

pub fn run_insert(run: &RunRow<'_>) -> Result<String> {
    let metadata = json!({
        "source": run.context.source,
        "triggeredBy": run.context.triggered_by,
        "recordCount": run.record_count,
        "gates": gates_json(run.report)?,
        "overallPass": run.report.overall_pass,
    });

    let values = [
        sql_uuid(Some(run.run_id)),
        sql_text(Some(run.context.run_type.as_str())),
        sql_text(Some(run_status(run.report.overall_pass).as_str())),
        sql_text(run.context.dataset_ref.as_deref()),
        sql_text(run.context.commit_sha.as_deref()),
        sql_jsonb(&metrics_json(run.report)?),
        sql_jsonb(&thresholds_json(run.thresholds)?),
        sql_jsonb(&metadata),
        UTC_NOW_SQL.to_string(),
        UTC_NOW_SQL.to_string(),
    ];
    Ok(insert_statement(RUNS_TABLE, RUN_COLUMNS, &values))
}

/// `ordinal` is the record's 1-based position in the batch.
#[must_use]
pub fn sample_insert(run_id: &str, ordinal: usize, record: &EvalRecord) -> String {
    let mut metadata = Map::new();
    metadata.insert("recordId".to_string(), json!(record.record_id));
    metadata.insert("fallbackUsed".to_string(), json!(record.fallback_used));
    for (key, value) in [
        ("requestedProvider", &record.requested_provider),
        ("selectedProvider", &record.selected_provider),
        ("routeStrategy", &record.route_strategy),
    ] {
        if let Some(value) = value {
            metadata.insert(key.to_string(), json!(value));
        }
    }
    if let Some(request_id) = checked_uuid(record, UuidField::Request, &mut metadata) {
        metadata.insert(UuidField::Request.metadata_key().to_string(), json!(request_id));
    }
    fold_secondary_ids(record, &mut metadata);

    let values = [
        sql_uuid(Some(run_id)),
        sql_text(Some(&sample_key(record, ordinal))),
        sql_int(record.latency_ms),
        sql_bool(record.schema_valid).to_string(),
        sql_bool(record.patch_apply_success).to_string(),
        sql_bool(record.edited_after_generate).to_string(),
        sql_bool(record.published_within_7d).to_string(),
        sql_bool(record.safety_html_tailwind_compliant).to_string(),
        sql_jsonb(&Value::Object(metadata)),
    ];
    insert_statement(SAMPLES_TABLE, SAMPLE_COLUMNS, &values)
}
