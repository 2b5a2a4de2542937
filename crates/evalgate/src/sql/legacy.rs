//! `eval_runs` / `eval_samples` layout. Samples keep provider, strategy and
//! fallback in dedicated columns and `request_id` as a nullable uuid.

use anyhow::Result;
use serde_json::{Map, Value, json};

use super::literal::{sql_bool, sql_int, sql_jsonb, sql_text, sql_uuid};
use super::script::{
    RunRow, RunStatus, UTC_NOW_SQL, UuidField, checked_uuid, fold_secondary_ids, gates_json,
    insert_statement, metrics_json, thresholds_json,
};
use crate::models::{EvalRecord, RunType};

pub const RUNS_TABLE: &str = "public.eval_runs";
pub const SAMPLES_TABLE: &str = "public.eval_samples";

pub const RUN_COLUMNS: &[&str] = &[
    "run_id",
    "run_type",
    "triggered_by",
    "commit_sha",
    "dataset_ref",
    "thresholds",
    "status",
    "started_at",
    "finished_at",
    "metadata",
];

pub const SAMPLE_COLUMNS: &[&str] = &[
    "run_id",
    "request_id",
    "requested_provider",
    "selected_provider",
    "route_strategy",
    "fallback_used",
    "latency_ms",
    "schema_valid",
    "patch_apply_success",
    "edited_after_generate",
    "published_within_7d",
    "safety_html_tailwind_compliant",
    "metadata",
];

/// The legacy table's run type enumeration. `canary` and `offline` share
/// their names with the CLI values.
#[must_use]
pub const fn run_type_key(run_type: RunType) -> &'static str {
    match run_type {
        RunType::Offline => "offline",
        RunType::Shadow => "online_shadow",
        RunType::Canary => "canary",
    }
}

#[must_use]
pub const fn run_status(overall_pass: bool) -> RunStatus {
    if overall_pass {
        RunStatus::Completed
    } else {
        RunStatus::Failed
    }
}

pub fn run_insert(run: &RunRow<'_>) -> Result<String> {
    let metadata = json!({
        "source": run.context.source,
        "recordCount": run.record_count,
        "metrics": metrics_json(run.report)?,
        "gates": gates_json(run.report)?,
    });

    let values = [
        sql_uuid(Some(run.run_id)),
        sql_text(Some(run_type_key(run.context.run_type))),
        sql_text(run.context.triggered_by.as_deref()),
        sql_text(run.context.commit_sha.as_deref()),
        sql_text(run.context.dataset_ref.as_deref()),
        sql_jsonb(&thresholds_json(run.thresholds)?),
        sql_text(Some(run_status(run.report.overall_pass).as_str())),
        UTC_NOW_SQL.to_string(),
        UTC_NOW_SQL.to_string(),
        sql_jsonb(&metadata),
    ];
    Ok(insert_statement(RUNS_TABLE, RUN_COLUMNS, &values))
}

#[must_use]
pub fn sample_insert(run_id: &str, record: &EvalRecord) -> String {
    let mut metadata = Map::new();
    metadata.insert("recordId".to_string(), json!(record.record_id));
    let request_id = checked_uuid(record, UuidField::Request, &mut metadata);
    fold_secondary_ids(record, &mut metadata);

    let values = [
        sql_uuid(Some(run_id)),
        sql_uuid(request_id.as_deref()),
        sql_text(record.requested_provider.as_deref()),
        sql_text(record.selected_provider.as_deref()),
        sql_text(record.route_strategy.as_deref()),
        sql_bool(record.fallback_used).to_string(),
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
