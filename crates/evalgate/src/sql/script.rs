use std::fmt::{Display, Formatter};

use anyhow::{Context, Result};
use serde_json::{Map, Value, json};
use tracing::{debug, warn};
use uuid::Uuid;

use super::literal::check_uuid;
use super::{alt, legacy};
use crate::models::{
    EvalIngestContext, EvalRecord, EvalReport, EvalThresholds, IngestConfigError, SchemaVariant,
};
use crate::report::build_eval_report;

pub const UTC_NOW_SQL: &str = "timezone('utc', now())";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Passed,
    Completed,
    Failed,
}

impl RunStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl Display for RunStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestScript {
    pub sql: String,
    pub run_id: String,
    pub status: RunStatus,
}

/// Everything a schema variant needs to render the run row.
#[derive(Debug, Clone, Copy)]
pub struct RunRow<'a> {
    pub run_id: &'a str,
    pub context: &'a EvalIngestContext,
    pub thresholds: &'a EvalThresholds,
    pub report: &'a EvalReport,
    pub record_count: usize,
}

/// Identifier fields that should hold UUIDs. Invalid values are kept in the
/// sample metadata under `invalid*` keys instead of failing the script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UuidField {
    Request,
    Tenant,
    Route,
    Model,
    ModelVersion,
}

impl UuidField {
    pub const SECONDARY: [Self; 4] = [Self::Tenant, Self::Route, Self::Model, Self::ModelVersion];

    #[must_use]
    pub const fn metadata_key(self) -> &'static str {
        match self {
            Self::Request => "requestId",
            Self::Tenant => "tenantId",
            Self::Route => "routeId",
            Self::Model => "modelId",
            Self::ModelVersion => "modelVersionId",
        }
    }

    #[must_use]
    pub const fn invalid_metadata_key(self) -> &'static str {
        match self {
            Self::Request => "invalidRequestId",
            Self::Tenant => "invalidTenantId",
            Self::Route => "invalidRouteId",
            Self::Model => "invalidModelId",
            Self::ModelVersion => "invalidModelVersionId",
        }
    }

    fn raw(self, record: &EvalRecord) -> Option<&str> {
        match self {
            Self::Request => record.request_id.as_deref(),
            Self::Tenant => record.tenant_id.as_deref(),
            Self::Route => record.route_id.as_deref(),
            Self::Model => record.model_id.as_deref(),
            Self::ModelVersion => record.model_version_id.as_deref(),
        }
    }
}

/// Validates one identifier field. Returns the canonical UUID; an invalid
/// raw value is written to `metadata` under the field's `invalid*` key.
pub fn checked_uuid(
    record: &EvalRecord,
    field: UuidField,
    metadata: &mut Map<String, Value>,
) -> Option<String> {
    let check = check_uuid(field.raw(record));
    if let Some(invalid) = check.invalid {
        warn!(
            record_id = %record.record_id,
            field = field.metadata_key(),
            "invalid uuid moved to sample metadata"
        );
        metadata.insert(field.invalid_metadata_key().to_string(), json!(invalid));
    }
    check.value
}

/// Folds tenant/route/model identifiers into the sample metadata.
pub fn fold_secondary_ids(record: &EvalRecord, metadata: &mut Map<String, Value>) {
    for field in UuidField::SECONDARY {
        if let Some(valid) = checked_uuid(record, field, metadata) {
            metadata.insert(field.metadata_key().to_string(), json!(valid));
        }
    }
}

#[must_use]
pub fn insert_statement(table: &str, columns: &[&str], values: &[String]) -> String {
    debug_assert_eq!(columns.len(), values.len(), "{table} column/value mismatch");
    format!(
        "INSERT INTO {table} ({}) VALUES ({});",
        columns.join(", "),
        values.join(", ")
    )
}

pub fn resolve_run_id(run_id: Option<&str>) -> Result<String, IngestConfigError> {
    match run_id {
        Some(raw) => Uuid::try_parse(raw)
            .map(|parsed| parsed.hyphenated().to_string())
            .map_err(|_| IngestConfigError::InvalidRunId(raw.to_string())),
        None => Ok(Uuid::new_v4().hyphenated().to_string()),
    }
}

/// Renders the transactional ingest script for one eval run.
///
/// The run row comes first, then one sample row per record in input order.
/// Configuration errors surface as [`IngestConfigError`] before any SQL is
/// rendered. When `report` is `None` it is computed from `records`.
pub fn build_eval_ingest_sql(
    records: &[EvalRecord],
    thresholds: &EvalThresholds,
    context: &EvalIngestContext,
    report: Option<&EvalReport>,
    run_id: Option<&str>,
) -> Result<IngestScript> {
    let run_id = resolve_run_id(run_id)?;
    let computed;
    let report = match report {
        Some(report) => report,
        None => {
            computed = build_eval_report(records, thresholds)?;
            &computed
        }
    };

    let run = RunRow {
        run_id: &run_id,
        context,
        thresholds,
        report,
        record_count: records.len(),
    };
    let (status, run_insert) = match context.schema_variant {
        SchemaVariant::Legacy => (
            legacy::run_status(report.overall_pass),
            legacy::run_insert(&run)?,
        ),
        SchemaVariant::Alt => (
            alt::run_status(report.overall_pass),
            alt::run_insert(&run)?,
        ),
    };

    let mut lines = Vec::with_capacity(records.len() + 4);
    lines.push("BEGIN;".to_string());
    lines.push(run_insert);
    for (index, record) in records.iter().enumerate() {
        let ordinal = index + 1;
        let sample_insert = match context.schema_variant {
            SchemaVariant::Legacy => legacy::sample_insert(&run_id, record),
            SchemaVariant::Alt => alt::sample_insert(&run_id, ordinal, record),
        };
        lines.push(sample_insert);
    }
    lines.push("COMMIT;".to_string());
    lines.push(String::new());

    debug!(
        run_id = %run_id,
        schema_variant = %context.schema_variant,
        samples = records.len(),
        status = %status,
        "rendered eval ingest sql"
    );

    Ok(IngestScript {
        sql: lines.join("\n"),
        run_id,
        status,
    })
}

pub fn metrics_json(report: &EvalReport) -> Result<Value> {
    serde_json::to_value(report.metrics).context("failed to encode eval metrics json")
}

pub fn gates_json(report: &EvalReport) -> Result<Value> {
    serde_json::to_value(&report.gates).context("failed to encode eval gates json")
}

pub fn thresholds_json(thresholds: &EvalThresholds) -> Result<Value> {
    serde_json::to_value(thresholds).context("failed to encode eval thresholds json")
}
