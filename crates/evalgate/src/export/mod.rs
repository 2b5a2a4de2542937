//! Export of recent generation rows from the Supabase REST API into eval
//! JSONL payloads.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::Url;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::models::record::{UNKNOWN_RECORD_ID, coerce_int, is_truthy};

pub const TRAINING_EXAMPLES_PATH: &str = "/rest/v1/ai_training_examples";
pub const DEFAULT_SOURCES: [&str; 2] = ["generation", "generation_cached"];
pub const DEFAULT_LIMIT: usize = 2000;
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

const SELECT_COLUMNS: &str = "id,request_id,requested_provider,selected_provider,route_strategy,fallback_used,latency_ms,metadata,created_at,source";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub supabase_url: String,
    pub since_iso: String,
    pub limit: usize,
    pub sources: Vec<String>,
}

impl ExportRequest {
    fn effective_sources(&self) -> Vec<&str> {
        if self.sources.is_empty() {
            DEFAULT_SOURCES.to_vec()
        } else {
            self.sources.iter().map(String::as_str).collect()
        }
    }
}

/// PostgREST list query for recent generation rows. Query values are
/// form-urlencoded.
pub fn build_eval_export_url(request: &ExportRequest) -> Result<Url> {
    let base = format!(
        "{}{TRAINING_EXAMPLES_PATH}",
        request.supabase_url.trim_end_matches('/')
    );
    let sources = format!("in.({})", request.effective_sources().join(","));
    let mut url = Url::parse(&base)
        .with_context(|| format!("invalid supabase url: {}", request.supabase_url))?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("select", SELECT_COLUMNS);
        query.append_pair("source", &sources);
        query.append_pair("created_at", &format!("gte.{}", request.since_iso));
        query.append_pair("order", "created_at.desc");
        query.append_pair("limit", &request.limit.to_string());
    }
    Ok(url)
}

pub fn fetch_training_example_rows(
    request: &ExportRequest,
    service_role_key: &str,
) -> Result<Vec<Map<String, Value>>> {
    let url = build_eval_export_url(request)?;
    debug!(url = %url, "fetching training example rows");

    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .context("failed to build supabase http client")?;
    let body = client
        .get(url)
        .header("apikey", service_role_key)
        .header(AUTHORIZATION, format!("Bearer {service_role_key}"))
        .header(ACCEPT, "application/json")
        .send()
        .context("failed to reach supabase rest api")?
        .error_for_status()
        .context("supabase rest api returned an error status")?
        .text()
        .context("failed to read supabase response body")?;

    parse_rows(&body)
}

/// Keeps only the object rows of a REST list response.
pub fn parse_rows(body: &str) -> Result<Vec<Map<String, Value>>> {
    let parsed = serde_json::from_str::<Value>(body).context("supabase response is not json")?;
    let Value::Array(rows) = parsed else {
        bail!("expected list response from Supabase REST API");
    };

    Ok(rows
        .into_iter()
        .filter_map(|row| match row {
            Value::Object(row) => Some(row),
            _ => None,
        })
        .collect())
}

/// Lenient boolean used for exported metadata flags.
#[must_use]
pub fn to_bool(value: Option<&Value>, default: bool) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(text)) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            _ => default,
        },
        _ => default,
    }
}

/// Maps one `ai_training_examples` row onto the eval record payload shape.
/// Quality flags live in the row's camelCase `metadata` object.
#[must_use]
pub fn row_to_eval_record_payload(row: &Map<String, Value>) -> Map<String, Value> {
    let empty = Map::new();
    let metadata = match row.get("metadata") {
        Some(Value::Object(metadata)) => metadata,
        _ => &empty,
    };
    let request_id = row.get("request_id").filter(|value| !value.is_null());
    let record_id = first_truthy(&[row.get("id"), request_id])
        .map_or_else(|| UNKNOWN_RECORD_ID.to_string(), value_text);

    let fallback_used = to_bool(
        row.get("fallback_used"),
        to_bool(metadata.get("fallbackUsed"), false),
    );
    let latency_ms = row
        .get("latency_ms")
        .and_then(coerce_int)
        .or_else(|| metadata.get("latencyMs").and_then(coerce_int));

    let mut payload = Map::new();
    payload.insert("record_id".to_string(), json!(record_id));
    payload.insert("request_id".to_string(), json!(request_id.map(value_text)));
    for (key, metadata_key, default) in [
        ("schema_valid", "schemaValid", true),
        ("patch_apply_success", "patchApplySuccess", true),
        ("edited_after_generate", "editedAfterGenerate", false),
        ("published_within_7d", "publishedWithin7d", false),
        (
            "safety_html_tailwind_compliant",
            "safetyHtmlTailwindCompliant",
            true,
        ),
    ] {
        payload.insert(
            key.to_string(),
            json!(to_bool(metadata.get(metadata_key), default)),
        );
    }
    payload.insert("fallback_used".to_string(), json!(fallback_used));
    payload.insert("latency_ms".to_string(), json!(latency_ms));
    for key in ["requested_provider", "selected_provider", "route_strategy"] {
        payload.insert(key.to_string(), row.get(key).cloned().unwrap_or(Value::Null));
    }
    for (key, metadata_key) in [
        ("tenant_id", "tenantId"),
        ("route_id", "routeId"),
        ("model_id", "modelId"),
        ("model_version_id", "modelVersionId"),
    ] {
        let value = first_truthy(&[row.get(key), metadata.get(metadata_key)])
            .cloned()
            .unwrap_or(Value::Null);
        payload.insert(key.to_string(), value);
    }

    payload
}

fn first_truthy<'a>(candidates: &[Option<&'a Value>]) -> Option<&'a Value> {
    candidates
        .iter()
        .flatten()
        .copied()
        .find(|value| is_truthy(value))
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

pub fn write_payloads_jsonl(path: &Path, payloads: &[Map<String, Value>]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("failed to create export artifact directory")?;
    }

    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create export artifact: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for payload in payloads {
        serde_json::to_writer(&mut writer, payload).context("failed to encode export jsonl row")?;
        writer
            .write_all(b"\n")
            .context("failed to write export newline")?;
    }
    writer
        .flush()
        .context("failed to flush export artifact writer")
}
