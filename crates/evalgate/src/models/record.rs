use serde::Serialize;
use serde_json::{Map, Value};

pub const UNKNOWN_RECORD_ID: &str = "unknown";

/// One evaluated generation sample with every quality flag resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvalRecord {
    pub record_id: String,
    pub schema_valid: bool,
    pub patch_apply_success: bool,
    pub edited_after_generate: bool,
    pub published_within_7d: bool,
    pub safety_html_tailwind_compliant: bool,
    pub fallback_used: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_provider: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_provider: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_strategy: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version_id: Option<String>,
}

impl Default for EvalRecord {
    fn default() -> Self {
        Self {
            record_id: UNKNOWN_RECORD_ID.to_string(),
            schema_valid: false,
            patch_apply_success: false,
            edited_after_generate: false,
            published_within_7d: false,
            safety_html_tailwind_compliant: false,
            fallback_used: false,
            latency_ms: None,
            requested_provider: None,
            selected_provider: None,
            route_strategy: None,
            request_id: None,
            tenant_id: None,
            route_id: None,
            model_id: None,
            model_version_id: None,
        }
    }
}

impl EvalRecord {
    /// Builds a record from an untyped JSONL object. Malformed fields degrade
    /// to their defaults; this never fails.
    #[must_use]
    pub fn from_payload(payload: &Map<String, Value>) -> Self {
        let record_id = ["record_id", "id"]
            .into_iter()
            .filter_map(|key| payload.get(key))
            .find(|value| is_truthy(value))
            .map_or_else(|| UNKNOWN_RECORD_ID.to_string(), scalar_text);

        Self {
            record_id,
            schema_valid: flag(payload, "schema_valid"),
            patch_apply_success: flag(payload, "patch_apply_success"),
            edited_after_generate: flag(payload, "edited_after_generate"),
            published_within_7d: flag(payload, "published_within_7d"),
            safety_html_tailwind_compliant: flag(payload, "safety_html_tailwind_compliant"),
            fallback_used: flag(payload, "fallback_used"),
            latency_ms: payload.get("latency_ms").and_then(coerce_int),
            requested_provider: text(payload, "requested_provider"),
            selected_provider: text(payload, "selected_provider"),
            route_strategy: text(payload, "route_strategy"),
            request_id: text(payload, "request_id"),
            tenant_id: text(payload, "tenant_id"),
            route_id: text(payload, "route_id"),
            model_id: text(payload, "model_id"),
            model_version_id: text(payload, "model_version_id"),
        }
    }
}

#[must_use]
pub fn normalize(payload: &Map<String, Value>) -> EvalRecord {
    EvalRecord::from_payload(payload)
}

/// JSON truthiness: null, false, zero, and empty strings/arrays/objects are false.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|parsed| parsed != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(entries) => !entries.is_empty(),
    }
}

/// Integer coercion shared by the record model and the export row mapper.
/// Floats and numeric strings truncate toward zero; anything else is `None`.
#[must_use]
pub fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Bool(flag) => Some(i64::from(*flag)),
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().and_then(truncate_float)),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok().and_then(truncate_float)
        }
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn truncate_float(value: f64) -> Option<i64> {
    if !value.is_finite() || value >= i64::MAX as f64 || value <= i64::MIN as f64 {
        return None;
    }
    Some(value.trunc() as i64)
}

fn flag(payload: &Map<String, Value>, key: &str) -> bool {
    payload.get(key).is_some_and(is_truthy)
}

fn text(payload: &Map<String, Value>, key: &str) -> Option<String> {
    match payload.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => Some(scalar_text(value)),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
