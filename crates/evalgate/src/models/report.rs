use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::thresholds::EvalThresholds;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QualityMetrics {
    pub schema_valid_rate: f64,
    pub patch_apply_success: f64,
    pub edit_after_generate_rate: f64,
    pub publish_conversion_proxy: f64,
    pub safety_html_tailwind_compliance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OperationalMetrics {
    pub fallback_rate: f64,

    /// `None` when no record carried a usable latency; serialized as `null`.
    pub p95_latency_ms: Option<i64>,
}

/// Quality and operational metrics flattened into a single JSON object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EvalMetrics {
    #[serde(flatten)]
    pub quality: QualityMetrics,

    #[serde(flatten)]
    pub operational: OperationalMetrics,
}

pub type GateMap = BTreeMap<String, bool>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct EvalReport {
    pub generated_at: String,
    pub record_count: usize,
    pub metrics: EvalMetrics,
    pub thresholds: EvalThresholds,
    pub gates: GateMap,
    pub overall_pass: bool,
}

#[must_use]
pub fn json_schema() -> Value {
    let schema = schemars::schema_for!(EvalReport);
    match serde_json::to_value(schema) {
        Ok(value) => value,
        Err(error) => {
            panic!("failed to serialize generated eval report schema: {error}");
        }
    }
}
