use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const SCHEMA_VALID_RATE: &str = "schema_valid_rate";
pub const PATCH_APPLY_SUCCESS: &str = "patch_apply_success";
pub const EDIT_AFTER_GENERATE_RATE: &str = "edit_after_generate_rate";
pub const PUBLISH_CONVERSION_PROXY: &str = "publish_conversion_proxy";
pub const SAFETY_HTML_TAILWIND_COMPLIANCE: &str = "safety_html_tailwind_compliance";
pub const FALLBACK_RATE_MAX: &str = "fallback_rate_max";
pub const P95_LATENCY_MS_MAX: &str = "p95_latency_ms_max";

/// Gate keys in report order. These strings are persisted as JSON keys in
/// reports and SQL metadata.
pub const GATE_KEYS: [&str; 7] = [
    SCHEMA_VALID_RATE,
    PATCH_APPLY_SUCCESS,
    EDIT_AFTER_GENERATE_RATE,
    PUBLISH_CONVERSION_PROXY,
    SAFETY_HTML_TAILWIND_COMPLIANCE,
    FALLBACK_RATE_MAX,
    P95_LATENCY_MS_MAX,
];

/// Release limits. Quality fields are minimums; the two operational fields
/// are maximums.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct EvalThresholds {
    pub schema_valid_rate: f64,
    pub patch_apply_success: f64,
    pub edit_after_generate_rate: f64,
    pub publish_conversion_proxy: f64,
    pub safety_html_tailwind_compliance: f64,
    pub fallback_rate_max: f64,
    pub p95_latency_ms_max: i64,
}

impl Default for EvalThresholds {
    fn default() -> Self {
        Self {
            schema_valid_rate: 0.99,
            patch_apply_success: 0.95,
            edit_after_generate_rate: 0.30,
            publish_conversion_proxy: 0.15,
            safety_html_tailwind_compliance: 0.995,
            fallback_rate_max: 0.25,
            p95_latency_ms_max: 45_000,
        }
    }
}
