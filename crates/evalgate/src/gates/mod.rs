use crate::models::thresholds::{
    EDIT_AFTER_GENERATE_RATE, FALLBACK_RATE_MAX, P95_LATENCY_MS_MAX, PATCH_APPLY_SUCCESS,
    PUBLISH_CONVERSION_PROXY, SAFETY_HTML_TAILWIND_COMPLIANCE, SCHEMA_VALID_RATE,
};
use crate::models::{EvalMetrics, EvalThresholds, GateMap, OperationalMetrics, QualityMetrics};

/// Quality gates pass when the metric meets or exceeds its minimum.
#[must_use]
pub fn gate_quality_metrics(metrics: &QualityMetrics, thresholds: &EvalThresholds) -> GateMap {
    [
        (
            SCHEMA_VALID_RATE,
            metrics.schema_valid_rate >= thresholds.schema_valid_rate,
        ),
        (
            PATCH_APPLY_SUCCESS,
            metrics.patch_apply_success >= thresholds.patch_apply_success,
        ),
        (
            EDIT_AFTER_GENERATE_RATE,
            metrics.edit_after_generate_rate >= thresholds.edit_after_generate_rate,
        ),
        (
            PUBLISH_CONVERSION_PROXY,
            metrics.publish_conversion_proxy >= thresholds.publish_conversion_proxy,
        ),
        (
            SAFETY_HTML_TAILWIND_COMPLIANCE,
            metrics.safety_html_tailwind_compliance >= thresholds.safety_html_tailwind_compliance,
        ),
    ]
    .into_iter()
    .map(|(key, passed)| (key.to_string(), passed))
    .collect()
}

/// Operational gates pass when the metric stays at or under its maximum.
/// A missing p95 passes.
#[must_use]
pub fn gate_operational_metrics(
    metrics: &OperationalMetrics,
    thresholds: &EvalThresholds,
) -> GateMap {
    let latency_passed = metrics
        .p95_latency_ms
        .is_none_or(|p95| p95 <= thresholds.p95_latency_ms_max);

    [
        (
            FALLBACK_RATE_MAX,
            metrics.fallback_rate <= thresholds.fallback_rate_max,
        ),
        (P95_LATENCY_MS_MAX, latency_passed),
    ]
    .into_iter()
    .map(|(key, passed)| (key.to_string(), passed))
    .collect()
}

#[must_use]
pub fn gate_metrics(metrics: &EvalMetrics, thresholds: &EvalThresholds) -> GateMap {
    let mut gates = gate_quality_metrics(&metrics.quality, thresholds);
    gates.extend(gate_operational_metrics(&metrics.operational, thresholds));
    gates
}

#[must_use]
pub fn overall_pass(gates: &GateMap) -> bool {
    gates.values().all(|passed| *passed)
}
