use crate::models::{EvalMetrics, EvalRecord, OperationalMetrics, QualityMetrics};

const RATE_SCALE: f64 = 10_000.0;
const P95_PERCENTILE: usize = 95;

/// Share of `true` values rounded to four decimals. An empty input is `0.0`.
#[must_use]
pub fn rate(values: &[bool]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let hits = values.iter().filter(|value| **value).count();
    round_rate(hits as f64 / values.len() as f64)
}

fn rate_of(records: &[EvalRecord], field: impl Fn(&EvalRecord) -> bool) -> f64 {
    let values = records.iter().map(field).collect::<Vec<_>>();
    rate(&values)
}

fn round_rate(value: f64) -> f64 {
    (value * RATE_SCALE).round() / RATE_SCALE
}

#[must_use]
pub fn compute_metric_rates(records: &[EvalRecord]) -> QualityMetrics {
    QualityMetrics {
        schema_valid_rate: rate_of(records, |record| record.schema_valid),
        patch_apply_success: rate_of(records, |record| record.patch_apply_success),
        edit_after_generate_rate: rate_of(records, |record| record.edited_after_generate),
        publish_conversion_proxy: rate_of(records, |record| record.published_within_7d),
        safety_html_tailwind_compliance: rate_of(records, |record| {
            record.safety_html_tailwind_compliant
        }),
    }
}

#[must_use]
pub fn compute_operational_metrics(records: &[EvalRecord]) -> OperationalMetrics {
    let latencies = records
        .iter()
        .filter_map(|record| record.latency_ms)
        .filter(|latency| *latency >= 0)
        .collect::<Vec<_>>();

    OperationalMetrics {
        fallback_rate: rate_of(records, |record| record.fallback_used),
        p95_latency_ms: nearest_rank(&latencies, P95_PERCENTILE),
    }
}

#[must_use]
pub fn compute_metrics(records: &[EvalRecord]) -> EvalMetrics {
    EvalMetrics {
        quality: compute_metric_rates(records),
        operational: compute_operational_metrics(records),
    }
}

/// Nearest-rank percentile: the value at sorted index `ceil(p/100 * n) - 1`,
/// clamped into range. `None` for an empty sample.
#[must_use]
pub fn nearest_rank(samples: &[i64], percentile: usize) -> Option<i64> {
    if samples.is_empty() {
        return None;
    }

    let mut sorted = samples.to_vec();
    sorted.sort_unstable();
    let len = sorted.len();
    let rank = len
        .saturating_mul(percentile)
        .saturating_add(99)
        .saturating_div(100)
        .max(1);
    let index = rank.saturating_sub(1).min(len - 1);
    sorted.get(index).copied()
}
