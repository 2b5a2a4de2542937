pub mod export;
pub mod ingest_sql;
pub mod report;
pub mod schema;

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::config::{RuntimePaths, ThresholdOverrides, resolve_thresholds};
use crate::models::{EvalReport, EvalThresholds};

#[derive(Debug, Clone, Default, Args)]
pub struct ThresholdArgs {
    /// JSON document with threshold values; flags below override it.
    #[arg(long = "thresholds", value_name = "PATH")]
    pub thresholds_file: Option<PathBuf>,

    #[arg(long)]
    pub schema_valid_rate: Option<f64>,

    #[arg(long)]
    pub patch_apply_success: Option<f64>,

    #[arg(long)]
    pub edit_after_generate_rate: Option<f64>,

    #[arg(long)]
    pub publish_conversion_proxy: Option<f64>,

    #[arg(long)]
    pub safety_html_tailwind_compliance: Option<f64>,

    #[arg(long)]
    pub fallback_rate_max: Option<f64>,

    #[arg(long)]
    pub p95_latency_ms_max: Option<i64>,
}

impl ThresholdArgs {
    pub fn resolve(&self, runtime_paths: &RuntimePaths) -> Result<EvalThresholds> {
        let file = self
            .thresholds_file
            .as_deref()
            .map(|path| runtime_paths.resolve(path))
            .transpose()?;
        resolve_thresholds(file.as_deref(), self.overrides())
    }

    fn overrides(&self) -> ThresholdOverrides {
        ThresholdOverrides {
            schema_valid_rate: self.schema_valid_rate,
            patch_apply_success: self.patch_apply_success,
            edit_after_generate_rate: self.edit_after_generate_rate,
            publish_conversion_proxy: self.publish_conversion_proxy,
            safety_html_tailwind_compliance: self.safety_html_tailwind_compliance,
            fallback_rate_max: self.fallback_rate_max,
            p95_latency_ms_max: self.p95_latency_ms_max,
        }
    }
}

/// One or more release gates failed.
#[derive(Debug)]
pub struct GateFailure {
    pub failed_gates: Vec<String>,
}

impl GateFailure {
    #[must_use]
    pub fn from_report(report: &EvalReport) -> Self {
        Self {
            failed_gates: report
                .gates
                .iter()
                .filter(|(_, passed)| !**passed)
                .map(|(key, _)| key.clone())
                .collect(),
        }
    }
}

impl std::fmt::Display for GateFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "eval gates failed: {}", self.failed_gates.join(", "))
    }
}

impl std::error::Error for GateFailure {}

pub(crate) fn print_gate_lines(command: &str, report: &EvalReport) {
    for (gate, passed) in &report.gates {
        println!("{command}: gate {gate}={}", if *passed { "pass" } else { "fail" });
    }
}
