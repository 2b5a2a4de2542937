use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use super::{GateFailure, ThresholdArgs, print_gate_lines};
use crate::config::RuntimePaths;
use crate::models::context::{DEFAULT_SOURCE, DEFAULT_TRIGGERED_BY};
use crate::models::{EvalIngestContext, RunType, SchemaVariant};

#[derive(Debug, Clone, Args)]
pub struct IngestSqlArgs {
    #[arg(long, value_name = "PATH")]
    pub input: PathBuf,

    #[arg(long, value_name = "PATH")]
    pub sql_output: Option<PathBuf>,

    #[arg(long, value_name = "PATH")]
    pub report_output: Option<PathBuf>,

    #[arg(long, default_value = "offline")]
    pub run_type: RunType,

    #[arg(long, default_value = "alt")]
    pub schema_variant: SchemaVariant,

    #[arg(long, default_value = DEFAULT_TRIGGERED_BY)]
    pub triggered_by: String,

    #[arg(long, env = "GITHUB_SHA")]
    pub commit_sha: Option<String>,

    /// Defaults to the input path.
    #[arg(long)]
    pub dataset_ref: Option<String>,

    #[arg(long, default_value = DEFAULT_SOURCE)]
    pub source: String,

    /// Reuse a run id instead of generating one.
    #[arg(long, value_name = "UUID")]
    pub run_id: Option<String>,

    /// Exit with code 2 when any gate fails.
    #[arg(long, default_value_t = false)]
    pub strict_exit: bool,

    #[command(flatten)]
    pub thresholds: ThresholdArgs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestArtifactLayout {
    pub sql: PathBuf,
    pub report_json: PathBuf,
}

#[must_use]
pub fn build_artifact_layout(out_dir: &std::path::Path) -> IngestArtifactLayout {
    IngestArtifactLayout {
        sql: out_dir.join("eval_run_ingest.sql"),
        report_json: out_dir.join("eval_run_report.json"),
    }
}

pub fn run(args: &IngestSqlArgs, runtime_paths: &RuntimePaths) -> Result<()> {
    let input = runtime_paths.resolve(&args.input)?;
    let defaults = build_artifact_layout(&runtime_paths.out_dir);
    let sql_output = match &args.sql_output {
        Some(path) => runtime_paths.resolve(path)?,
        None => defaults.sql,
    };
    let report_output = match &args.report_output {
        Some(path) => runtime_paths.resolve(path)?,
        None => defaults.report_json,
    };
    println!(
        "ingest-sql: start input={} run_type={} schema_variant={}",
        input.display(),
        args.run_type,
        args.schema_variant
    );

    let thresholds = args.thresholds.resolve(runtime_paths)?;
    let records = crate::report::load_eval_records(&input)?;
    let report = crate::report::build_eval_report(&records, &thresholds)?;
    let context = EvalIngestContext {
        run_type: args.run_type,
        triggered_by: Some(args.triggered_by.clone()),
        commit_sha: args.commit_sha.clone(),
        dataset_ref: Some(
            args.dataset_ref
                .clone()
                .unwrap_or_else(|| args.input.display().to_string()),
        ),
        source: args.source.clone(),
        schema_variant: args.schema_variant,
    };
    let script = crate::sql::build_eval_ingest_sql(
        &records,
        &thresholds,
        &context,
        Some(&report),
        args.run_id.as_deref(),
    )?;

    if let Some(parent) = sql_output.parent() {
        std::fs::create_dir_all(parent).context("failed to create sql artifact directory")?;
    }
    std::fs::write(&sql_output, &script.sql)
        .with_context(|| format!("failed to write ingest sql: {}", sql_output.display()))?;
    crate::report::write_report_artifact(&report_output, &report)?;

    print_gate_lines("ingest-sql", &report);
    println!(
        "ingest-sql: artifacts sql={} report={}",
        sql_output.display(),
        report_output.display()
    );
    println!("run_id={}", script.run_id);
    println!("status={}", script.status);

    if args.strict_exit && !report.overall_pass {
        return Err(GateFailure::from_report(&report).into());
    }
    Ok(())
}
