use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;

use crate::config::RuntimePaths;
use crate::export::{DEFAULT_LIMIT, ExportRequest};

#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    #[arg(long, env = "SUPABASE_URL")]
    pub supabase_url: Option<String>,

    #[arg(long, env = "SUPABASE_SERVICE_ROLE_KEY", hide_env_values = true)]
    pub service_role_key: Option<String>,

    #[arg(long, default_value_t = 1)]
    pub days: u32,

    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    pub limit: usize,

    /// Repeat to filter on several sources (default: generation, generation_cached).
    #[arg(long = "source", value_name = "SOURCE")]
    pub sources: Vec<String>,

    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Exit with code 2 when no records are exported.
    #[arg(long, default_value_t = false)]
    pub fail_on_empty: bool,
}

/// `--fail-on-empty` was set and the export window held no rows.
#[derive(Debug)]
pub struct EmptyExportFailure;

impl std::fmt::Display for EmptyExportFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("export produced no eval records")
    }
}

impl std::error::Error for EmptyExportFailure {}

pub fn run(args: &ExportArgs, runtime_paths: &RuntimePaths) -> Result<()> {
    let (Some(supabase_url), Some(service_role_key)) =
        (args.supabase_url.as_deref(), args.service_role_key.as_deref())
    else {
        bail!("SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY are required");
    };
    let output = match &args.output {
        Some(path) => runtime_paths.resolve(path)?,
        None => runtime_paths.out_dir.join("recent_eval_records.jsonl"),
    };

    let request = ExportRequest {
        supabase_url: supabase_url.to_string(),
        since_iso: crate::utils::time::compute_since_iso(args.days)?,
        limit: args.limit,
        sources: args.sources.clone(),
    };
    println!(
        "export: start since={} limit={} output={}",
        request.since_iso,
        request.limit,
        output.display()
    );

    let rows = crate::export::fetch_training_example_rows(&request, service_role_key)?;
    let payloads = rows
        .iter()
        .map(crate::export::row_to_eval_record_payload)
        .collect::<Vec<_>>();
    crate::export::write_payloads_jsonl(&output, &payloads)?;
    println!(
        "export: complete records={} output={}",
        payloads.len(),
        output.display()
    );

    if args.fail_on_empty && payloads.is_empty() {
        return Err(EmptyExportFailure.into());
    }
    Ok(())
}
