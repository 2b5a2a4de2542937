use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use super::{GateFailure, ThresholdArgs, print_gate_lines};
use crate::config::RuntimePaths;

#[derive(Debug, Clone, Args)]
pub struct ReportArgs {
    #[arg(long, value_name = "PATH")]
    pub input: PathBuf,

    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub thresholds: ThresholdArgs,
}

pub fn run(args: &ReportArgs, runtime_paths: &RuntimePaths) -> Result<()> {
    let input = runtime_paths.resolve(&args.input)?;
    let output = match &args.output {
        Some(path) => runtime_paths.resolve(path)?,
        None => crate::report::build_artifact_layout(&runtime_paths.out_dir).report_json,
    };
    println!(
        "report: start input={} out_dir={}",
        input.display(),
        runtime_paths.out_dir.display()
    );

    let thresholds = args.thresholds.resolve(runtime_paths)?;
    let records = crate::report::load_eval_records(&input)?;
    let report = crate::report::build_eval_report(&records, &thresholds)?;
    crate::report::write_report_artifact(&output, &report)?;

    print_gate_lines("report", &report);
    println!(
        "report: complete records={} overall_pass={} report={}",
        report.record_count,
        report.overall_pass,
        output.display()
    );

    if !report.overall_pass {
        return Err(GateFailure::from_report(&report).into());
    }
    Ok(())
}
