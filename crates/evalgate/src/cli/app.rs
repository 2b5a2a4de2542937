use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::commands::{
    export::ExportArgs, ingest_sql::IngestSqlArgs, report::ReportArgs, schema::SchemaArgs,
};

#[derive(Debug, Parser)]
#[command(
    name = "evalgate",
    version,
    about = "Release gating and SQL ingest for AI generation eval runs"
)]
pub struct Cli {
    #[command(flatten)]
    pub runtime: RuntimeArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Args)]
pub struct RuntimeArgs {
    #[arg(long, global = true, value_name = "PATH")]
    pub home_dir: Option<PathBuf>,

    #[arg(long, global = true, value_name = "PATH")]
    pub cwd: Option<PathBuf>,

    #[arg(long, global = true, value_name = "PATH")]
    pub out_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute metrics and gates for a JSONL batch and write the report.
    Report(ReportArgs),
    /// Write the SQL script that ingests a run and its samples.
    IngestSql(IngestSqlArgs),
    /// Export recent generation rows from Supabase as eval JSONL.
    Export(ExportArgs),
    /// Print the JSON schema of the eval report document.
    Schema(SchemaArgs),
}
