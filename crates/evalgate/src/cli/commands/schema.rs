use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::config::RuntimePaths;

#[derive(Debug, Clone, Args)]
pub struct SchemaArgs {
    /// Write the schema to a file instead of stdout.
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

pub fn run(args: &SchemaArgs, runtime_paths: &RuntimePaths) -> Result<()> {
    let schema = crate::models::json_schema();
    let encoded = serde_json::to_string_pretty(&schema).context("failed to encode report schema")?;

    match &args.output {
        Some(path) => {
            let path = runtime_paths.resolve(path)?;
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .context("failed to create schema artifact directory")?;
            }
            std::fs::write(&path, format!("{encoded}\n"))
                .with_context(|| format!("failed to write report schema: {}", path.display()))?;
            println!("schema: written {}", path.display());
        }
        None => println!("{encoded}"),
    }

    Ok(())
}
