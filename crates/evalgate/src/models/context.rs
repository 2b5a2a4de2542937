use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const DEFAULT_TRIGGERED_BY: &str = "local-cli";
pub const DEFAULT_SOURCE: &str = "evalgate ingest-sql";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunType {
    Offline,
    Shadow,
    Canary,
}

impl RunType {
    pub const ALL: [Self; 3] = [Self::Offline, Self::Shadow, Self::Canary];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Offline => "offline",
            Self::Shadow => "shadow",
            Self::Canary => "canary",
        }
    }
}

impl FromStr for RunType {
    type Err = IngestConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|run_type| run_type.as_str() == raw)
            .ok_or_else(|| IngestConfigError::UnsupportedRunType(raw.to_string()))
    }
}

impl Display for RunType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target table layout for the generated ingest script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaVariant {
    /// `eval_runs` / `eval_samples`: typed provider columns, `completed|failed` status.
    Legacy,
    /// `ai_eval_runs` / `ai_eval_samples`: `sample_key` plus JSON metadata, `passed|failed` status.
    #[default]
    Alt,
}

impl SchemaVariant {
    pub const ALL: [Self; 2] = [Self::Legacy, Self::Alt];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Alt => "alt",
        }
    }
}

impl FromStr for SchemaVariant {
    type Err = IngestConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|variant| variant.as_str() == raw)
            .ok_or_else(|| IngestConfigError::UnsupportedSchemaVariant(raw.to_string()))
    }
}

impl Display for SchemaVariant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run-level metadata for one ingest script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalIngestContext {
    pub run_type: RunType,
    pub triggered_by: Option<String>,
    pub commit_sha: Option<String>,
    pub dataset_ref: Option<String>,
    pub source: String,
    pub schema_variant: SchemaVariant,
}

impl Default for EvalIngestContext {
    fn default() -> Self {
        Self {
            run_type: RunType::Offline,
            triggered_by: Some(DEFAULT_TRIGGERED_BY.to_string()),
            commit_sha: None,
            dataset_ref: None,
            source: DEFAULT_SOURCE.to_string(),
            schema_variant: SchemaVariant::default(),
        }
    }
}

/// Rejected ingest configuration. Raised before any SQL text is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestConfigError {
    UnsupportedRunType(String),
    UnsupportedSchemaVariant(String),
    InvalidRunId(String),
}

impl Display for IngestConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedRunType(raw) => write!(
                f,
                "unsupported run_type: {raw}. Must be one of {}",
                join_keys(RunType::ALL.iter().map(|run_type| run_type.as_str()))
            ),
            Self::UnsupportedSchemaVariant(raw) => write!(
                f,
                "unsupported schema_variant: {raw}. Must be one of {}",
                join_keys(SchemaVariant::ALL.iter().map(|variant| variant.as_str()))
            ),
            Self::InvalidRunId(raw) => write!(f, "run_id must be a valid UUID: {raw}"),
        }
    }
}

impl std::error::Error for IngestConfigError {}

fn join_keys<'a>(keys: impl Iterator<Item = &'a str>) -> String {
    keys.collect::<Vec<_>>().join(", ")
}
