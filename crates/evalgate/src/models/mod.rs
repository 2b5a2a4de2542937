pub mod context;
pub mod record;
pub mod report;
pub mod thresholds;

pub use context::{EvalIngestContext, IngestConfigError, RunType, SchemaVariant};
pub use record::{EvalRecord, normalize};
pub use report::{
    EvalMetrics, EvalReport, GateMap, OperationalMetrics, QualityMetrics, json_schema,
};
pub use thresholds::{EvalThresholds, GATE_KEYS};
