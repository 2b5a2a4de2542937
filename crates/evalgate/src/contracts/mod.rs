pub mod telemetry;

pub use telemetry::{RuntimeGenerationTelemetry, validate_runtime_generation_telemetry};
