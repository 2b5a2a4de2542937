pub mod alt;
pub mod legacy;
pub mod literal;
pub mod script;

pub use literal::{
    UuidCheck, canonical_json, check_uuid, sql_bool, sql_int, sql_jsonb, sql_text, sql_uuid,
};
pub use script::{IngestScript, RunStatus, build_eval_ingest_sql};
