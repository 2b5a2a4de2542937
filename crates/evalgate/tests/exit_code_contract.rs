use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::json;

const EXIT_SUCCESS: i32 = 0;
const EXIT_RUNTIME_FAILURE: i32 = 1;
const EXIT_GATE_FAILURE: i32 = 2;
const EXIT_USAGE_ERROR: i32 = 64;

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("{prefix}-{nanos}"))
}

fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/eval_records_sample.jsonl")
}

fn write_passing_records(path: &Path) {
    let lines = (1..=4)
        .map(|index| {
            let record = json!({
                "record_id": format!("pass-{index}"),
                "schema_valid": true,
                "patch_apply_success": true,
                "edited_after_generate": true,
                "published_within_7d": true,
                "safety_html_tailwind_compliant": true,
                "fallback_used": false,
                "latency_ms": 1000 * index
            });
            serde_json::to_string(&record).expect("record should serialize")
        })
        .collect::<Vec<_>>();
    std::fs::write(path, format!("{}\n", lines.join("\n"))).expect("records should be writable");
}

fn run_evalgate(temp: &Path, args: &[&str]) -> Output {
    let home_dir = temp.join("home");
    let cwd = temp.join("cwd");
    std::fs::create_dir_all(&home_dir).expect("home dir should be creatable");
    std::fs::create_dir_all(&cwd).expect("cwd dir should be creatable");

    Command::new(env!("CARGO_BIN_EXE_evalgate"))
        .arg("--home-dir")
        .arg(&home_dir)
        .arg("--cwd")
        .arg(&cwd)
        .arg("--out-dir")
        .arg(temp.join("out"))
        .args(args)
        .output()
        .expect("command should execute")
}

#[test]
fn missing_required_args_exits_with_usage_code() {
    let status = Command::new(env!("CARGO_BIN_EXE_evalgate"))
        .arg("report")
        .status()
        .expect("command should execute");

    assert_eq!(status.code(), Some(EXIT_USAGE_ERROR));
}

#[test]
fn unsupported_run_type_exits_with_usage_code() {
    let temp = unique_temp_dir("evalgate-exit-run-type");
    let input = fixture_path();
    let output = run_evalgate(
        &temp,
        &[
            "ingest-sql",
            "--input",
            input.to_str().expect("fixture path should be utf-8"),
            "--run-type",
            "nightly",
        ],
    );

    assert_eq!(output.status.code(), Some(EXIT_USAGE_ERROR));
    assert!(!temp.join("out/eval_run_ingest.sql").exists());
}

#[test]
fn invalid_run_id_exits_with_usage_code() {
    let temp = unique_temp_dir("evalgate-exit-run-id");
    let input = fixture_path();
    let output = run_evalgate(
        &temp,
        &[
            "ingest-sql",
            "--input",
            input.to_str().expect("fixture path should be utf-8"),
            "--run-id",
            "run-1",
        ],
    );

    assert_eq!(output.status.code(), Some(EXIT_USAGE_ERROR));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("run_id must be a valid UUID: run-1"));
}

#[test]
fn missing_input_exits_with_runtime_code() {
    let temp = unique_temp_dir("evalgate-exit-missing-input");
    let missing = temp.join("absent.jsonl");
    let output = run_evalgate(
        &temp,
        &[
            "report",
            "--input",
            missing.to_str().expect("temp path should be utf-8"),
        ],
    );

    assert_eq!(output.status.code(), Some(EXIT_RUNTIME_FAILURE));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("input file not found"));
}

#[test]
fn failing_gates_exit_with_gate_code() {
    let temp = unique_temp_dir("evalgate-exit-gates");
    let input = fixture_path();
    let output = run_evalgate(
        &temp,
        &[
            "report",
            "--input",
            input.to_str().expect("fixture path should be utf-8"),
        ],
    );

    assert_eq!(output.status.code(), Some(EXIT_GATE_FAILURE));
    assert!(temp.join("out/offline_eval_report.json").exists());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("eval gates failed"));
}

#[test]
fn ingest_sql_without_strict_exit_succeeds_on_failing_gates() {
    let temp = unique_temp_dir("evalgate-exit-ingest-lenient");
    let input = fixture_path();
    let output = run_evalgate(
        &temp,
        &[
            "ingest-sql",
            "--input",
            input.to_str().expect("fixture path should be utf-8"),
        ],
    );

    assert_eq!(output.status.code(), Some(EXIT_SUCCESS));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("status=failed"));
    assert!(temp.join("out/eval_run_ingest.sql").exists());
    assert!(temp.join("out/eval_run_report.json").exists());
}

#[test]
fn ingest_sql_with_strict_exit_fails_on_failing_gates() {
    let temp = unique_temp_dir("evalgate-exit-ingest-strict");
    let input = fixture_path();
    let output = run_evalgate(
        &temp,
        &[
            "ingest-sql",
            "--input",
            input.to_str().expect("fixture path should be utf-8"),
            "--strict-exit",
        ],
    );

    assert_eq!(output.status.code(), Some(EXIT_GATE_FAILURE));
    assert!(temp.join("out/eval_run_ingest.sql").exists());
}

#[test]
fn successful_report_exits_zero() {
    let temp = unique_temp_dir("evalgate-exit-success");
    std::fs::create_dir_all(&temp).expect("temp dir should be creatable");
    let input = temp.join("records.jsonl");
    write_passing_records(&input);

    let output = run_evalgate(
        &temp,
        &[
            "report",
            "--input",
            input.to_str().expect("temp path should be utf-8"),
        ],
    );

    assert_eq!(output.status.code(), Some(EXIT_SUCCESS));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("report: complete records=4 overall_pass=true"));
}

#[test]
fn export_without_credentials_exits_with_runtime_code() {
    let temp = unique_temp_dir("evalgate-exit-export");
    let output = Command::new(env!("CARGO_BIN_EXE_evalgate"))
        .env_remove("SUPABASE_URL")
        .env_remove("SUPABASE_SERVICE_ROLE_KEY")
        .arg("--home-dir")
        .arg(temp.join("home"))
        .arg("--cwd")
        .arg(&temp)
        .arg("export")
        .output()
        .expect("command should execute");

    assert_eq!(output.status.code(), Some(EXIT_RUNTIME_FAILURE));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY are required"));
}

#[test]
fn schema_stdout_is_a_json_document() {
    let temp = unique_temp_dir("evalgate-exit-schema");
    let output = run_evalgate(&temp, &["schema"]);

    assert_eq!(output.status.code(), Some(EXIT_SUCCESS));
    let stdout = String::from_utf8(output.stdout).expect("schema stdout should be utf-8");
    let schema: serde_json::Value =
        serde_json::from_str(&stdout).expect("schema stdout should be json");
    assert!(schema["properties"]["overall_pass"].is_object());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("evalgate: starting `schema`"));
}

#[test]
fn schema_output_file_keeps_progress_on_stdout() {
    let temp = unique_temp_dir("evalgate-exit-schema-file");
    let target = temp.join("out").join("report.schema.json");
    let output = run_evalgate(
        &temp,
        &[
            "schema",
            "--output",
            target.to_str().expect("temp path should be utf-8"),
        ],
    );

    assert_eq!(output.status.code(), Some(EXIT_SUCCESS));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("evalgate: completed `schema` (exit_code=0)"));
    let raw = std::fs::read_to_string(&target).expect("schema file should be readable");
    let schema: serde_json::Value = serde_json::from_str(&raw).expect("schema file should be json");
    assert!(schema["properties"]["gates"].is_object());
}
