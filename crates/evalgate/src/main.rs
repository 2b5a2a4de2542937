#![forbid(unsafe_code)]

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;
use clap::error::ErrorKind;
use evalgate::cli::app::{Cli, Command, RuntimeArgs};
use evalgate::cli::commands;
use evalgate::config::RuntimePaths;
use evalgate::models::IngestConfigError;
use tracing_subscriber::EnvFilter;

const EXIT_SUCCESS: i32 = 0;
const EXIT_RUNTIME_FAILURE: i32 = 1;
const EXIT_GATE_FAILURE: i32 = 2;
const EXIT_USAGE_ERROR: i32 = 64;

fn main() {
    init_tracing();
    std::process::exit(run());
}

fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => return exit_code_for_parse_error(error),
    };
    let banner = Banner::for_command(&cli.command);
    banner.print(format_args!("evalgate: starting `{}`", banner.command));

    match execute(cli) {
        Ok(()) => {
            banner.print(format_args!(
                "evalgate: completed `{}` (exit_code={EXIT_SUCCESS})",
                banner.command
            ));
            EXIT_SUCCESS
        }
        Err(error) => {
            let exit_code = exit_code_for_error(&error);
            eprintln!("evalgate: failed `{}` (exit_code={exit_code})", banner.command);
            eprintln!("{error:#}");
            exit_code
        }
    }
}

/// Start/finish lines for one invocation. They move to stderr when the
/// command's stdout is a machine-readable document.
struct Banner {
    command: &'static str,
    to_stderr: bool,
}

impl Banner {
    fn for_command(command: &Command) -> Self {
        let (name, document_on_stdout) = match command {
            Command::Report(_) => ("report", false),
            Command::IngestSql(_) => ("ingest-sql", false),
            Command::Export(_) => ("export", false),
            Command::Schema(args) => ("schema", args.output.is_none()),
        };
        Self {
            command: name,
            to_stderr: document_on_stdout,
        }
    }

    fn print(&self, line: std::fmt::Arguments<'_>) {
        if self.to_stderr {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }
}

fn execute(cli: Cli) -> Result<()> {
    let runtime_paths = resolve_runtime_paths(&cli.runtime)?;
    match cli.command {
        Command::Report(args) => commands::report::run(&args, &runtime_paths),
        Command::IngestSql(args) => commands::ingest_sql::run(&args, &runtime_paths),
        Command::Export(args) => commands::export::run(&args, &runtime_paths),
        Command::Schema(args) => commands::schema::run(&args, &runtime_paths),
    }
}

fn exit_code_for_error(error: &anyhow::Error) -> i32 {
    let gates_failed = error.downcast_ref::<commands::GateFailure>().is_some();
    let export_empty = error
        .downcast_ref::<commands::export::EmptyExportFailure>()
        .is_some();

    if gates_failed || export_empty {
        EXIT_GATE_FAILURE
    } else if error.downcast_ref::<IngestConfigError>().is_some() {
        EXIT_USAGE_ERROR
    } else {
        EXIT_RUNTIME_FAILURE
    }
}

fn exit_code_for_parse_error(error: clap::Error) -> i32 {
    let _ = error.print();
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EXIT_SUCCESS,
        _ => EXIT_USAGE_ERROR,
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_runtime_paths(args: &RuntimeArgs) -> Result<RuntimePaths> {
    let home_dir = match &args.home_dir {
        Some(path) => path.clone(),
        None => std::env::var_os("HOME")
            .map(PathBuf::from)
            .ok_or_else(|| anyhow!("HOME is not set; pass --home-dir"))?,
    };
    let cwd = match &args.cwd {
        Some(path) => path.clone(),
        None => std::env::current_dir()?,
    };

    evalgate::config::resolve_runtime_paths(&home_dir, &cwd, args.out_dir.as_deref())
}
