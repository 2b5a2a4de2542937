#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod contracts;
pub mod export;
pub mod gates;
pub mod metrics;
pub mod models;
pub mod report;
pub mod sql;
pub mod utils;

pub use cli::app::{Cli, Command};
