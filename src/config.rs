use std::path::PathBuf;

use anyhow::{Context, Result as AnyResult, anyhow};
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::error_log::ErrorLogStore;
use crate::selector::DEFAULT_MONTH;

#[derive(Parser, Clone, Debug)]
#[command(name = "kpi-dashboard")]
#[command(about = "Monthly KPI sales dashboard for the terminal", long_about = None)]
pub struct CliParams {
    /// Sales CSV to load; its last row is treated as a totals footer
    #[clap(
        short = 'd',
        long = "data",
        env = "KPI_DATA_PATH",
        default_value = "data/sales_data.csv"
    )]
    pub data: PathBuf,

    /// Month selected on startup
    #[clap(
        short = 'm',
        long = "month",
        default_value = DEFAULT_MONTH,
        value_parser = parse_month
    )]
    pub month: String,

    /// Print the dashboard for the selected month as JSON instead of opening the TUI
    #[clap(long = "snapshot")]
    pub snapshot: bool,

    /// Directory for the rolling diagnostic log
    #[clap(long = "log-dir", env = "KPI_LOG_DIR", default_value = "logs")]
    pub log_dir: PathBuf,

    /// JSONL journal of errors surfaced on the status line
    #[clap(long = "error-log", value_name = "PATH")]
    pub error_log: Option<PathBuf>,
}

impl CliParams {
    pub fn error_log_store(&self) -> ErrorLogStore {
        ErrorLogStore::new(
            self.error_log
                .clone()
                .unwrap_or_else(ErrorLogStore::default_path),
        )
    }

    /// Routes `tracing` output to a daily file so the terminal stays clean.
    pub fn init_logging(&self) -> AnyResult<WorkerGuard> {
        std::fs::create_dir_all(&self.log_dir)
            .with_context(|| format!("cannot create log dir {}", self.log_dir.display()))?;
        let file_appender = tracing_appender::rolling::daily(&self.log_dir, "kpi-dashboard.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .json()
            .with_writer(non_blocking)
            .try_init()
            .map_err(|err| anyhow!("failed to install log subscriber: {err}"))?;
        Ok(guard)
    }
}

fn parse_month(input: &str) -> Result<String, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("month label cannot be empty (examples: JAN, MAR)".to_string());
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_bundled_dataset() {
        let params = CliParams::try_parse_from(["kpi-dashboard"]).expect("defaults parse");
        assert_eq!(params.data, PathBuf::from("data/sales_data.csv"));
        assert_eq!(params.month, "MAR");
        assert!(!params.snapshot);
    }

    #[test]
    fn month_is_trimmed_and_must_not_be_blank() {
        let params = CliParams::try_parse_from(["kpi-dashboard", "--month", " FEB "])
            .expect("month parses");
        assert_eq!(params.month, "FEB");
        assert!(CliParams::try_parse_from(["kpi-dashboard", "--month", "  "]).is_err());
    }

    #[test]
    fn snapshot_flag_and_paths() {
        let params = CliParams::try_parse_from([
            "kpi-dashboard",
            "--snapshot",
            "--data",
            "other.csv",
            "--error-log",
            "tmp/errors.jsonl",
        ])
        .expect("flags parse");
        assert!(params.snapshot);
        assert_eq!(params.data, PathBuf::from("other.csv"));
        assert_eq!(params.error_log, Some(PathBuf::from("tmp/errors.jsonl")));
    }
}
