// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod config;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use pbench_backlog_adapters::{RealFs, RealProcessRunner, TracingEventLogger};
use pbench_backlog_core::{
    pick_failures, BacklogError, InspectCommand, PickRequest, UperfPolicy, DEFAULT_BACKLOG_FILE,
};
use pbench_backlog_model::ReportId;
use tracing::{error, info};

use crate::config::{LogFormat, RuntimeConfig};

#[derive(Parser, Debug)]
#[command(name = "pbench-backlog", version)]
#[command(about = "Pick up the failure cases from a benchmark report")]
#[command(
    after_help = "Environment:\n  PBENCH_INSPECT_BIN  Inspection tool to run (default: picli)\n  PBENCH_LOG_JSON     Emit JSON log lines when true\n  RUST_LOG            Log filter (default: debug)"
)]
struct Cli {
    /// The benchmark report ID generated by perf-insight.
    #[arg(long)]
    report_id: String,
    /// The backlog file to store the failure cases.
    #[arg(long, default_value = DEFAULT_BACKLOG_FILE)]
    backlog_file: PathBuf,
    /// Inspection tool queried for the report statistics.
    #[arg(long)]
    inspect_bin: Option<String>,
    /// Write an empty entry for uperf failures instead of failing.
    #[arg(long, default_value_t = false)]
    allow_uperf_placeholder: bool,
    /// Log line format on stderr (default: text, json when PBENCH_LOG_JSON is true).
    #[arg(long, value_enum)]
    log_format: Option<LogFormatArg>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Text => Self::Text,
            LogFormatArg::Json => Self::Json,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = RuntimeConfig::from_env(cli.inspect_bin.clone(), cli.log_format.map(Into::into));
    logging::init_tracing(config.log_format);

    match run(cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(code = err.code(), "{err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(cli: Cli, config: &RuntimeConfig) -> Result<(), BacklogError> {
    let report_id = ReportId::parse(&cli.report_id).map_err(BacklogError::InvalidReportId)?;
    let request = PickRequest {
        report_id,
        backlog_file: cli.backlog_file,
        inspect: InspectCommand::new(config.inspect_program.clone()),
        uperf_policy: if cli.allow_uperf_placeholder {
            UperfPolicy::Placeholder
        } else {
            UperfPolicy::Reject
        },
    };

    let logger = TracingEventLogger;
    let runner = RealProcessRunner::new(config.subprocess_policy(), &logger);
    let summary = pick_failures(&runner, &RealFs, &request)?;
    info!(
        report_id = %request.report_id,
        total = summary.total_cases,
        failed = summary.failed_cases,
        placeholders = summary.placeholders,
        path = %summary.backlog_file.display(),
        "backlog updated"
    );
    Ok(())
}
