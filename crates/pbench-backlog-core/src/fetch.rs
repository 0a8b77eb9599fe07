// SPDX-License-Identifier: Apache-2.0

use pbench_backlog_adapters::ProcessRunner;
use pbench_backlog_model::{BenchmarkReport, ReportId, Statistics};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{BacklogError, Result};

pub const DEFAULT_INSPECT_PROGRAM: &str = "picli";

const STDERR_TAIL_LINES: usize = 10;

/// How to reach the report inspection tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectCommand {
    pub program: String,
}

impl Default for InspectCommand {
    fn default() -> Self {
        Self {
            program: DEFAULT_INSPECT_PROGRAM.to_string(),
        }
    }
}

impl InspectCommand {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    #[must_use]
    pub fn args(&self, report_id: &ReportId) -> Vec<String> {
        [
            "--output-format",
            "json",
            "benchmark-inspect",
            "--get-statistics",
            "true",
            "--report-id",
            report_id.as_str(),
        ]
        .into_iter()
        .map(str::to_string)
        .collect()
    }
}

pub fn fetch_report(
    runner: &dyn ProcessRunner,
    command: &InspectCommand,
    report_id: &ReportId,
) -> Result<BenchmarkReport> {
    info!(report_id = %report_id, "getting the statistics from the benchmark report");
    let args = command.args(report_id);
    let capture = runner
        .run_captured(&command.program, &args)
        .map_err(|source| BacklogError::ProcessSpawn {
            program: command.program.clone(),
            source,
        })?;
    debug!(
        program = %capture.program,
        status = capture.status,
        stdout_bytes = capture.stdout.len(),
        "inspection finished"
    );
    if !capture.success() {
        return Err(BacklogError::InspectionFailed {
            program: capture.program,
            status: capture.status,
            stderr: stderr_tail(&capture.stderr),
        });
    }
    parse_report(&command.program, &capture.stdout)
}

pub fn parse_report(program: &str, stdout: &[u8]) -> Result<BenchmarkReport> {
    let text = std::str::from_utf8(stdout).map_err(|_| BacklogError::MalformedOutput {
        program: program.to_string(),
        detail: "is not valid UTF-8",
    })?;
    if text.trim().is_empty() {
        return Err(BacklogError::MalformedOutput {
            program: program.to_string(),
            detail: "is empty",
        });
    }
    let decode = |source| BacklogError::Decode {
        program: program.to_string(),
        source,
    };
    // The report must be a JSON object; a top-level array is not a report.
    let fields: Map<String, Value> = serde_json::from_str(text).map_err(decode)?;
    serde_json::from_value(Value::Object(fields)).map_err(decode)
}

pub fn require_statistics<'r>(
    report: &'r BenchmarkReport,
    report_id: &ReportId,
) -> Result<&'r Statistics> {
    report
        .statistics
        .as_ref()
        .ok_or_else(|| BacklogError::MissingStatistics {
            report_id: report_id.clone(),
        })
}

fn stderr_tail(stderr: &str) -> String {
    let lines = stderr
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}
