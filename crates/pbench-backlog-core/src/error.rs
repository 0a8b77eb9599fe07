// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::path::PathBuf;

use pbench_backlog_adapters::AdapterError;
use pbench_backlog_model::{ModelError, ReportId, TestCaseSchema};

pub type Result<T> = std::result::Result<T, BacklogError>;

/// Exit status for every pipeline failure.
pub const FAILURE_EXIT_CODE: u8 = 1;

#[derive(Debug)]
#[non_exhaustive]
pub enum BacklogError {
    InvalidReportId(ModelError),
    ProcessSpawn {
        program: String,
        source: AdapterError,
    },
    InspectionFailed {
        program: String,
        status: i32,
        stderr: String,
    },
    MalformedOutput {
        program: String,
        detail: &'static str,
    },
    Decode {
        program: String,
        source: serde_json::Error,
    },
    MissingStatistics {
        report_id: ReportId,
    },
    UnrecognizedSchema {
        case_id: String,
    },
    UnimplementedSchema {
        case_id: String,
        schema: TestCaseSchema,
    },
    UnsupportedParameter(ModelError),
    Serialize(toml::ser::Error),
    Write {
        path: PathBuf,
        source: AdapterError,
    },
}

impl BacklogError {
    /// Stable identifier attached to the failure log line.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidReportId(_) => "invalid_report_id",
            Self::ProcessSpawn { .. } => "process_spawn",
            Self::InspectionFailed { .. } => "inspection_failed",
            Self::MalformedOutput { .. } => "malformed_output",
            Self::Decode { .. } => "json_decode",
            Self::MissingStatistics { .. } => "missing_statistics",
            Self::UnrecognizedSchema { .. } => "unrecognized_schema",
            Self::UnimplementedSchema { .. } => "unimplemented_schema",
            Self::UnsupportedParameter(_) => "unsupported_parameter",
            Self::Serialize(_) => "serialize",
            Self::Write { .. } => "write",
        }
    }

    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        FAILURE_EXIT_CODE
    }
}

impl fmt::Display for BacklogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidReportId(err) => write!(f, "{err}"),
            Self::ProcessSpawn { program, source } => write!(
                f,
                "failed to inspect the specified benchmark report: cannot run `{program}`: {source}"
            ),
            Self::InspectionFailed {
                program,
                status,
                stderr,
            } => {
                write!(
                    f,
                    "failed to inspect the specified benchmark report: `{program}` exited with status {status}"
                )?;
                if !stderr.is_empty() {
                    write!(f, ": {stderr}")?;
                }
                Ok(())
            }
            Self::MalformedOutput { program, detail } => write!(
                f,
                "failed to inspect the specified benchmark report: `{program}` output {detail}"
            ),
            Self::Decode { program, source } => write!(
                f,
                "failed to inspect the specified benchmark report: `{program}` output is not a valid report: {source}"
            ),
            Self::MissingStatistics { report_id } => write!(
                f,
                "benchmark report {report_id} does not enable the statistics function"
            ),
            Self::UnrecognizedSchema { case_id } => {
                write!(f, "unrecognized test run type for case {case_id}")
            }
            Self::UnimplementedSchema { case_id, schema } => write!(
                f,
                "parameter restoring for {schema} test runs is not implemented (case {case_id})"
            ),
            Self::UnsupportedParameter(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "failed to render the backlog: {err}"),
            Self::Write { path, source } => write!(
                f,
                "failed to write to the backlog file {}: {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for BacklogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidReportId(err) | Self::UnsupportedParameter(err) => Some(err),
            Self::ProcessSpawn { source, .. } | Self::Write { source, .. } => Some(source),
            Self::Decode { source, .. } => Some(source),
            Self::Serialize(err) => Some(err),
            _ => None,
        }
    }
}

impl From<toml::ser::Error> for BacklogError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialize(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_failure_maps_to_exit_one() {
        let errors = [
            BacklogError::MissingStatistics {
                report_id: ReportId::parse("r1").expect("id"),
            },
            BacklogError::UnrecognizedSchema {
                case_id: "c1".to_string(),
            },
            BacklogError::MalformedOutput {
                program: "picli".to_string(),
                detail: "is empty",
            },
        ];
        for err in &errors {
            assert_eq!(err.exit_code(), 1, "{err}");
        }
    }

    #[test]
    fn inspection_failure_message_includes_stderr_when_present() {
        let err = BacklogError::InspectionFailed {
            program: "picli".to_string(),
            status: 2,
            stderr: "report not found".to_string(),
        };
        assert_eq!(err.code(), "inspection_failed");
        assert!(err.to_string().ends_with("exited with status 2: report not found"));
    }
}
