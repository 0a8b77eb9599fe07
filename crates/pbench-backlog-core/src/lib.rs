// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! Picks failed cases out of a benchmark report and records their
//! reproduction parameters in a backlog file.
//!
//! The stages run strictly in order and stop at the first error:
//! [`fetch_report`], [`require_statistics`], [`filter_failures`],
//! [`restore_parameters`], [`write_backlog`]. Nothing is written unless every
//! earlier stage succeeded.

use std::path::PathBuf;

use pbench_backlog_adapters::{FsWrite, ProcessRunner};
use pbench_backlog_model::{Backlog, ReportId};

mod error;
mod fetch;
mod filter;
mod restore;
mod writer;

pub use error::{BacklogError, Result, FAILURE_EXIT_CODE};
pub use fetch::{
    fetch_report, parse_report, require_statistics, InspectCommand, DEFAULT_INSPECT_PROGRAM,
};
pub use filter::filter_failures;
pub use restore::{restore_case, restore_parameters, UperfPolicy};
pub use writer::{render_backlog, write_backlog, DEFAULT_BACKLOG_FILE};

#[derive(Debug, Clone)]
pub struct PickRequest {
    pub report_id: ReportId,
    pub backlog_file: PathBuf,
    pub inspect: InspectCommand,
    pub uperf_policy: UperfPolicy,
}

impl PickRequest {
    #[must_use]
    pub fn new(report_id: ReportId) -> Self {
        Self {
            report_id,
            backlog_file: PathBuf::from(DEFAULT_BACKLOG_FILE),
            inspect: InspectCommand::default(),
            uperf_policy: UperfPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickSummary {
    pub total_cases: usize,
    pub failed_cases: usize,
    pub placeholders: usize,
    pub backlog_file: PathBuf,
}

pub fn pick_failures(
    runner: &dyn ProcessRunner,
    fs: &dyn FsWrite,
    request: &PickRequest,
) -> Result<PickSummary> {
    let report = fetch_report(runner, &request.inspect, &request.report_id)?;
    let statistics = require_statistics(&report, &request.report_id)?;
    let records = statistics.records();

    let failed = filter_failures(records);
    let restored = restore_parameters(&failed, request.uperf_policy)?;
    let placeholders = restored.iter().filter(|case| case.is_placeholder()).count();

    let backlog = Backlog::new(restored);
    let backlog_file = write_backlog(fs, &request.backlog_file, &backlog)?;

    Ok(PickSummary {
        total_cases: records.len(),
        failed_cases: failed.len(),
        placeholders,
        backlog_file,
    })
}
