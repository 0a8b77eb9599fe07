// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use pbench_backlog_adapters::FsWrite;
use pbench_backlog_model::Backlog;
use tracing::info;

use crate::error::{BacklogError, Result};

pub const DEFAULT_BACKLOG_FILE: &str = "backlog.toml";

pub fn render_backlog(backlog: &Backlog) -> Result<String> {
    Ok(toml::to_string(backlog)?)
}

/// Renders first, so a serialization failure never touches `path`.
pub fn write_backlog(fs: &dyn FsWrite, path: &Path, backlog: &Backlog) -> Result<PathBuf> {
    info!(path = %path.display(), "writing to the backlog file");
    let text = render_backlog(backlog)?;
    let written = fs
        .write_text(path, &text)
        .map_err(|source| BacklogError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    info!(
        path = %written.display(),
        cases = backlog.len(),
        "wrote {} failure case(s) to file",
        backlog.len()
    );
    Ok(written)
}
