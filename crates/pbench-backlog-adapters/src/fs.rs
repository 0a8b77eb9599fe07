// SPDX-License-Identifier: Apache-2.0

use std::ffi::OsString;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use crate::{AdapterError, FsWrite};

fn io_error(op: &'static str, path: &Path, err: &std::io::Error) -> AdapterError {
    AdapterError::Io {
        op,
        path: path.to_path_buf(),
        detail: err.to_string(),
    }
}

/// Writes `bytes` to a hidden sibling of `path` and renames it into place.
pub fn write_atomic_file(path: &Path, bytes: &[u8]) -> Result<(), AdapterError> {
    let Some(file_name) = path.file_name() else {
        return Err(AdapterError::PathViolation {
            path: path.to_path_buf(),
            detail: "target has no file name".to_string(),
        });
    };
    if path.is_dir() {
        return Err(AdapterError::PathViolation {
            path: path.to_path_buf(),
            detail: "target is a directory".to_string(),
        });
    }
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|err| io_error("create_dir_all", parent, &err))?;

    let mut tmp_name = OsString::from(".");
    tmp_name.push(file_name);
    tmp_name.push(format!(".tmp.{}", std::process::id()));
    let tmp = parent.join(tmp_name);
    if let Err(err) = write_and_sync(&tmp, bytes) {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }
    if let Err(err) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(io_error("rename", path, &err));
    }
    if let Ok(dir) = fs::File::open(parent) {
        let _ = dir.sync_all();
    }
    Ok(())
}

fn write_and_sync(path: &Path, bytes: &[u8]) -> Result<(), AdapterError> {
    let mut f = fs::File::create(path).map_err(|err| io_error("create", path, &err))?;
    f.write_all(bytes).map_err(|err| io_error("write", path, &err))?;
    f.sync_all().map_err(|err| io_error("sync", path, &err))
}

#[derive(Debug, Default)]
pub struct RealFs;

impl FsWrite for RealFs {
    fn write_text(&self, path: &Path, content: &str) -> Result<PathBuf, AdapterError> {
        write_atomic_file(path, content.as_bytes())?;
        Ok(path.to_path_buf())
    }
}

#[derive(Debug, Default)]
pub struct DeniedFsWrite;

impl FsWrite for DeniedFsWrite {
    fn write_text(&self, path: &Path, _content: &str) -> Result<PathBuf, AdapterError> {
        Err(AdapterError::EffectDenied {
            effect: "fs_write",
            detail: format!("attempted to write `{}`", path.display()),
        })
    }
}
