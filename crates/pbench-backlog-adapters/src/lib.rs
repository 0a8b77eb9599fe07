// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! Effect boundary for the backlog pipeline.
//!
//! `pbench-backlog-core` only talks to the outside world through the
//! [`ProcessRunner`] and [`FsWrite`] ports defined here. The real adapters
//! live in [`process`] and [`fs`]; the denied variants let tests prove that a
//! code path never reaches an effect.

use std::fmt;
use std::path::{Path, PathBuf};

mod fs;
mod process;

pub use fs::{write_atomic_file, DeniedFsWrite, RealFs};
pub use process::{DeniedProcessRunner, RealProcessRunner, SubprocessPolicy};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    EffectDenied {
        effect: &'static str,
        detail: String,
    },
    PathViolation {
        path: PathBuf,
        detail: String,
    },
    Io {
        op: &'static str,
        path: PathBuf,
        detail: String,
    },
    Process {
        program: String,
        detail: String,
    },
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EffectDenied { effect, detail } => {
                write!(f, "effect denied: {effect} ({detail})")
            }
            Self::PathViolation { path, detail } => {
                write!(f, "path violation: {} ({detail})", path.display())
            }
            Self::Io { op, path, detail } => {
                write!(f, "io error: {op} {} ({detail})", path.display())
            }
            Self::Process { program, detail } => write!(f, "process error: {program} ({detail})"),
        }
    }
}

impl std::error::Error for AdapterError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandCapture {
    pub program: String,
    pub args: Vec<String>,
    pub status: i32,
    pub stdout: Vec<u8>,
    pub stderr: String,
}

impl CommandCapture {
    #[must_use]
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

pub trait ProcessRunner {
    fn run_captured(&self, program: &str, args: &[String]) -> Result<CommandCapture, AdapterError>;
}

pub trait FsWrite {
    /// Replaces the whole content of `path`; readers never observe a partial write.
    fn write_text(&self, path: &Path, content: &str) -> Result<PathBuf, AdapterError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterEvent {
    pub adapter: &'static str,
    pub operation: &'static str,
    pub detail: String,
}

pub trait EventLogger {
    fn log(&self, event: AdapterEvent);
}

#[derive(Debug, Default)]
pub struct NoopLogger;

impl EventLogger for NoopLogger {
    fn log(&self, _event: AdapterEvent) {}
}

/// Forwards adapter events to the process-wide `tracing` subscriber.
#[derive(Debug, Default)]
pub struct TracingEventLogger;

impl EventLogger for TracingEventLogger {
    fn log(&self, event: AdapterEvent) {
        tracing::debug!(
            adapter = event.adapter,
            operation = event.operation,
            "{}",
            event.detail
        );
    }
}
