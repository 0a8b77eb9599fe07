// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeSet;
use std::fmt;
use std::process::Command;

use crate::{AdapterError, AdapterEvent, CommandCapture, EventLogger, ProcessRunner};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubprocessPolicy {
    allowed_programs: BTreeSet<String>,
}

impl SubprocessPolicy {
    /// Only the stock perf-insight client.
    pub fn strict_default() -> Self {
        Self::allowing(["picli"])
    }

    /// Adds an operator-chosen program on top of the current allowlist.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.allowed_programs.insert(program.into());
        self
    }

    pub fn allowing<I, S>(programs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_programs: programs.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allows(&self, program: &str) -> bool {
        self.allowed_programs.contains(program)
    }
}

pub struct RealProcessRunner<'a> {
    policy: SubprocessPolicy,
    logger: &'a dyn EventLogger,
}

impl<'a> RealProcessRunner<'a> {
    pub fn new(policy: SubprocessPolicy, logger: &'a dyn EventLogger) -> Self {
        Self { policy, logger }
    }
}

impl fmt::Debug for RealProcessRunner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RealProcessRunner")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl ProcessRunner for RealProcessRunner<'_> {
    fn run_captured(&self, program: &str, args: &[String]) -> Result<CommandCapture, AdapterError> {
        if !self.policy.allows(program) {
            self.logger.log(AdapterEvent {
                adapter: "process",
                operation: "deny",
                detail: format!("program `{program}` is not in subprocess allowlist"),
            });
            return Err(AdapterError::EffectDenied {
                effect: "subprocess",
                detail: format!("program `{program}` is not in subprocess allowlist"),
            });
        }
        self.logger.log(AdapterEvent {
            adapter: "process",
            operation: "spawn",
            detail: format!("{program} {}", args.join(" ")),
        });
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|err| AdapterError::Process {
                program: program.to_string(),
                detail: err.to_string(),
            })?;
        // Killed by a signal: no exit code, treat as failure.
        let status = output.status.code().unwrap_or(-1);
        self.logger.log(AdapterEvent {
            adapter: "process",
            operation: "exit",
            detail: format!("{program} exited with {status}"),
        });
        Ok(CommandCapture {
            program: program.to_string(),
            args: args.to_vec(),
            status,
            stdout: output.stdout,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[derive(Debug, Default)]
pub struct DeniedProcessRunner;

impl ProcessRunner for DeniedProcessRunner {
    fn run_captured(&self, program: &str, _args: &[String]) -> Result<CommandCapture, AdapterError> {
        Err(AdapterError::EffectDenied {
            effect: "subprocess",
            detail: format!("attempted to execute `{program}`"),
        })
    }
}
