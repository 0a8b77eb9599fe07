// SPDX-License-Identifier: Apache-2.0

//! Runtime settings resolved from flags, then environment, then defaults.

use pbench_backlog_adapters::SubprocessPolicy;
use pbench_backlog_core::DEFAULT_INSPECT_PROGRAM;

pub const ENV_INSPECT_BIN: &str = "PBENCH_INSPECT_BIN";
pub const ENV_LOG_JSON: &str = "PBENCH_LOG_JSON";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub inspect_program: String,
    /// Set when a flag or the environment named the inspector explicitly.
    pub inspect_override: Option<String>,
    pub log_format: LogFormat,
}

impl RuntimeConfig {
    pub fn resolve(
        inspect_bin: Option<String>,
        log_format: Option<LogFormat>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let inspect_override =
            inspect_bin.or_else(|| env(ENV_INSPECT_BIN).filter(|v| !v.trim().is_empty()));
        let inspect_program = inspect_override
            .clone()
            .unwrap_or_else(|| DEFAULT_INSPECT_PROGRAM.to_string());
        let log_format = log_format.unwrap_or_else(|| {
            if env_bool(&env, ENV_LOG_JSON, false) {
                LogFormat::Json
            } else {
                LogFormat::Text
            }
        });
        Self {
            inspect_program,
            inspect_override,
            log_format,
        }
    }

    /// The strict allowlist, widened only by an explicit inspector override.
    pub fn subprocess_policy(&self) -> SubprocessPolicy {
        let policy = SubprocessPolicy::strict_default();
        match &self.inspect_override {
            Some(program) => policy.with_program(program.clone()),
            None => policy,
        }
    }

    pub fn from_env(inspect_bin: Option<String>, log_format: Option<LogFormat>) -> Self {
        Self::resolve(inspect_bin, log_format, |name| std::env::var(name).ok())
    }
}

fn env_bool(env: &impl Fn(&str) -> Option<String>, name: &str, default: bool) -> bool {
    env(name)
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}
