//! Host shell runner.
//!
//! Runs command lines through the platform shell with a fixed timeout.
//! A command that runs past its deadline is killed when its future is
//! dropped, so no child outlives the call.

use std::process::Output;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::{RunnerError, RunnerResult};
use crate::runner::{CommandOutcome, CommandRunner, TIMEOUT_MESSAGE};

/// Default wall-clock budget for a single remediation command.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(120);

/// Shell runner options.
#[derive(Debug, Clone)]
pub struct ShellRunnerOptions {
    /// Maximum time a command may run before it is killed
    pub timeout: Duration,
    /// Log commands instead of executing them
    pub dry_run: bool,
}

impl Default for ShellRunnerOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_COMMAND_TIMEOUT,
            dry_run: false,
        }
    }
}

impl ShellRunnerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout_secs(mut self, seconds: u64) -> Self {
        self.timeout = Duration::from_secs(seconds);
        self
    }

    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }
}

/// Runs commands through `sh -c` (or `cmd /C` on Windows).
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    options: ShellRunnerOptions,
}

impl ShellRunner {
    pub fn new(options: ShellRunnerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ShellRunnerOptions {
        &self.options
    }

    /// Check if dry-run mode is enabled.
    pub fn is_dry_run(&self) -> bool {
        self.options.dry_run
    }

    fn shell_command(command: &str) -> Command {
        let mut cmd = if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C");
            cmd
        } else {
            let mut cmd = Command::new("sh");
            cmd.arg("-c");
            cmd
        };
        cmd.arg(command);
        cmd.kill_on_drop(true);
        cmd
    }

    /// Run a command and return its raw process output.
    ///
    /// Unlike [`CommandRunner::run`], spawn failures and timeouts are
    /// reported as errors.
    pub async fn try_run(&self, command: &str) -> RunnerResult<Output> {
        let mut cmd = Self::shell_command(command);
        debug!("Executing: {}", command);

        match tokio::time::timeout(self.options.timeout, cmd.output()).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(source)) => Err(RunnerError::Spawn {
                command: command.to_string(),
                source,
            }),
            Err(_elapsed) => Err(RunnerError::Timeout(self.options.timeout.as_secs())),
        }
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command: &str) -> CommandOutcome {
        if self.options.dry_run {
            info!("[dry-run] {}", command);
            return CommandOutcome::success(format!("[dry-run] {}", command));
        }

        let started = Instant::now();
        let outcome = match self.try_run(command).await {
            Ok(output) if output.status.success() => {
                CommandOutcome::success(String::from_utf8_lossy(&output.stdout))
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
                if stderr.trim().is_empty() {
                    CommandOutcome::failure(format!("Command exited with {}", output.status))
                } else {
                    CommandOutcome::failure(stderr)
                }
            }
            Err(RunnerError::Timeout(secs)) => {
                warn!("Command timed out after {}s: {}", secs, command);
                CommandOutcome::failure(TIMEOUT_MESSAGE)
            }
            Err(e) => {
                warn!("{}", e);
                CommandOutcome::failure(e.to_string())
            }
        };

        let outcome = outcome.with_duration(started.elapsed().as_millis() as u64);
        info!(
            success = outcome.success,
            duration_ms = outcome.duration_ms,
            "Ran command: {}",
            command
        );
        outcome
    }
}
