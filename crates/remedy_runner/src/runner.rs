//! Command runner trait and outcome type.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Output reported when a command exceeds its time budget.
pub const TIMEOUT_MESSAGE: &str = "Command timed out";

/// Result of running a host command.
///
/// `output` holds stdout when the command succeeded and stderr (or a
/// description of the failure) when it did not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutcome {
    /// Whether the command exited with status 0
    pub success: bool,
    /// Captured stdout on success, stderr or failure description otherwise
    pub output: String,
    /// When the command finished
    pub finished_at: DateTime<Utc>,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
}

impl CommandOutcome {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            finished_at: Utc::now(),
            duration_ms: 0,
        }
    }

    pub fn failure(output: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
            finished_at: Utc::now(),
            duration_ms: 0,
        }
    }

    pub fn with_duration(mut self, ms: u64) -> Self {
        self.duration_ms = ms;
        self
    }

    /// The captured output with surrounding whitespace removed.
    pub fn trimmed(&self) -> &str {
        self.output.trim()
    }
}

/// Executes host commands.
///
/// Implementations must not panic and must not return errors: every failure
/// mode is folded into a failed [`CommandOutcome`].
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a shell command line and capture its outcome.
    async fn run(&self, command: &str) -> CommandOutcome;
}
