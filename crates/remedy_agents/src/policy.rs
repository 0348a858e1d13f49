//! Fix authorization.
//!
//! Decides, before any agent runs, whether a fix request may execute.

use serde::{Deserialize, Serialize};

use remedy_core::{ErrorCategory, ErrorReport, FixResult};

/// Fix authorization rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixPolicy {
    /// Run `auto_fixable` fixes without explicit approval.
    pub allow_unattended: bool,
}

impl Default for FixPolicy {
    fn default() -> Self {
        Self {
            allow_unattended: true,
        }
    }
}

/// Why a fix request was not executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixRefusal {
    /// The report has category `Unknown`.
    Uncategorized,
    /// No agent registered for the category.
    NoAgent(ErrorCategory),
    /// Not authorized; carries the suggestion for a human to apply.
    ManualRequired(String),
}

impl FixPolicy {
    pub fn new(allow_unattended: bool) -> Self {
        Self { allow_unattended }
    }

    /// Release `agent` for execution, or say why not.
    pub fn authorize<A>(
        &self,
        report: &ErrorReport,
        agent: Option<A>,
        auto_approve: bool,
    ) -> Result<A, FixRefusal> {
        if report.category().is_unknown() {
            return Err(FixRefusal::Uncategorized);
        }
        let agent = agent.ok_or(FixRefusal::NoAgent(report.category()))?;

        let unattended = report.auto_fixable() && self.allow_unattended;
        if unattended || auto_approve {
            Ok(agent)
        } else {
            Err(FixRefusal::ManualRequired(
                report.suggested_fix().unwrap_or_default().to_string(),
            ))
        }
    }
}

impl From<FixRefusal> for FixResult {
    fn from(refusal: FixRefusal) -> Self {
        match refusal {
            FixRefusal::Uncategorized => FixResult::none("Could not categorize error"),
            FixRefusal::NoAgent(category) => {
                FixResult::none(format!("No agent registered for {}", category))
            }
            FixRefusal::ManualRequired(suggestion) => {
                FixResult::none(format!("Manual fix required: {}", suggestion))
            }
        }
    }
}
