//! Remediation agent contract.

use async_trait::async_trait;

use remedy_core::{ErrorCategory, ErrorReport, FixResult, HostInfo};

/// A remediation strategy bound to exactly one [`ErrorCategory`].
///
/// `suggest_fix` and `can_auto_fix` are pure inspections of the report.
/// `execute_fix` may touch the host through a command runner, but it never
/// fails: every outcome, including "nothing to do", is a [`FixResult`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemediationAgent: Send + Sync {
    /// Display name, e.g. `DependencyAgent`.
    fn name(&self) -> &'static str;

    /// The category this agent handles.
    fn category(&self) -> ErrorCategory;

    /// Human-readable fix for the report.
    fn suggest_fix(&self, report: &ErrorReport) -> String;

    /// Whether the fix is safe to apply without a human in the loop.
    fn can_auto_fix(&self, report: &ErrorReport) -> bool;

    /// Attempt the fix.
    async fn execute_fix(&self, report: &ErrorReport) -> FixResult;

    /// Host facts, for agents that inspect the host.
    fn system_info(&self) -> Option<HostInfo> {
        None
    }
}

/// Suffix like ` at app.py:12`, ` in app.py`, ` at line 12`, or empty.
pub(crate) fn format_location(report: &ErrorReport) -> String {
    match (report.file_path(), report.line_number()) {
        (Some(path), Some(line)) => format!(" at {}:{}", path, line),
        (Some(path), None) => format!(" in {}", path),
        (None, Some(line)) => format!(" at line {}", line),
        (None, None) => String::new(),
    }
}
