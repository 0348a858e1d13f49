//! Serializable views of reports and fix results.
//!
//! These mirror the JSON shapes a host surface (HTTP handler, CLI) hands to
//! its callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::report::{ErrorReport, FixResult};

/// Response to an analyze request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisView {
    pub category: String,
    pub subcategory: Option<String>,
    pub file_path: Option<String>,
    pub line_number: Option<u32>,
    pub suggested_fix: Option<String>,
    pub auto_fixable: bool,
}

impl From<&ErrorReport> for AnalysisView {
    fn from(report: &ErrorReport) -> Self {
        Self {
            category: report.category().to_string(),
            subcategory: report.subcategory().map(str::to_string),
            file_path: report.file_path().map(str::to_string),
            line_number: report.line_number(),
            suggested_fix: report.suggested_fix().map(str::to_string),
            auto_fixable: report.auto_fixable(),
        }
    }
}

/// Response to a fix request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixView {
    pub success: bool,
    pub action_taken: String,
    pub output: Option<String>,
    pub error: Option<String>,
}

impl From<&FixResult> for FixView {
    fn from(result: &FixResult) -> Self {
        Self {
            success: result.success,
            action_taken: result.action_taken.clone(),
            output: result.output.clone(),
            error: result.error.clone(),
        }
    }
}

/// One history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntryView {
    pub category: String,
    pub subcategory: Option<String>,
    pub suggested_fix: Option<String>,
    pub auto_fixable: bool,
    pub timestamp: DateTime<Utc>,
}

impl From<&ErrorReport> for HistoryEntryView {
    fn from(report: &ErrorReport) -> Self {
        Self {
            category: report.category().to_string(),
            subcategory: report.subcategory().map(str::to_string),
            suggested_fix: report.suggested_fix().map(str::to_string),
            auto_fixable: report.auto_fixable(),
            timestamp: report.timestamp(),
        }
    }
}

/// Response to a history query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryView {
    pub errors: Vec<HistoryEntryView>,
    pub count: usize,
}

impl HistoryView {
    pub fn from_reports(reports: &[ErrorReport]) -> Self {
        let errors: Vec<_> = reports.iter().map(HistoryEntryView::from).collect();
        Self {
            count: errors.len(),
            errors,
        }
    }
}

/// Status line for one registered agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStatusView {
    pub name: String,
    pub category: String,
    pub status: String,
}
