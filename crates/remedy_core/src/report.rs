//! Error reports, categories and fix outcomes.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// Top-level error classification bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// pip, npm, package issues
    Dependency,
    /// Port conflicts, connection errors
    Network,
    /// Code errors, import errors
    Syntax,
    /// GPIO, camera, sensors
    Hardware,
    /// File access, admin rights
    Permission,
    Unknown,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Dependency => "dependency",
            ErrorCategory::Network => "network",
            ErrorCategory::Syntax => "syntax",
            ErrorCategory::Hardware => "hardware",
            ErrorCategory::Permission => "permission",
            ErrorCategory::Unknown => "unknown",
        }
    }

    pub fn all() -> [Self; 6] {
        [
            ErrorCategory::Dependency,
            ErrorCategory::Network,
            ErrorCategory::Syntax,
            ErrorCategory::Hardware,
            ErrorCategory::Permission,
            ErrorCategory::Unknown,
        ]
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, ErrorCategory::Unknown)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::InvalidConfig(format!("unknown error category: {}", s)))
    }
}

/// File and line extracted from an error message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file_path: Option<String>,
    pub line_number: Option<u32>,
}

impl SourceLocation {
    pub fn new(file_path: impl Into<String>, line_number: u32) -> Self {
        Self {
            file_path: Some(file_path.into()),
            line_number: Some(line_number),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.file_path.is_none() && self.line_number.is_none()
    }
}

/// Structured diagnosis of one raw error message.
///
/// A report is built once per analysis and is read-only afterwards; the
/// category in particular is fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    id: Uuid,
    raw_message: String,
    category: ErrorCategory,
    subcategory: Option<String>,
    location: SourceLocation,
    suggested_fix: Option<String>,
    auto_fixable: bool,
    timestamp: DateTime<Utc>,
}

impl ErrorReport {
    pub fn new(raw_message: impl Into<String>, category: ErrorCategory) -> Self {
        Self {
            id: Uuid::new_v4(),
            raw_message: raw_message.into(),
            category,
            subcategory: None,
            location: SourceLocation::default(),
            suggested_fix: None,
            auto_fixable: false,
            timestamp: Utc::now(),
        }
    }

    pub fn with_subcategory(mut self, subcategory: Option<&str>) -> Self {
        self.subcategory = subcategory.map(str::to_string);
        self
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }

    /// Attach an agent's verdict. Consumes the report so the enriched
    /// version replaces the bare diagnosis before anyone else sees it.
    pub fn with_remedy(mut self, suggested_fix: impl Into<String>, auto_fixable: bool) -> Self {
        self.suggested_fix = Some(suggested_fix.into());
        self.auto_fixable = auto_fixable;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn raw_message(&self) -> &str {
        &self.raw_message
    }

    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    pub fn subcategory(&self) -> Option<&str> {
        self.subcategory.as_deref()
    }

    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    pub fn file_path(&self) -> Option<&str> {
        self.location.file_path.as_deref()
    }

    pub fn line_number(&self) -> Option<u32> {
        self.location.line_number
    }

    pub fn suggested_fix(&self) -> Option<&str> {
        self.suggested_fix.as_deref()
    }

    pub fn auto_fixable(&self) -> bool {
        self.auto_fixable
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Action reported when no remediation was attempted.
pub const ACTION_NONE: &str = "none";

/// Action reported by agents that only produce diagnostics.
pub const ACTION_DIAGNOSTIC: &str = "diagnostic";

/// Outcome of an attempted fix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixResult {
    pub success: bool,
    /// Human-readable description of what was done ("none" if nothing)
    pub action_taken: String,
    pub output: Option<String>,
    pub error: Option<String>,
}

impl FixResult {
    /// A fix that ran and succeeded.
    pub fn succeeded(action_taken: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            success: true,
            action_taken: action_taken.into(),
            output: Some(output.into()),
            error: None,
        }
    }

    /// A fix that was attempted and failed.
    pub fn failed(action_taken: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            action_taken: action_taken.into(),
            output: None,
            error: Some(error.into()),
        }
    }

    /// Nothing was attempted.
    pub fn none(error: impl Into<String>) -> Self {
        Self::failed(ACTION_NONE, error)
    }

    /// Attach a payload to the result.
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn was_attempted(&self) -> bool {
        self.action_taken != ACTION_NONE
    }
}
