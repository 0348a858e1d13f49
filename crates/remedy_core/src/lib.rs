//! # remedy_core
//!
//! Classification side of remedy: the error data model, the static pattern
//! catalog, the classifier, the bounded history and configuration.
//!
//! # Architecture
//!
//! - **Catalog**: ordered category patterns and subcategory rules
//! - **Classifier**: raw text → category, subcategory, source location
//! - **History**: ring of past reports, safe to share between threads
//! - **Config**: TOML/YAML settings with environment overrides
//!
//! # Example
//!
//! ```rust
//! use remedy_core::{Classifier, ErrorCategory};
//!
//! let classifier = Classifier::builtin().unwrap();
//! let report = classifier.classify("ModuleNotFoundError: No module named 'requests'");
//! assert_eq!(report.category(), ErrorCategory::Dependency);
//! assert_eq!(report.subcategory(), Some("missing_module"));
//! ```

pub mod api;
pub mod catalog;
pub mod classifier;
pub mod config;
pub mod error;
pub mod history;
pub mod platform;
pub mod report;

pub use api::{AgentStatusView, AnalysisView, FixView, HistoryEntryView, HistoryView};
pub use catalog::{CategoryRules, PatternCatalog, SubcategoryRule, TextMatch, CATALOG_VERSION};
pub use classifier::Classifier;
pub use config::{
    ClassifierSettings, ExtraPattern, FixSettings, HistorySettings, RemedyConfig, RunnerSettings,
};
pub use error::{CoreError, CoreResult};
pub use history::{History, DEFAULT_HISTORY_CAPACITY, DEFAULT_HISTORY_LIMIT};
pub use platform::{HostInfo, HostPlatform};
pub use report::{
    ErrorCategory, ErrorReport, FixResult, SourceLocation, ACTION_DIAGNOSTIC, ACTION_NONE,
};
