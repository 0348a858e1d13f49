//! remedy configuration.
//!
//! Settings come from an optional TOML or YAML file, then environment
//! variables override individual fields.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::PatternCatalog;
use crate::error::{CoreError, CoreResult};
use crate::history::{DEFAULT_HISTORY_CAPACITY, DEFAULT_HISTORY_LIMIT};
use crate::report::ErrorCategory;

/// Overrides `runner.timeout_secs`.
pub const ENV_COMMAND_TIMEOUT: &str = "REMEDY_COMMAND_TIMEOUT";
/// Overrides `runner.dry_run` (`true`/`false`/`1`/`0`).
pub const ENV_DRY_RUN: &str = "REMEDY_DRY_RUN";
/// Overrides `history.default_limit`.
pub const ENV_HISTORY_LIMIT: &str = "REMEDY_HISTORY_LIMIT";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemedyConfig {
    pub runner: RunnerSettings,
    pub history: HistorySettings,
    pub fix: FixSettings,
    pub classifier: ClassifierSettings,
}

/// Command execution settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerSettings {
    /// Wall-clock limit per command, in seconds
    pub timeout_secs: u64,
    /// Log commands instead of running them
    pub dry_run: bool,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 120,
            dry_run: false,
        }
    }
}

/// History retention settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Reports retained before the oldest are evicted
    pub capacity: usize,
    /// Reports returned by a query without an explicit limit
    pub default_limit: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_HISTORY_CAPACITY,
            default_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Fix authorization settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixSettings {
    /// Allow fixes the agents judge safe to run without explicit approval
    pub allow_unattended: bool,
}

impl Default for FixSettings {
    fn default() -> Self {
        Self {
            allow_unattended: true,
        }
    }
}

/// Classifier extensions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    /// Patterns appended after the built-in patterns of their category
    pub extra_patterns: Vec<ExtraPattern>,
}

/// A user-supplied category pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraPattern {
    pub category: ErrorCategory,
    pub pattern: String,
}

impl RemedyConfig {
    /// Load from a `.toml`, `.yaml` or `.yml` file.
    pub fn load(path: &Path) -> CoreResult<Self> {
        debug!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(path)?;

        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&content)?,
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content)?,
            other => {
                return Err(CoreError::UnsupportedFormat(
                    other.unwrap_or("<none>").to_string(),
                ))
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> CoreResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_yaml_str(content: &str) -> CoreResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> CoreResult<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> CoreResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_COMMAND_TIMEOUT) {
            self.runner.timeout_secs = parse_env(ENV_COMMAND_TIMEOUT, &value)?;
        }
        if let Some(value) = lookup(ENV_DRY_RUN) {
            self.runner.dry_run = parse_bool(ENV_DRY_RUN, &value)?;
        }
        if let Some(value) = lookup(ENV_HISTORY_LIMIT) {
            self.history.default_limit = parse_env(ENV_HISTORY_LIMIT, &value)?;
        }
        self.validate()
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.runner.timeout_secs == 0 {
            return Err(CoreError::InvalidConfig(
                "runner.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.history.capacity == 0 {
            return Err(CoreError::InvalidConfig(
                "history.capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Built-in catalog plus configured extra patterns.
    pub fn catalog(&self) -> CoreResult<PatternCatalog> {
        let mut catalog = PatternCatalog::builtin();
        for extra in &self.classifier.extra_patterns {
            catalog.add_pattern(extra.category, extra.pattern.clone())?;
        }
        Ok(catalog)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> CoreResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CoreError::InvalidConfig(format!("{} has invalid value `{}`", key, value)))
}

fn parse_bool(key: &str, value: &str) -> CoreResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(CoreError::InvalidConfig(format!(
            "{} has invalid value `{}`",
            key, value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = RemedyConfig::default();
        assert_eq!(config.runner.timeout_secs, 120);
        assert!(!config.runner.dry_run);
        assert_eq!(config.history.default_limit, 10);
        assert!(config.fix.allow_unattended);
        assert!(config.classifier.extra_patterns.is_empty());
    }

    #[test]
    fn test_load_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("remedy.toml");
        std::fs::write(
            &path,
            r#"
[runner]
timeout_secs = 30

[fix]
allow_unattended = false

[[classifier.extra_patterns]]
category = "network"
pattern = "EHOSTUNREACH"
"#,
        )
        .unwrap();

        let config = RemedyConfig::load(&path).unwrap();
        assert_eq!(config.runner.timeout_secs, 30);
        assert!(!config.fix.allow_unattended);
        assert_eq!(config.history.capacity, DEFAULT_HISTORY_CAPACITY);
        assert_eq!(config.classifier.extra_patterns[0].category, ErrorCategory::Network);
    }

    #[test]
    fn test_load_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("remedy.yaml");
        std::fs::write(&path, "history:\n  capacity: 50\n  default_limit: 5\n").unwrap();

        let config = RemedyConfig::load(&path).unwrap();
        assert_eq!(config.history.capacity, 50);
        assert_eq!(config.history.default_limit, 5);
        assert_eq!(config.runner.timeout_secs, 120);
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("remedy.ini");
        std::fs::write(&path, "").unwrap();

        assert!(matches!(
            RemedyConfig::load(&path),
            Err(CoreError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = RemedyConfig::from_toml_str("[runner]\ntimeout_secs = 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_COMMAND_TIMEOUT, "15"),
            (ENV_DRY_RUN, "yes"),
            (ENV_HISTORY_LIMIT, "3"),
        ]
        .into_iter()
        .collect();

        let mut config = RemedyConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.runner.timeout_secs, 15);
        assert!(config.runner.dry_run);
        assert_eq!(config.history.default_limit, 3);
    }

    #[test]
    fn test_invalid_override() {
        let mut config = RemedyConfig::default();
        let result = config.apply_overrides(|key| {
            (key == ENV_DRY_RUN).then(|| "maybe".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_catalog_includes_extras() {
        let config = RemedyConfig::from_yaml_str(
            "classifier:\n  extra_patterns:\n    - category: hardware\n      pattern: ttyUSB\n",
        )
        .unwrap();

        let catalog = config.catalog().unwrap();
        let hardware = catalog
            .categories()
            .iter()
            .find(|r| r.category == ErrorCategory::Hardware)
            .unwrap();
        assert_eq!(hardware.patterns.last().map(String::as_str), Some("ttyUSB"));
    }
}
