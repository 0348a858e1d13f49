//! Syntax agent for Python and JavaScript code errors.
//!
//! Code errors are never fixed automatically. The agent produces a targeted
//! hint and a diagnostic block for a human to act on.

use async_trait::async_trait;

use remedy_core::{ErrorCategory, ErrorReport, FixResult, ACTION_DIAGNOSTIC};

use crate::patterns::PatternList;
use crate::traits::{format_location, RemediationAgent};

/// Generic hint patterns, case-insensitive. Checked in order before the
/// per-error-type analyzers; entry `i` maps to `COMMON_FIX_ADVICE[i]`.
static COMMON_FIX_PATTERNS: PatternList = PatternList::new(
    &[
        "unexpected EOF",
        "invalid syntax",
        "expected an indented block",
        "unindent does not match",
        "name .* is not defined",
        "has no attribute",
        "object is not callable",
        "missing .* required positional argument",
        "takes .* positional arguments but .* were given",
        "cannot import name",
        "circular import",
    ],
    true,
);

const COMMON_FIX_ADVICE: &[&str] = &[
    "Check for missing closing brackets, parentheses, or quotes",
    "Check for typos, missing colons, or incorrect operators",
    "Add proper indentation after if/for/def/class statements",
    "Fix inconsistent indentation (spaces vs tabs)",
    "Check variable spelling or add missing import",
    "Check attribute name spelling or object type",
    "Remove parentheses or check if object is a function",
    "Add the required argument to the function call",
    "Remove extra arguments from function call",
    "Check import path and module structure",
    "Restructure imports or use lazy imports",
];

static IMPORT_NAME: PatternList =
    PatternList::new(&[r#"cannot import name ['"]?(\w+)['"]?"#], false);
static MISSING_MODULE: PatternList =
    PatternList::new(&[r#"No module named ['"]?([^'"]+)['"]?"#], false);
static MISSING_ATTRIBUTE: PatternList =
    PatternList::new(&[r"'(\w+)' object has no attribute '(\w+)'"], false);
static UNDEFINED_NAME: PatternList =
    PatternList::new(&[r#"name ['"]?(\w+)['"]? is not defined"#], false);

const RAW_EXCERPT_CHARS: usize = 500;

/// Agent for syntax and runtime code errors.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyntaxAgent;

impl SyntaxAgent {
    pub fn new() -> Self {
        Self
    }

    fn common_fix(error: &str) -> Option<&'static str> {
        COMMON_FIX_PATTERNS
            .first_match(error)
            .and_then(|index| COMMON_FIX_ADVICE.get(index).copied())
    }

    fn analyze_syntax_error(error: &str, location: &str) -> String {
        if error.contains("EOL while scanning string") {
            format!("Missing closing quote for string{}", location)
        } else if error.contains("unexpected EOF") {
            format!("Missing closing bracket, parenthesis, or quote{}", location)
        } else if error.contains("invalid character") {
            format!("Remove invalid character (possibly copied from web/doc){}", location)
        } else if error.contains("f-string") {
            format!("Check f-string syntax - no backslashes or nested quotes{}", location)
        } else {
            format!("Check syntax near{}", location)
        }
    }

    fn analyze_indentation_error(error: &str, location: &str) -> String {
        if error.contains("expected an indented block") {
            format!("Add 4 spaces of indentation after the colon{}", location)
        } else if error.contains("unindent does not match") {
            format!(
                "Fix indentation level - ensure consistent use of spaces (not tabs){}",
                location
            )
        } else if error.contains("unexpected indent") {
            format!("Remove extra indentation{}", location)
        } else {
            format!("Fix indentation{} - use 4 spaces per level", location)
        }
    }

    fn analyze_import_error(error: &str) -> String {
        if let Some(name) = IMPORT_NAME.first_capture(error) {
            return format!(
                "'{}' doesn't exist in the module. Check spelling or module version.",
                name
            );
        }

        if let Some(module) = MISSING_MODULE.first_capture(error) {
            let top = module.split('.').next().unwrap_or(&module).trim();
            return format!("Install missing module: pip install {}", top);
        }

        "Check import statement and module installation".to_string()
    }

    fn analyze_type_error(error: &str) -> &'static str {
        if error.contains("NoneType") {
            "A variable is None when it shouldn't be. Add a null check."
        } else if error.contains("not subscriptable") {
            "Can't use [] on this type. Check the object type."
        } else if error.contains("not iterable") {
            "Can't iterate over this object. Check if it's a list/tuple/dict."
        } else if error.contains("argument") {
            "Wrong number or type of arguments passed to function."
        } else {
            "Type mismatch - check variable types"
        }
    }

    fn analyze_attribute_error(error: &str) -> String {
        if let Some(caps) = MISSING_ATTRIBUTE.captures(error) {
            return format!(
                "'{}' doesn't have '{}'. Check spelling or object type.",
                &caps[1], &caps[2]
            );
        }
        "Object doesn't have this attribute. Check object type and attribute name.".to_string()
    }

    fn analyze_name_error(error: &str) -> String {
        match UNDEFINED_NAME.first_capture(error) {
            Some(name) => format!(
                "'{}' is not defined. Check spelling, add import, or define it first.",
                name
            ),
            None => "Variable not defined. Check spelling or add import statement.".to_string(),
        }
    }

    /// Diagnostic block attached to every fix attempt.
    pub fn diagnostics(report: &ErrorReport) -> String {
        let mut lines = vec![
            format!("Error Type: {}", report.subcategory().unwrap_or("Unknown")),
            format!("Category: {}", report.category()),
        ];

        if let Some(path) = report.file_path() {
            lines.push(format!("File: {}", path));
        }
        if let Some(line) = report.line_number() {
            lines.push(format!("Line: {}", line));
        }

        let excerpt: String = report.raw_message().chars().take(RAW_EXCERPT_CHARS).collect();
        lines.push(format!("\nRaw Error:\n{}", excerpt));

        lines.join("\n")
    }
}

#[async_trait]
impl RemediationAgent for SyntaxAgent {
    fn name(&self) -> &'static str {
        "SyntaxAgent"
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Syntax
    }

    fn suggest_fix(&self, report: &ErrorReport) -> String {
        let error = report.raw_message();
        let location = format_location(report);

        if let Some(fix) = Self::common_fix(error) {
            return format!("{}{}", fix, location);
        }

        if error.contains("SyntaxError") {
            Self::analyze_syntax_error(error, &location)
        } else if error.contains("IndentationError") {
            Self::analyze_indentation_error(error, &location)
        } else if error.contains("ImportError") || error.contains("ModuleNotFoundError") {
            Self::analyze_import_error(error)
        } else if error.contains("TypeError") {
            Self::analyze_type_error(error).to_string()
        } else if error.contains("AttributeError") {
            Self::analyze_attribute_error(error)
        } else if error.contains("NameError") {
            Self::analyze_name_error(error)
        } else {
            format!("Review the error{}", location)
        }
    }

    fn can_auto_fix(&self, _report: &ErrorReport) -> bool {
        false
    }

    async fn execute_fix(&self, report: &ErrorReport) -> FixResult {
        let suggestion = self.suggest_fix(report);
        FixResult::failed(ACTION_DIAGNOSTIC, "Manual code fix required").with_output(format!(
            "Suggestion: {}\n\nDiagnostics:\n{}",
            suggestion,
            Self::diagnostics(report)
        ))
    }
}
