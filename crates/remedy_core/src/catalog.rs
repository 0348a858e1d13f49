//! Static pattern tables used by the classifier.
//!
//! Category order is a priority list: the first category with a matching
//! pattern wins, so the tables are ordered slices rather than maps.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::report::ErrorCategory;

/// Version of the built-in tables. Bump when patterns change.
pub const CATALOG_VERSION: &str = "1";

/// Category detection patterns, in priority order. Matched case-insensitively.
pub const CATEGORY_PATTERNS: &[(ErrorCategory, &[&str])] = &[
    (
        ErrorCategory::Dependency,
        &[
            r"pip.*error",
            r"npm.*ERR",
            r"ModuleNotFoundError",
            r"No module named",
            r"metadata-generation-failed",
            r"Could not find a version",
            r"package.*not found",
        ],
    ),
    (
        ErrorCategory::Network,
        &[
            r"WinError 10048",
            r"address already in use",
            r"Connection refused",
            r"ECONNREFUSED",
            r"ETIMEDOUT",
            r"bind.*failed",
            r"port.*in use",
        ],
    ),
    (
        ErrorCategory::Syntax,
        &[
            r"SyntaxError",
            r"IndentationError",
            r"NameError",
            r"TypeError",
            r"AttributeError",
            r"ImportError",
            r"ValueError",
        ],
    ),
    (
        ErrorCategory::Hardware,
        &[
            r"GPIO",
            r"camera.*not found",
            r"libcamera",
            r"picamera",
            r"device.*busy",
            r"No such device",
            r"I2C",
            r"SPI",
        ],
    ),
    (
        ErrorCategory::Permission,
        &[
            r"Permission denied",
            r"Access.*denied",
            r"EACCES",
            r"requires.*admin",
            r"Operation not permitted",
        ],
    ),
];

/// A literal text test used for subcategory detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMatch {
    /// Case-sensitive substring
    Contains(&'static str),
    /// Case-insensitive substring (needle is lowercase)
    ContainsIgnoreCase(&'static str),
    /// Every lowercase needle appears, ignoring case
    AllIgnoreCase(&'static [&'static str]),
}

/// A subcategory tag and the tests that select it (any one suffices).
#[derive(Debug, Clone, Copy)]
pub struct SubcategoryRule {
    pub category: ErrorCategory,
    pub tag: &'static str,
    pub any_of: &'static [TextMatch],
}

const fn rule(
    category: ErrorCategory,
    tag: &'static str,
    any_of: &'static [TextMatch],
) -> SubcategoryRule {
    SubcategoryRule {
        category,
        tag,
        any_of,
    }
}

use TextMatch::{AllIgnoreCase, Contains, ContainsIgnoreCase};

/// Subcategory rules. Within a category, the first matching rule wins.
pub const SUBCATEGORY_RULES: &[SubcategoryRule] = &[
    // Dependency
    rule(ErrorCategory::Dependency, "numpy_compile", &[ContainsIgnoreCase("numpy")]),
    rule(ErrorCategory::Dependency, "metadata_failed", &[Contains("metadata-generation-failed")]),
    rule(ErrorCategory::Dependency, "missing_module", &[Contains("No module named")]),
    rule(
        ErrorCategory::Dependency,
        "build_failed",
        &[ContainsIgnoreCase("failed building wheel"), ContainsIgnoreCase("failed to build")],
    ),
    rule(ErrorCategory::Dependency, "version_conflict", &[AllIgnoreCase(&["version", "conflict"])]),
    // Network
    rule(
        ErrorCategory::Network,
        "port_in_use",
        &[Contains("10048"), ContainsIgnoreCase("address already in use")],
    ),
    rule(ErrorCategory::Network, "connection_refused", &[ContainsIgnoreCase("refused")]),
    rule(
        ErrorCategory::Network,
        "timeout",
        &[ContainsIgnoreCase("timeout"), ContainsIgnoreCase("timed out"), ContainsIgnoreCase("etimedout")],
    ),
    rule(
        ErrorCategory::Network,
        "dns_resolution",
        &[ContainsIgnoreCase("getaddrinfo"), ContainsIgnoreCase("name resolution")],
    ),
    // Syntax
    rule(ErrorCategory::Syntax, "indentation", &[Contains("IndentationError")]),
    rule(ErrorCategory::Syntax, "import", &[Contains("ImportError")]),
    rule(ErrorCategory::Syntax, "syntax", &[Contains("SyntaxError")]),
    rule(ErrorCategory::Syntax, "type", &[Contains("TypeError")]),
    rule(ErrorCategory::Syntax, "attribute", &[Contains("AttributeError")]),
    rule(ErrorCategory::Syntax, "name", &[Contains("NameError")]),
    rule(ErrorCategory::Syntax, "value", &[Contains("ValueError")]),
    // Hardware
    rule(
        ErrorCategory::Hardware,
        "camera",
        &[ContainsIgnoreCase("camera"), ContainsIgnoreCase("mmal")],
    ),
    rule(ErrorCategory::Hardware, "gpio", &[ContainsIgnoreCase("gpio")]),
    rule(ErrorCategory::Hardware, "i2c", &[ContainsIgnoreCase("i2c")]),
    rule(ErrorCategory::Hardware, "spi", &[ContainsIgnoreCase("spi")]),
    rule(ErrorCategory::Hardware, "device", &[ContainsIgnoreCase("device")]),
];

/// Source location patterns, tried in order. Group 1 is the path,
/// group 2 the line number.
pub const LOCATION_PATTERNS: &[&str] = &[
    // Python traceback: File "path", line N
    r#"File "([^"]+)", line (\d+)"#,
    // Bare python path:line
    r"([^\s:]+\.py):(\d+)",
    // Bare JS/TS path:line
    r"([^\s:(]+\.(?:js|jsx|ts|tsx|mjs|cjs)):(\d+)",
];

/// Patterns for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRules {
    pub category: ErrorCategory,
    pub patterns: Vec<String>,
}

/// The ordered category table handed to the classifier.
///
/// Starts from [`CATEGORY_PATTERNS`]; extra patterns can be appended to a
/// category without changing category priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternCatalog {
    categories: Vec<CategoryRules>,
}

impl PatternCatalog {
    /// The built-in tables.
    pub fn builtin() -> Self {
        let categories = CATEGORY_PATTERNS
            .iter()
            .map(|(category, patterns)| CategoryRules {
                category: *category,
                patterns: patterns.iter().map(|p| p.to_string()).collect(),
            })
            .collect();
        Self { categories }
    }

    /// Append a pattern after the existing patterns of `category`.
    pub fn add_pattern(
        &mut self,
        category: ErrorCategory,
        pattern: impl Into<String>,
    ) -> CoreResult<()> {
        let pattern = pattern.into();
        if category.is_unknown() {
            return Err(CoreError::invalid_pattern(
                pattern,
                "patterns cannot target the unknown category",
            ));
        }

        match self.categories.iter_mut().find(|r| r.category == category) {
            Some(rules) => rules.patterns.push(pattern),
            None => self.categories.push(CategoryRules {
                category,
                patterns: vec![pattern],
            }),
        }
        Ok(())
    }

    /// Category rules in priority order.
    pub fn categories(&self) -> &[CategoryRules] {
        &self.categories
    }

    /// Subcategory rules for one category, in order.
    pub fn subcategory_rules(category: ErrorCategory) -> impl Iterator<Item = &'static SubcategoryRule> {
        SUBCATEGORY_RULES.iter().filter(move |r| r.category == category)
    }

    pub fn version(&self) -> &'static str {
        CATALOG_VERSION
    }
}

impl Default for PatternCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_priority_order() {
        let order: Vec<_> = PatternCatalog::builtin()
            .categories()
            .iter()
            .map(|r| r.category)
            .collect();

        assert_eq!(
            order,
            vec![
                ErrorCategory::Dependency,
                ErrorCategory::Network,
                ErrorCategory::Syntax,
                ErrorCategory::Hardware,
                ErrorCategory::Permission,
            ]
        );
    }

    #[test]
    fn test_add_pattern_appends_within_category() {
        let mut catalog = PatternCatalog::builtin();
        catalog.add_pattern(ErrorCategory::Network, "EHOSTUNREACH").unwrap();

        let network = &catalog.categories()[1];
        assert_eq!(network.category, ErrorCategory::Network);
        assert_eq!(network.patterns.last().map(String::as_str), Some("EHOSTUNREACH"));
        assert_eq!(catalog.categories().len(), 5);
    }

    #[test]
    fn test_unknown_category_rejected() {
        let mut catalog = PatternCatalog::builtin();
        assert!(catalog.add_pattern(ErrorCategory::Unknown, "anything").is_err());
    }

    #[test]
    fn test_unknown_and_permission_have_no_subcategories() {
        assert_eq!(PatternCatalog::subcategory_rules(ErrorCategory::Unknown).count(), 0);
        assert_eq!(PatternCatalog::subcategory_rules(ErrorCategory::Permission).count(), 0);
        assert_eq!(
            PatternCatalog::subcategory_rules(ErrorCategory::Dependency)
                .next()
                .map(|r| r.tag),
            Some("numpy_compile")
        );
    }
}
