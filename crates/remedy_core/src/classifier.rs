//! Error text classifier.
//!
//! Turns raw error text into a bare [`ErrorReport`]: category, optional
//! subcategory and optional source location. Remediation fields are left
//! for the agents to fill in.

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::catalog::{PatternCatalog, TextMatch, LOCATION_PATTERNS};
use crate::error::{CoreError, CoreResult};
use crate::report::{ErrorCategory, ErrorReport, SourceLocation};

/// Compiled form of a [`PatternCatalog`].
#[derive(Debug, Clone)]
pub struct Classifier {
    categories: Vec<(ErrorCategory, Vec<Regex>)>,
    locations: Vec<Regex>,
}

impl Classifier {
    /// Compile a catalog. Fails only if a pattern is not a valid regex.
    pub fn new(catalog: &PatternCatalog) -> CoreResult<Self> {
        let categories = catalog
            .categories()
            .iter()
            .map(|rules| {
                let compiled = rules
                    .patterns
                    .iter()
                    .map(|p| compile(p, true))
                    .collect::<CoreResult<Vec<_>>>()?;
                Ok((rules.category, compiled))
            })
            .collect::<CoreResult<Vec<_>>>()?;

        let locations = LOCATION_PATTERNS
            .iter()
            .map(|p| compile(p, false))
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(Self {
            categories,
            locations,
        })
    }

    /// Classifier over the built-in catalog.
    pub fn builtin() -> CoreResult<Self> {
        Self::new(&PatternCatalog::builtin())
    }

    /// First category (in catalog order) with a matching pattern.
    pub fn detect_category(&self, text: &str) -> ErrorCategory {
        for (category, patterns) in &self.categories {
            if let Some(pattern) = patterns.iter().find(|re| re.is_match(text)) {
                debug!("Matched {} via `{}`", category, pattern.as_str());
                return *category;
            }
        }
        ErrorCategory::Unknown
    }

    /// Finer-grained tag within `category`, if any rule matches.
    pub fn detect_subcategory(&self, text: &str, category: ErrorCategory) -> Option<&'static str> {
        let lower = text.to_lowercase();
        PatternCatalog::subcategory_rules(category)
            .find(|rule| rule.any_of.iter().any(|m| text_matches(m, text, &lower)))
            .map(|rule| rule.tag)
    }

    /// Best-effort file/line extraction. Rules are tried in order and the
    /// first one yielding a positive line number wins.
    pub fn extract_location(&self, text: &str) -> SourceLocation {
        for re in &self.locations {
            let Some(caps) = re.captures(text) else {
                continue;
            };
            let line = caps
                .get(2)
                .and_then(|m| m.as_str().parse::<u32>().ok())
                .filter(|line| *line > 0);
            if let (Some(path), Some(line)) = (caps.get(1), line) {
                return SourceLocation::new(path.as_str(), line);
            }
        }
        SourceLocation::default()
    }

    /// Category, subcategory and location for `text`, without remediation.
    pub fn classify(&self, text: &str) -> ErrorReport {
        let category = self.detect_category(text);
        let subcategory = self.detect_subcategory(text, category);
        let location = self.extract_location(text);

        ErrorReport::new(text, category)
            .with_subcategory(subcategory)
            .with_location(location)
    }
}

fn compile(pattern: &str, case_insensitive: bool) -> CoreResult<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|e| CoreError::invalid_pattern(pattern, e.to_string()))
}

fn text_matches(m: &TextMatch, text: &str, lower: &str) -> bool {
    match m {
        TextMatch::Contains(needle) => text.contains(needle),
        TextMatch::ContainsIgnoreCase(needle) => lower.contains(needle),
        TextMatch::AllIgnoreCase(needles) => needles.iter().all(|n| lower.contains(n)),
    }
}
