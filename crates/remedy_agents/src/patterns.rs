//! Lazily compiled regex tables shared by the agents.

use std::sync::OnceLock;

use regex::{Captures, Regex, RegexBuilder};
use tracing::warn;

/// An ordered list of patterns, compiled on first use and reused afterwards.
pub(crate) struct PatternList {
    sources: &'static [&'static str],
    case_insensitive: bool,
    /// Compiled regexes paired with their index in `sources`
    compiled: OnceLock<Vec<(usize, Regex)>>,
}

impl PatternList {
    pub(crate) const fn new(sources: &'static [&'static str], case_insensitive: bool) -> Self {
        Self {
            sources,
            case_insensitive,
            compiled: OnceLock::new(),
        }
    }

    fn compiled(&self) -> &[(usize, Regex)] {
        self.compiled.get_or_init(|| {
            self.sources
                .iter()
                .enumerate()
                .filter_map(|(index, pattern)| {
                    match RegexBuilder::new(pattern)
                        .case_insensitive(self.case_insensitive)
                        .build()
                    {
                        Ok(re) => Some((index, re)),
                        Err(e) => {
                            warn!("Skipping invalid pattern `{}`: {}", pattern, e);
                            None
                        }
                    }
                })
                .collect()
        })
    }

    /// Compiled regexes in declaration order.
    pub(crate) fn regexes(&self) -> impl Iterator<Item = &Regex> {
        self.compiled().iter().map(|(_, re)| re)
    }

    /// Index (into the source list) of the first pattern matching `text`.
    pub(crate) fn first_match(&self, text: &str) -> Option<usize> {
        self.compiled()
            .iter()
            .find(|(_, re)| re.is_match(text))
            .map(|(index, _)| *index)
    }

    /// Captures of the first pattern matching `text`.
    pub(crate) fn captures<'t>(&self, text: &'t str) -> Option<Captures<'t>> {
        self.regexes().find_map(|re| re.captures(text))
    }

    /// Capture group 1 of the first pattern matching `text`.
    pub(crate) fn first_capture(&self, text: &str) -> Option<String> {
        self.captures(text)
            .and_then(|caps| caps.get(1).map(|m| m.as_str().to_string()))
    }

    /// Whether every source pattern compiled.
    #[cfg(test)]
    pub(crate) fn is_complete(&self) -> bool {
        self.compiled().len() == self.sources.len()
    }
}
