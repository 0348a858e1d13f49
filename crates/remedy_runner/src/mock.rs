//! Mock command runner for testing.
//!
//! Records every command it is asked to run and answers with canned
//! responses, so agents can be exercised without touching the host.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::runner::{CommandOutcome, CommandRunner};

/// Predefined response for a mocked command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockResponse {
    pub success: bool,
    pub output: String,
}

impl MockResponse {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    pub fn failure(output: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
        }
    }

    fn into_outcome(self) -> CommandOutcome {
        if self.success {
            CommandOutcome::success(self.output)
        } else {
            CommandOutcome::failure(self.output)
        }
    }
}

/// Mock command runner.
///
/// Responses are chosen in this order:
/// 1. the first rule whose pattern is a substring of the command
/// 2. the next unused sequential response
/// 3. an empty successful response
#[derive(Clone, Default)]
pub struct MockRunner {
    /// Substring-matched responses.
    rules: Arc<RwLock<Vec<(String, MockResponse)>>>,
    /// Responses returned in call order.
    responses: Arc<RwLock<Vec<MockResponse>>>,
    /// Index of next sequential response to return.
    response_index: Arc<AtomicUsize>,
    /// Every command seen, in call order.
    captured: Arc<RwLock<Vec<String>>>,
}

impl MockRunner {
    /// Create a new mock runner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer any command containing `pattern` with `response`.
    pub fn on(self, pattern: impl Into<String>, response: MockResponse) -> Self {
        self.rules.write().push((pattern.into(), response));
        self
    }

    /// Add a response for the next unmatched call.
    pub fn add_response(self, response: MockResponse) -> Self {
        self.responses.write().push(response);
        self
    }

    /// Set multiple sequential responses.
    pub fn with_responses(self, responses: Vec<MockResponse>) -> Self {
        *self.responses.write() = responses;
        self
    }

    /// Get all captured commands.
    pub fn commands(&self) -> Vec<String> {
        self.captured.read().clone()
    }

    /// Get the number of commands run.
    pub fn call_count(&self) -> usize {
        self.captured.read().len()
    }

    /// Check if any command containing `fragment` was run.
    pub fn was_called(&self, fragment: &str) -> bool {
        self.captured.read().iter().any(|c| c.contains(fragment))
    }

    /// Clear all captured commands.
    pub fn clear_calls(&self) {
        self.captured.write().clear();
    }

    fn next_response(&self, command: &str) -> MockResponse {
        if let Some((_, response)) = self
            .rules
            .read()
            .iter()
            .find(|(pattern, _)| command.contains(pattern.as_str()))
        {
            return response.clone();
        }

        let index = self.response_index.fetch_add(1, Ordering::SeqCst);
        self.responses
            .read()
            .get(index)
            .cloned()
            .unwrap_or_else(|| MockResponse::success(""))
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, command: &str) -> CommandOutcome {
        self.captured.write().push(command.to_string());
        self.next_response(command).into_outcome()
    }
}
