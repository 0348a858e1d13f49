//! The analyze/fix pipeline.
//!
//! `Raw text → categorized → agent-enriched (or terminal unknown) → executed`.
//! Both entry points always return data; failures surface as reports with
//! category `Unknown` or as failed [`FixResult`]s.

use std::sync::Arc;

use tracing::{debug, info, warn};

use remedy_core::{
    AgentStatusView, Classifier, CoreResult, ErrorCategory, ErrorReport, FixResult, History, HostInfo,
    RemedyConfig, DEFAULT_HISTORY_LIMIT,
};
use remedy_runner::CommandRunner;

use crate::dependency::DependencyAgent;
use crate::hardware::HardwareAgent;
use crate::network::NetworkAgent;
use crate::policy::FixPolicy;
use crate::registry::AgentRegistry;
use crate::syntax::SyntaxAgent;

const AGENT_STATUS_ACTIVE: &str = "active";

/// Owns the classifier, agent registry and history for one host process.
pub struct Dispatcher {
    classifier: Classifier,
    registry: AgentRegistry,
    history: History,
    policy: FixPolicy,
    history_limit: usize,
}

impl Dispatcher {
    pub fn new(
        classifier: Classifier,
        registry: AgentRegistry,
        history: History,
        policy: FixPolicy,
    ) -> Self {
        Self {
            classifier,
            registry,
            history,
            policy,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Limit used by [`Dispatcher::history`] when the caller gives none.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Dispatcher with the four built-in agents, configured for this host.
    pub fn with_defaults(runner: Arc<dyn CommandRunner>, config: &RemedyConfig) -> CoreResult<Self> {
        Self::with_host(runner, config, HostInfo::detect())
    }

    /// Like [`Dispatcher::with_defaults`], with explicit host facts.
    pub fn with_host(
        runner: Arc<dyn CommandRunner>,
        config: &RemedyConfig,
        host: HostInfo,
    ) -> CoreResult<Self> {
        let classifier = Classifier::new(&config.catalog()?)?;

        let mut registry = AgentRegistry::new();
        registry.register(Arc::new(DependencyAgent::new(runner.clone())));
        registry.register(Arc::new(NetworkAgent::new(runner.clone(), host.platform)));
        registry.register(Arc::new(SyntaxAgent::new()));
        registry.register(Arc::new(HardwareAgent::new(runner, host)));

        Ok(Self::new(
            classifier,
            registry,
            History::new(config.history.capacity),
            FixPolicy::new(config.fix.allow_unattended),
        )
        .with_history_limit(config.history.default_limit))
    }

    /// Classify `text`, enrich it through its agent, and record it.
    pub fn analyze(&self, text: &str) -> ErrorReport {
        let mut report = self.classifier.classify(text);

        match self.registry.get(report.category()) {
            Some(agent) => {
                let suggestion = agent.suggest_fix(&report);
                let auto_fixable = agent.can_auto_fix(&report);
                report = report.with_remedy(suggestion, auto_fixable);
            }
            None => debug!("No agent for category {}", report.category()),
        }

        info!(
            category = %report.category(),
            subcategory = report.subcategory().unwrap_or("-"),
            auto_fixable = report.auto_fixable(),
            "Analyzed error"
        );

        self.history.record(report.clone());
        report
    }

    /// Analyze `text` and, if authorized, run its agent's fix.
    pub async fn fix(&self, text: &str, auto_approve: bool) -> FixResult {
        let report = self.analyze(text);
        let agent = self.registry.get(report.category());

        let agent = match self.policy.authorize(&report, agent, auto_approve) {
            Ok(agent) => agent,
            Err(refusal) => {
                debug!("Fix refused: {:?}", refusal);
                return refusal.into();
            }
        };

        info!("Dispatching fix to {}", agent.name());
        let result = agent.execute_fix(&report).await;
        if result.success {
            info!("Fix succeeded: {}", result.action_taken);
        } else {
            warn!(
                "Fix failed: {} ({})",
                result.action_taken,
                result.error.as_deref().unwrap_or("no detail")
            );
        }
        result
    }

    /// Up to `limit` most recent reports, oldest first.
    pub fn history(&self, limit: Option<usize>) -> Vec<ErrorReport> {
        self.history.recent(limit.unwrap_or(self.history_limit))
    }

    pub fn clear_history(&self) {
        self.history.clear();
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Registered agents and their categories.
    pub fn agent_status(&self) -> Vec<AgentStatusView> {
        self.registry
            .agents()
            .iter()
            .map(|agent| AgentStatusView {
                name: agent.name().to_string(),
                category: agent.category().to_string(),
                status: AGENT_STATUS_ACTIVE.to_string(),
            })
            .collect()
    }

    /// Host facts reported by the hardware agent, if one is registered.
    pub fn system_info(&self) -> Option<HostInfo> {
        self.registry
            .get(ErrorCategory::Hardware)
            .and_then(|agent| agent.system_info())
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn policy(&self) -> FixPolicy {
        self.policy
    }
}
