//! Network agent for port conflicts and connectivity failures.

use std::net::TcpListener;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use remedy_core::{ErrorCategory, ErrorReport, FixResult, HostPlatform};
use remedy_runner::CommandRunner;

use crate::patterns::PatternList;
use crate::traits::RemediationAgent;

static PORT_PATTERNS: PatternList = PatternList::new(
    &[r"port[:\s]+(\d+)", r":(\d+)\)", r"address.*:(\d+)", r"bind.*:(\d+)"],
    true,
);

/// Common dev-server ports recognized as bare text when no pattern matches.
const FALLBACK_PORTS: &[u16] = &[8000, 3000];

/// Agent for network errors.
pub struct NetworkAgent {
    runner: Arc<dyn CommandRunner>,
    platform: HostPlatform,
}

impl NetworkAgent {
    pub fn new(runner: Arc<dyn CommandRunner>, platform: HostPlatform) -> Self {
        Self { runner, platform }
    }

    pub fn platform(&self) -> HostPlatform {
        self.platform
    }

    /// Port number mentioned in an error, if any.
    pub fn extract_port(error_message: &str) -> Option<u16> {
        for re in PORT_PATTERNS.regexes() {
            let port = re
                .captures(error_message)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse::<u16>().ok())
                .filter(|port| *port > 0);
            if port.is_some() {
                return port;
            }
        }

        FALLBACK_PORTS
            .iter()
            .copied()
            .find(|port| error_message.contains(&port.to_string()))
    }

    fn is_port_conflict(error: &str) -> bool {
        error.contains("10048") || error.contains("address already in use")
    }

    fn pid_lookup_command(&self, port: u16) -> String {
        match self.platform {
            HostPlatform::Windows => format!("netstat -ano | findstr :{}", port),
            HostPlatform::Posix => format!("lsof -t -iTCP:{} -sTCP:LISTEN", port),
        }
    }

    fn kill_command(&self, pid: u32) -> String {
        match self.platform {
            HostPlatform::Windows => format!("taskkill /PID {} /F", pid),
            HostPlatform::Posix => format!("kill -9 {}", pid),
        }
    }

    fn parse_pid(&self, output: &str) -> Option<u32> {
        match self.platform {
            HostPlatform::Windows => output.lines().find_map(|line| {
                let parts: Vec<&str> = line.split_whitespace().collect();
                if parts.len() >= 5 && line.contains("LISTENING") {
                    parts.last().and_then(|pid| pid.parse().ok())
                } else {
                    None
                }
            }),
            HostPlatform::Posix => output
                .lines()
                .next()
                .and_then(|line| line.trim().parse().ok()),
        }
    }

    /// PID of the process listening on `port`.
    pub async fn find_process_on_port(&self, port: u16) -> Option<u32> {
        let outcome = self.runner.run(&self.pid_lookup_command(port)).await;
        if !outcome.success {
            debug!("PID lookup for port {} failed: {}", port, outcome.output);
            return None;
        }
        self.parse_pid(&outcome.output)
    }

    /// Kill the process holding `port`.
    pub async fn kill_process_on_port(&self, port: u16) -> FixResult {
        let Some(pid) = self.find_process_on_port(port).await else {
            return FixResult::failed(
                format!("Searched for process on port {}", port),
                "Could not find process using port",
            );
        };

        info!("Killing process {} on port {}", pid, port);
        let outcome = self.runner.run(&self.kill_command(pid)).await;

        if outcome.success {
            FixResult::succeeded(format!("Killed process {} on port {}", pid, port), outcome.output)
        } else {
            warn!("Failed to kill process {}: {}", pid, outcome.output);
            FixResult::failed(format!("Attempted to kill process {}", pid), outcome.output)
        }
    }
}

/// Whether `port` can be bound on all interfaces right now.
pub fn check_port_available(port: u16) -> bool {
    TcpListener::bind(("0.0.0.0", port)).is_ok()
}

/// First bindable port in `start..start + max_attempts`.
pub fn find_available_port(start: u16, max_attempts: u16) -> Option<u16> {
    (0..max_attempts)
        .filter_map(|offset| start.checked_add(offset))
        .find(|port| check_port_available(*port))
}

#[async_trait]
impl RemediationAgent for NetworkAgent {
    fn name(&self) -> &'static str {
        "NetworkAgent"
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Network
    }

    fn suggest_fix(&self, report: &ErrorReport) -> String {
        let raw = report.raw_message();
        let error = raw.to_lowercase();

        if Self::is_port_conflict(&error) {
            return match (Self::extract_port(raw), self.platform) {
                (Some(port), HostPlatform::Windows) => format!(
                    "netstat -ano | findstr :{} to find PID, then taskkill /PID <pid> /F",
                    port
                ),
                (Some(port), HostPlatform::Posix) => {
                    format!("lsof -i :{} to find process, then kill -9 <pid>", port)
                }
                (None, _) => "Find and kill the process using the port, or use a different port".to_string(),
            };
        }

        if error.contains("connection refused") || error.contains("econnrefused") {
            return "Ensure the target service is running and accepting connections".to_string();
        }

        if error.contains("timeout") || error.contains("etimedout") {
            return "Check network connectivity and firewall rules".to_string();
        }

        if error.contains("getaddrinfo") || error.contains("name resolution") {
            return "Check DNS settings and network connectivity".to_string();
        }

        "Check network configuration and firewall settings".to_string()
    }

    fn can_auto_fix(&self, report: &ErrorReport) -> bool {
        report.subcategory() == Some("port_in_use")
    }

    async fn execute_fix(&self, report: &ErrorReport) -> FixResult {
        let raw = report.raw_message();
        if !Self::is_port_conflict(&raw.to_lowercase()) {
            return FixResult::none("Manual intervention required");
        }

        match Self::extract_port(raw) {
            Some(port) => self.kill_process_on_port(port).await,
            None => FixResult::none("Could not extract port number from error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remedy_core::Classifier;
    use remedy_runner::{MockResponse, MockRunner};

    fn classify(text: &str) -> ErrorReport {
        Classifier::builtin().unwrap().classify(text)
    }

    fn posix_agent(runner: MockRunner) -> NetworkAgent {
        NetworkAgent::new(Arc::new(runner), HostPlatform::Posix)
    }

    #[test]
    fn test_extract_port() {
        assert_eq!(NetworkAgent::extract_port("Error: listen on port 5000"), Some(5000));
        assert_eq!(NetworkAgent::extract_port("bind(('0.0.0.0', 8080)) (addr=localhost:8080)"), Some(8080));
        assert_eq!(NetworkAgent::extract_port("address already in use 127.0.0.1:9999"), Some(9999));
        assert_eq!(NetworkAgent::extract_port("server on 3000 crashed"), Some(3000));
        assert_eq!(NetworkAgent::extract_port("address already in use"), None);
    }

    #[test]
    fn test_extract_port_skips_out_of_range() {
        assert_eq!(NetworkAgent::extract_port("port 70000 then bind 0.0.0.0:8081"), Some(8081));
    }

    #[test]
    fn test_suggest_port_conflict_per_platform() {
        let report = classify("OSError: [Errno 98] Address already in use: port 5000");

        let posix = posix_agent(MockRunner::new());
        assert_eq!(
            posix.suggest_fix(&report),
            "lsof -i :5000 to find process, then kill -9 <pid>"
        );

        let windows = NetworkAgent::new(Arc::new(MockRunner::new()), HostPlatform::Windows);
        assert_eq!(
            windows.suggest_fix(&report),
            "netstat -ano | findstr :5000 to find PID, then taskkill /PID <pid> /F"
        );
        assert!(posix.can_auto_fix(&report));
    }

    #[test]
    fn test_suggest_other_network_errors() {
        let agent = posix_agent(MockRunner::new());

        let refused = classify("ECONNREFUSED 127.0.0.1:5432");
        assert_eq!(
            agent.suggest_fix(&refused),
            "Ensure the target service is running and accepting connections"
        );
        assert!(!agent.can_auto_fix(&refused));

        let timeout = classify("connect ETIMEDOUT 10.0.0.1:443");
        assert_eq!(agent.suggest_fix(&timeout), "Check network connectivity and firewall rules");
    }

    #[tokio::test]
    async fn test_kill_process_posix() {
        let runner = MockRunner::new()
            .on("lsof", MockResponse::success("4242\n"))
            .on("kill -9", MockResponse::success(""));
        let agent = posix_agent(runner.clone());
        let report = classify("Address already in use (127.0.0.1:9999)");

        let result = agent.execute_fix(&report).await;

        assert!(result.success);
        assert_eq!(result.action_taken, "Killed process 4242 on port 9999");
        assert_eq!(
            runner.commands(),
            vec!["lsof -t -iTCP:9999 -sTCP:LISTEN", "kill -9 4242"]
        );
    }

    #[tokio::test]
    async fn test_kill_process_windows() {
        let netstat = "  TCP    0.0.0.0:8000    0.0.0.0:0    LISTENING    1234\n";
        let runner = MockRunner::new()
            .on("netstat", MockResponse::success(netstat))
            .on("taskkill", MockResponse::success("SUCCESS"));
        let agent = NetworkAgent::new(Arc::new(runner.clone()), HostPlatform::Windows);
        let report = classify("[WinError 10048] Only one usage of each socket address: port 8000");

        let result = agent.execute_fix(&report).await;

        assert!(result.success);
        assert_eq!(result.action_taken, "Killed process 1234 on port 8000");
        assert!(runner.was_called("taskkill /PID 1234 /F"));
    }

    #[tokio::test]
    async fn test_no_process_found() {
        let runner = MockRunner::new().on("lsof", MockResponse::failure(""));
        let agent = posix_agent(runner.clone());
        let report = classify("address already in use :7000)");

        let result = agent.execute_fix(&report).await;

        assert!(!result.success);
        assert_eq!(result.action_taken, "Searched for process on port 7000");
        assert_eq!(result.error.as_deref(), Some("Could not find process using port"));
        assert_eq!(runner.call_count(), 1);
    }

    #[tokio::test]
    async fn test_kill_failure() {
        let runner = MockRunner::new()
            .on("lsof", MockResponse::success("99\n"))
            .on("kill", MockResponse::failure("Operation not permitted"));
        let agent = posix_agent(runner);
        let report = classify("address already in use port 7000");

        let result = agent.execute_fix(&report).await;

        assert!(!result.success);
        assert_eq!(result.action_taken, "Attempted to kill process 99");
        assert_eq!(result.error.as_deref(), Some("Operation not permitted"));
    }

    #[tokio::test]
    async fn test_non_port_error_is_manual() {
        let runner = MockRunner::new();
        let agent = posix_agent(runner.clone());
        let report = classify("Connection refused");

        let result = agent.execute_fix(&report).await;

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Manual intervention required"));
        assert_eq!(runner.call_count(), 0);
    }

    #[tokio::test]
    async fn test_port_conflict_without_port() {
        let agent = posix_agent(MockRunner::new());
        let report = classify("address already in use");

        let result = agent.execute_fix(&report).await;

        assert_eq!(result.error.as_deref(), Some("Could not extract port number from error"));
    }

    #[test]
    fn test_port_patterns_compile() {
        assert!(PORT_PATTERNS.is_complete());
    }

    #[test]
    fn test_pid_lookup_targets_listener_only() {
        let agent = posix_agent(MockRunner::new());
        assert_eq!(agent.pid_lookup_command(5000), "lsof -t -iTCP:5000 -sTCP:LISTEN");
        assert_eq!(agent.parse_pid("812\n813\n"), Some(812));
        assert_eq!(agent.parse_pid(""), None);
    }

    #[test]
    fn test_find_available_port() {
        let listener = TcpListener::bind(("0.0.0.0", 0)).unwrap();
        let taken = listener.local_addr().unwrap().port();

        assert!(!check_port_available(taken));
        let found = find_available_port(taken, 50).unwrap();
        assert_ne!(found, taken);
        assert!(found > taken);
    }

    #[test]
    fn test_find_available_port_zero_attempts() {
        assert_eq!(find_available_port(8000, 0), None);
    }
}
