//! # remedy_agents
//!
//! Category-specific remediation agents and the dispatcher that routes
//! classified errors to them.
//!
//! ## Agents
//!
//! | Agent | Category | Unattended fixes |
//! |-------|----------|------------------|
//! | [`DependencyAgent`] | dependency | `pip install` for missing modules and known build failures |
//! | [`NetworkAgent`] | network | kill the process holding a port |
//! | [`SyntaxAgent`] | syntax | none, diagnostics only |
//! | [`HardwareAgent`] | hardware | kill processes holding the camera |
//!
//! `permission` errors are classified but have no agent, so they are never
//! fixed.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use remedy_agents::Dispatcher;
//! use remedy_core::RemedyConfig;
//! use remedy_runner::{ShellRunner, ShellRunnerOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runner = Arc::new(ShellRunner::new(ShellRunnerOptions::default()));
//!     let dispatcher = Dispatcher::with_defaults(runner, &RemedyConfig::default())?;
//!
//!     let report = dispatcher.analyze("ModuleNotFoundError: No module named 'requests'");
//!     println!("{:?}", report.suggested_fix());
//!
//!     let result = dispatcher.fix("ModuleNotFoundError: No module named 'requests'", false).await;
//!     println!("{}", result.success);
//!     Ok(())
//! }
//! ```

pub mod dependency;
pub mod dispatcher;
pub mod hardware;
pub mod network;
mod patterns;
pub mod policy;
pub mod registry;
pub mod syntax;
pub mod traits;

pub use dependency::DependencyAgent;
pub use dispatcher::Dispatcher;
pub use hardware::HardwareAgent;
pub use network::{check_port_available, find_available_port, NetworkAgent};
pub use policy::{FixPolicy, FixRefusal};
pub use registry::AgentRegistry;
pub use syntax::SyntaxAgent;
pub use traits::RemediationAgent;
