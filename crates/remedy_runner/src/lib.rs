//! # remedy_runner
//!
//! Host command execution for remedy.
//!
//! Every remediation that touches the host goes through a [`CommandRunner`].
//! Runners never fail from the caller's point of view: spawn errors, non-zero
//! exits and timeouts all come back as a [`CommandOutcome`] with
//! `success == false`.
//!
//! # Runners
//!
//! - [`ShellRunner`]: runs the command through the host shell (`sh -c` or
//!   `cmd /C`) with a bounded wall-clock timeout
//! - [`MockRunner`]: records commands and replays canned responses, for tests
//!
//! # Example
//!
//! ```rust,no_run
//! use remedy_runner::{CommandRunner, ShellRunner, ShellRunnerOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let runner = ShellRunner::new(ShellRunnerOptions::default());
//!     let outcome = runner.run("pip --version").await;
//!     println!("{} -> {}", outcome.success, outcome.output);
//! }
//! ```

pub mod error;
pub mod mock;
pub mod runner;
pub mod shell;

pub use error::{RunnerError, RunnerResult};
pub use mock::{MockResponse, MockRunner};
pub use runner::{CommandOutcome, CommandRunner, TIMEOUT_MESSAGE};
pub use shell::{ShellRunner, ShellRunnerOptions, DEFAULT_COMMAND_TIMEOUT};
