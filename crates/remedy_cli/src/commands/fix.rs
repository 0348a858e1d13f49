//! Fix command - Classify an error and apply its fix.

use anyhow::Result;
use clap::Args;
use tracing::info;

use remedy_core::FixView;

use super::{print_json, read_message, CliError, GlobalArgs};

#[derive(Args)]
pub struct FixArgs {
    /// Error message to fix (read from stdin when omitted)
    message: Option<String>,

    /// Approve fixes that are not safe to run unattended
    #[arg(short, long)]
    yes: bool,

    /// Log fix commands instead of running them
    #[arg(long)]
    dry_run: bool,
}

pub async fn execute(global: &GlobalArgs, args: FixArgs) -> Result<()> {
    let message = read_message(args.message)?;
    let config = global.load_config()?;
    let dispatcher = global.dispatcher(&config, args.dry_run)?;

    if args.dry_run {
        info!("Dry run: commands will be logged, not executed");
    }

    let result = dispatcher.fix(&message, args.yes).await;

    if global.json {
        print_json(&FixView::from(&result))?;
    } else {
        if result.success {
            println!("✅ {}", result.action_taken);
        } else if result.was_attempted() {
            println!("❌ {}", result.action_taken);
        } else {
            println!("⚠️  No fix applied");
        }
        if let Some(output) = result.output.as_deref().filter(|o| !o.trim().is_empty()) {
            println!();
            println!("{}", output.trim_end());
        }
    }

    if result.success {
        Ok(())
    } else {
        let reason = result.error.unwrap_or_else(|| "unknown error".to_string());
        Err(CliError::FixFailed(reason).into())
    }
}
