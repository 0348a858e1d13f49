//! Analyze command - Classify an error and suggest a fix.

use anyhow::Result;
use clap::Args;
use tracing::info;

use remedy_core::{AnalysisView, ErrorReport};

use super::{print_json, read_message, yes_no, GlobalArgs};

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Error message to analyze (read from stdin when omitted)
    message: Option<String>,
}

pub async fn execute(global: &GlobalArgs, args: AnalyzeArgs) -> Result<()> {
    let message = read_message(args.message)?;
    let config = global.load_config()?;
    let dispatcher = global.dispatcher(&config, false)?;

    let report = dispatcher.analyze(&message);
    info!("Report {} recorded", report.id());

    if global.json {
        print_json(&AnalysisView::from(&report))
    } else {
        print_report(&report);
        Ok(())
    }
}

pub(crate) fn print_report(report: &ErrorReport) {
    match report.subcategory() {
        Some(sub) => println!("🔎 Category:      {} ({})", report.category(), sub),
        None => println!("🔎 Category:      {}", report.category()),
    }

    match (report.file_path(), report.line_number()) {
        (Some(path), Some(line)) => println!("   Location:      {}:{}", path, line),
        (Some(path), None) => println!("   Location:      {}", path),
        _ => {}
    }

    match report.suggested_fix() {
        Some(fix) => println!("💡 Suggested fix: {}", fix),
        None => println!("   No suggestion available"),
    }
    println!("   Auto-fixable:  {}", yes_no(report.auto_fixable()));
}
