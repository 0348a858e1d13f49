//! Batch command - Analyze a file of error messages.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use remedy_core::HistoryView;

use super::{print_json, yes_no, CliError, GlobalArgs};

#[derive(Args)]
pub struct BatchArgs {
    /// File containing error messages separated by blank lines
    file: PathBuf,

    /// Number of recent reports to print (defaults to history.default_limit)
    #[arg(short, long)]
    limit: Option<usize>,
}

pub async fn execute(global: &GlobalArgs, args: BatchArgs) -> Result<()> {
    if !args.file.exists() {
        return Err(CliError::InvalidInput(format!("File not found: {}", args.file.display())).into());
    }

    let content = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let messages = split_messages(&content);

    let config = global.load_config()?;
    let dispatcher = global.dispatcher(&config, false)?;

    info!("Analyzing {} message(s) from {}", messages.len(), args.file.display());
    for message in &messages {
        dispatcher.analyze(message);
    }

    let view = HistoryView::from_reports(&dispatcher.history(args.limit));

    if global.json {
        return print_json(&view);
    }

    println!("📋 Analyzed {} message(s), showing {}", messages.len(), view.count);
    println!();
    for entry in &view.errors {
        let category = match &entry.subcategory {
            Some(sub) => format!("{}/{}", entry.category, sub),
            None => entry.category.clone(),
        };
        println!(
            "  {} {:<28} auto-fix: {:<3} {}",
            entry.timestamp.format("%H:%M:%S"),
            category,
            yes_no(entry.auto_fixable),
            entry.suggested_fix.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

/// Split on blank lines, dropping empty paragraphs.
pub fn split_messages(content: &str) -> Vec<String> {
    let mut messages = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in content.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                messages.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        messages.push(current.join("\n"));
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_messages() {
        let content = "\nNo module named 'requests'\n\n\nTraceback (most recent call last):\n  File \"app.py\", line 3\nSyntaxError: invalid syntax\n   \nAddress already in use";
        let messages = split_messages(content);

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0], "No module named 'requests'");
        assert!(messages[1].starts_with("Traceback"));
        assert!(messages[1].ends_with("SyntaxError: invalid syntax"));
        assert_eq!(messages[2], "Address already in use");
    }

    #[test]
    fn test_split_messages_empty() {
        assert!(split_messages("").is_empty());
        assert!(split_messages("\n \n\t\n").is_empty());
    }
}
