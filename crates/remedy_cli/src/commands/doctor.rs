//! Doctor command - Show host facts, agents and effective configuration.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use remedy_core::{AgentStatusView, HostInfo, RemedyConfig, CATALOG_VERSION};

use super::{print_json, yes_no, GlobalArgs};

#[derive(Args)]
pub struct DoctorArgs {
    /// Also print the effective configuration
    #[arg(long)]
    show_config: bool,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    version: &'static str,
    catalog_version: &'static str,
    host: HostInfo,
    agents: Vec<AgentStatusView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<RemedyConfig>,
}

pub async fn execute(global: &GlobalArgs, args: DoctorArgs) -> Result<()> {
    let config = global.load_config()?;
    let dispatcher = global.dispatcher(&config, false)?;
    let host = dispatcher.system_info().unwrap_or_else(HostInfo::detect);

    let report = DoctorReport {
        version: env!("CARGO_PKG_VERSION"),
        catalog_version: CATALOG_VERSION,
        host,
        agents: dispatcher.agent_status(),
        config: args.show_config.then_some(config),
    };

    if global.json {
        return print_json(&report);
    }

    println!("🩺 remedy {} (catalog v{})", report.version, report.catalog_version);
    println!();
    println!("Host:");
    println!("   Platform:      {}", report.host.platform);
    println!("   OS / arch:     {} / {}", report.host.os, report.host.arch);
    println!("   Raspberry Pi:  {}", yes_no(report.host.is_raspberry_pi));
    if let Some(model) = &report.host.model {
        println!("   Model:         {}", model);
    }
    println!();
    println!("Agents:");
    for agent in &report.agents {
        println!("   {:<16} {:<12} {}", agent.name, agent.category, agent.status);
    }

    if let Some(config) = &report.config {
        println!();
        println!("Configuration:");
        println!("   Command timeout: {}s", config.runner.timeout_secs);
        println!("   Dry run:         {}", yes_no(config.runner.dry_run));
        println!("   History:         {} kept, {} shown", config.history.capacity, config.history.default_limit);
        println!("   Unattended fix:  {}", yes_no(config.fix.allow_unattended));
        println!("   Extra patterns:  {}", config.classifier.extra_patterns.len());
    }
    Ok(())
}
