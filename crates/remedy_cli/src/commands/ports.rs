//! Ports command - Check or find a free TCP port.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use remedy_agents::{check_port_available, find_available_port};

use super::{print_json, CliError, GlobalArgs};

#[derive(Args)]
pub struct PortsArgs {
    /// First port to check
    #[arg(short, long, default_value_t = 8000)]
    start: u16,

    /// Number of consecutive ports to check
    #[arg(short, long, default_value_t = 100)]
    attempts: u16,

    /// Only report whether this port is free
    #[arg(long, conflicts_with_all = ["start", "attempts"])]
    check: Option<u16>,
}

#[derive(Debug, Serialize)]
struct PortView {
    port: u16,
    available: bool,
}

pub async fn execute(global: &GlobalArgs, args: PortsArgs) -> Result<()> {
    if let Some(port) = args.check {
        let available = check_port_available(port);
        if global.json {
            print_json(&PortView { port, available })?;
        } else if available {
            println!("✅ Port {} is available", port);
        } else {
            println!("❌ Port {} is in use", port);
        }
        return Ok(());
    }

    let Some(port) = find_available_port(args.start, args.attempts) else {
        return Err(CliError::InvalidInput(format!(
            "no free port in {} attempt(s) starting at {}",
            args.attempts, args.start
        ))
        .into());
    };

    if global.json {
        print_json(&PortView {
            port,
            available: true,
        })
    } else {
        println!("✅ Port {} is available", port);
        Ok(())
    }
}
