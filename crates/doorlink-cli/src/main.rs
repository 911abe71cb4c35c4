mod cli;
mod repl;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use doorlink_link::{DeviceRegistry, DoorLink, LinkConfig, SystemTransport};
use doorlink_protocol::{Command as DoorCommand, ResponseCode};

use crate::cli::{Cli, Command, ConnectOpts};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    let registry = match &cli.global.devices {
        Some(path) => load_registry(path)?,
        None => DeviceRegistry::new(),
    };

    match cli.command {
        Command::Connect(opts) => connect(registry, opts).await,
        Command::Devices => {
            print_devices(&registry);
            Ok(())
        }
        Command::Codes => {
            print_codes();
            Ok(())
        }
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_registry(path: &Path) -> Result<DeviceRegistry> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading device list {}", path.display()))?;
    let registry: DeviceRegistry = serde_json::from_str(&contents)
        .with_context(|| format!("parsing device list {}", path.display()))?;
    tracing::debug!("Loaded {} paired devices", registry.len());
    Ok(registry)
}

async fn connect(registry: DeviceRegistry, opts: ConnectOpts) -> Result<()> {
    let config = LinkConfig::default()
        .baud_rate(opts.baud)
        .connect_timeout(Duration::from_millis(opts.timeout_ms));
    config.validate()?;
    let transport = SystemTransport::new(registry, config.clone());
    let (link, mut events) = DoorLink::new(transport, config);

    println!("connecting to {} ...", opts.identifier);
    link.connect(&opts.identifier)
        .await
        .with_context(|| format!("connecting to {}", opts.identifier))?;

    let result = repl::run(&link, &mut events).await;
    link.shutdown().await;
    result
}

fn print_devices(registry: &DeviceRegistry) {
    if registry.is_empty() {
        println!("no paired devices (use --devices <file.json>)");
        return;
    }
    for device in registry.iter() {
        println!("{:<24} {}  {}", device.name, device.address, device.endpoint);
    }
}

fn print_codes() {
    println!("commands (host -> door):");
    for command in DoorCommand::ALL {
        println!("  {:>3}  {:<10} {}", command.to_byte(), command.to_string(), command.as_str());
    }
    println!("responses (door -> host):");
    println!("  {:>3}  {:<10}", 0, "no signal");
    for code in ResponseCode::ALL {
        println!("  {:>3}  {:<10}", code.to_byte(), code.to_string());
    }
    println!("  any other byte is ignored");
}
