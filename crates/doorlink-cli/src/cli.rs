use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "doorlink", version, about = "Talk to a door controller over its serial link")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug)]
pub struct GlobalOpts {
    /// JSON file with paired devices
    #[arg(long, global = true, env = "DOORLINK_DEVICES")]
    pub devices: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Connect to a door and control it interactively
    Connect(ConnectOpts),

    /// List paired devices
    Devices,

    /// Print the command and response byte table
    Codes,
}

#[derive(Args, Debug)]
pub struct ConnectOpts {
    /// Device name, Bluetooth address, or endpoint (tcp://host:port, /dev/rfcomm0)
    pub identifier: String,

    /// Baud rate for serial endpoints that do not name one
    #[arg(long, default_value_t = doorlink_core::constants::DEFAULT_BAUD_RATE)]
    pub baud: u32,

    /// Connect timeout in milliseconds
    #[arg(long, default_value_t = doorlink_core::constants::DEFAULT_CONNECT_TIMEOUT_MS)]
    pub timeout_ms: u64,
}
