use std::path::PathBuf;

use clap::Parser;

use crate::platform::logging::LogDestination;

/// Companion process for the Lumina browser shell. Requests arrive on stdin,
/// replies leave on stdout, one line each.
#[derive(Debug, Parser)]
#[command(name = "sidekick", version)]
pub struct Cli {
    /// RON settings file (defaults to ./sidekick.ron when present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Convert a file at startup, as if it had been dropped on the window
    #[arg(long = "convert", value_name = "FILE")]
    pub convert: Vec<PathBuf>,

    /// Send the Lua bridge script once at startup
    #[arg(long)]
    pub lua_bridge: bool,

    /// Where log output goes; stdout is reserved for the host
    #[arg(long, value_enum, default_value_t = LogDestination::Stderr)]
    pub log: LogDestination,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}
