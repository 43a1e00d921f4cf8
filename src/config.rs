//! Command-line configuration.

use std::path::PathBuf;

use clap::Parser;

/// Share pastes over HTTP.
///
/// Both settings are fixed for the life of the process.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "pasted", version, about, long_about = None)]
pub struct Config {
    /// Address to listen on. `:PORT` listens on every interface.
    #[arg(long = "bindaddr", env = "PASTED_BINDADDR", default_value = ":3555")]
    pub bind_addr: String,

    /// Directory holding paste data. Created if missing.
    #[arg(long = "data", env = "PASTED_DATA", default_value = "/tmp/paste")]
    pub data_dir: PathBuf,
}
