pub use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bitmark")]
#[command(about = "Bitmark accounts, signed requests and asset records")]
pub struct Args {
    /// Path to the bitmark config directory (defaults to ~/.bitmark)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset (defaults to the configured level)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: crate::Command,
}
