//! CLI argument definitions using clap
//!
//! tabledb [--config <path>] [--data-dir <dir>] [--metadata-file <path>]
//!         [--yes] [--log-level <level>]
//!
//! Flags override values from the configuration file.

use clap::Parser;
use std::path::PathBuf;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "./tabledb.json";

/// tabledb - a small file-backed table store with an interactive shell
#[derive(Parser, Debug, Default)]
#[command(name = "tabledb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory holding one document per table
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Path of the metadata document
    #[arg(long)]
    pub metadata_file: Option<String>,

    /// Approve destructive operations without asking
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Minimum log severity (trace, info, warn, error, fatal)
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Config file to read; `None` for the implicit default path.
    pub fn explicit_config(&self) -> Option<&PathBuf> {
        self.config.as_ref()
    }
}
