//! Command-line shell for tabledb
//!
//! - args: flags parsed with clap
//! - config: optional JSON configuration file
//! - parser: shell command grammar
//! - commands: the interactive loop
//! - display: result tables

mod args;
mod commands;
mod config;
mod display;
mod errors;
mod io;
mod parser;

pub use args::{Cli, DEFAULT_CONFIG_PATH};
pub use commands::{run, Flow, Shell};
pub use config::Config;
pub use display::{format_records, NO_RECORDS};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{LineSource, Prompter, ReaderSource, TerminalSource, PROMPT};
pub use parser::{parse_command, parse_condition, parse_value, parse_values_list, tokenize, Command, ParseError};
