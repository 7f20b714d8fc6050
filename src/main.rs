//! tabledb CLI entry point
//!
//! Parses arguments and runs the shell via `cli::run`, printing any fatal
//! error to stderr and exiting non-zero.

use tabledb::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
