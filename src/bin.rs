use std::path::PathBuf;

use clap::Parser;
use lensing::{run, RunOptions};

/// Interactive gravitational lensing around a black hole.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// TOML scene configuration. Uses the built-in scene when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Render one frame to this PNG and exit instead of opening a window.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Entry point for the application.
///
/// Parses the command line, then calls the `run` function and blocks until it completes.
fn main() {
    let args = Args::parse();
    let options = RunOptions { config_path: args.config, output: args.output };

    if let Err(error) = pollster::block_on(run(options)) {
        log::error!("{error:#}");
        std::process::exit(1);
    }
}
