//! Histograph CLI - lay out and inspect historical entity graphs

mod cli;
mod colorizer;

use clap::Parser;

fn main() {
    let cli_args = cli::Cli::parse();

    // Logging is configured in run() from flags and environment
    let mut app = cli::HistographApp::new();

    if let Err(e) = app.run(cli_args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
