// mktotp — Application Entry Point
//
// Parses CLI arguments, initializes structured logging (which never emits
// secret values), and dispatches to the command handler. Uses the tokio
// async runtime for MCP server support.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mktotp::cli::{execute, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // -v raises the default level; RUST_LOG always wins when set.
    let default_filter = match cli.verbose {
        0 => "mktotp=info",
        1 => "mktotp=debug",
        _ => "mktotp=trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(e) = execute(cli).await {
        eprintln!("Error [{}]: {}", e.kind(), e);
        std::process::exit(1);
    }
}
