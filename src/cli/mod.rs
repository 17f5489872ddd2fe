// mktotp — CLI Module
//
// Command-line interface using clap derive macros.
// Subcommands: add, get, list, remove, rename, mcp.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::execute;

/// mktotp — TOTP secret manager and code generator.
#[derive(Parser, Debug)]
#[command(name = "mktotp")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the secrets file (default: ~/.mktotp/data/secrets.json).
    #[arg(short = 's', long = "secrets-file", global = true)]
    pub secrets_file: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register a new TOTP secret (overwrites an existing name).
    Add {
        /// The name to register the secret under.
        #[arg(short = 'n', long = "new-name")]
        new_name: String,

        /// An otpauth://totp/ provisioning URI.
        #[arg(long, conflicts_with_all = ["secret", "qr_file"])]
        uri: Option<String>,

        /// A bare Base32 secret (SHA1, 6 digits, 30s period defaults apply).
        #[arg(long, conflicts_with = "qr_file")]
        secret: Option<String>,

        /// Path to a QR image containing one or more provisioning URIs.
        #[arg(long = "qr-file")]
        qr_file: Option<PathBuf>,
    },

    /// Generate the current code for a registered secret.
    Get {
        /// The name of the secret.
        #[arg(short = 'n', long)]
        name: String,
    },

    /// List all registered secrets (metadata only, no secrets).
    List,

    /// Delete a registered secret.
    Remove {
        /// The name of the secret to delete.
        #[arg(short = 'n', long)]
        name: String,
    },

    /// Rename a registered secret.
    Rename {
        /// The current name of the secret.
        #[arg(short = 'n', long)]
        name: String,

        /// The new name to move the secret to.
        #[arg(long = "new-name")]
        new_name: String,
    },

    /// Run as an MCP server, or print the tool catalog.
    Mcp {
        /// Start the stdio server (without this flag the tool list is printed).
        #[arg(long)]
        serve: bool,
    },
}
