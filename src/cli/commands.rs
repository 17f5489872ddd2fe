// mktotp — CLI Command Handlers
//
// Each function handles one CLI subcommand, delegating to the shared
// operation layer in `crate::ops`. The `get` handler prints the code alone
// on stdout so it can be piped; the remaining validity goes to stderr.

use std::path::PathBuf;

use crate::error::{MktotpError, Result};
use crate::mcp::{describe_tools, MktotpServer};
use crate::ops::{self, SecretSource};
use crate::qr::ZbarDecoder;
use crate::store::{JsonSecretStore, SecretSummary};

use super::{Cli, Commands};

/// Execute the parsed CLI command.
pub async fn execute(cli: Cli) -> Result<()> {
    let store = ops::open_store(cli.secrets_file.clone());

    match cli.command {
        Commands::Add {
            new_name,
            uri,
            secret,
            qr_file,
        } => cmd_add(&store, new_name, uri, secret, qr_file),
        Commands::Get { name } => cmd_get(&store, name),
        Commands::List => cmd_list(&store),
        Commands::Remove { name } => cmd_remove(&store, name),
        Commands::Rename { name, new_name } => cmd_rename(&store, name, new_name),
        Commands::Mcp { serve } => cmd_mcp(cli.secrets_file, serve).await,
    }
}

// ─── Add ─────────────────────────────────────────────────────────────────────

fn cmd_add(
    store: &JsonSecretStore,
    name: String,
    uri: Option<String>,
    secret: Option<String>,
    qr_file: Option<PathBuf>,
) -> Result<()> {
    let summaries = match (uri, secret, qr_file) {
        (Some(uri), None, None) => {
            vec![ops::add_secret(store, &name, SecretSource::OtpauthUri(uri))?]
        }
        (None, Some(secret), None) => {
            vec![ops::add_secret(store, &name, SecretSource::RawBase32(secret))?]
        }
        (None, None, Some(image)) => {
            ops::add_from_qr(store, &name, &image, &ZbarDecoder::default())?
        }
        _ => {
            return Err(MktotpError::InvalidArgument(
                "provide exactly one of --uri, --secret or --qr-file".to_string(),
            ))
        }
    };

    for summary in &summaries {
        println!("✓ Secret '{}' stored", summary.name);
        print_summary(summary, "  ");
    }
    Ok(())
}

// ─── Get ─────────────────────────────────────────────────────────────────────

fn cmd_get(store: &JsonSecretStore, name: String) -> Result<()> {
    let result = ops::generate_code(store, &name)?;

    // The code alone on stdout, pipeline-friendly; validity on stderr.
    println!("{}", result.code);
    eprintln!("valid for {}s", result.seconds_remaining);
    Ok(())
}

// ─── List ────────────────────────────────────────────────────────────────────

fn cmd_list(store: &JsonSecretStore) -> Result<()> {
    let summaries = ops::list_secrets(store)?;

    if summaries.is_empty() {
        println!("No secrets registered yet.");
        println!("Add one with: mktotp add --new-name <name> --uri <otpauth-uri>");
        return Ok(());
    }

    println!("Registered secrets ({}):\n", summaries.len());
    for summary in &summaries {
        println!(
            "  {:<20} │ {:<15} │ {:>6} │ {} digits / {}s",
            summary.name,
            summary.issuer.as_deref().unwrap_or("-"),
            summary.algorithm.to_string(),
            summary.digits,
            summary.period,
        );
    }
    Ok(())
}

// ─── Remove ──────────────────────────────────────────────────────────────────

fn cmd_remove(store: &JsonSecretStore, name: String) -> Result<()> {
    ops::remove_secret(store, &name)?;
    println!("✓ Secret '{}' removed", name);
    Ok(())
}

// ─── Rename ──────────────────────────────────────────────────────────────────

fn cmd_rename(store: &JsonSecretStore, name: String, new_name: String) -> Result<()> {
    let summary = ops::rename_secret(store, &name, &new_name)?;
    println!("✓ Secret '{}' renamed to '{}'", name, summary.name);
    Ok(())
}

// ─── Mcp ─────────────────────────────────────────────────────────────────────

async fn cmd_mcp(secrets_file: Option<PathBuf>, serve: bool) -> Result<()> {
    if !serve {
        println!("{}", describe_tools());
        return Ok(());
    }

    let store_path = secrets_file.unwrap_or_else(ops::default_store_path);
    tracing::info!(path = %store_path.display(), "Starting MCP server (stdio transport)");
    let server = MktotpServer::new(store_path);

    use rmcp::ServiceExt;
    let service = server
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| MktotpError::Internal(format!("MCP server error: {}", e)))?;

    service
        .waiting()
        .await
        .map_err(|e| MktotpError::Internal(format!("MCP server error: {}", e)))?;

    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn print_summary(summary: &SecretSummary, indent: &str) {
    if let Some(ref account) = summary.account {
        println!("{}Account:   {}", indent, account);
    }
    if let Some(ref issuer) = summary.issuer {
        println!("{}Issuer:    {}", indent, issuer);
    }
    println!("{}Algorithm: {}", indent, summary.algorithm);
    println!("{}Digits:    {}", indent, summary.digits);
    println!("{}Period:    {}s", indent, summary.period);
}
