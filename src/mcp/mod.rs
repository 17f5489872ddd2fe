// mktotp — MCP Server Module
//
// Exposes the secret-manager operations as MCP tools that AI assistants
// can discover and call via stdio transport. Tool results carry names,
// parameters and codes — never raw secret material.

mod server;

pub use server::{describe_tools, MktotpServer};
