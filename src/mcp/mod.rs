//! MCP (Model Context Protocol) server for Tekst.
//!
//! Exposes transcript and metadata lookups as tools to AI assistants.
//! Implements JSON-RPC 2.0 over stdio.

mod handler;
mod protocol;
mod server;
mod tools;

pub use handler::RequestHandler;
pub use server::McpServer;
