//! MCP (Model Context Protocol) server.
//!
//! **Server** (`server`): JSON-RPC 2.0 method routing shared by both
//! transports, plus the axum handler for HTTP POST `/mcp`.
//!
//! **Stdio** (`stdio`): newline-delimited JSON-RPC over stdin/stdout, the
//! transport agent hosts use when they spawn the server as a subprocess.
//!
//! Protocol revision: 2024-11-05.

pub mod server;
pub mod stdio;
