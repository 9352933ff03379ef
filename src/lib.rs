//! MCP stdio bridge for the Rube tool platform.
//!
//! Reads JSON-RPC 2.0 requests line by line from stdin, forwards
//! `tools/list`, `tools/call`, `resources/list` and `resources/read` to the
//! Rube HTTP API, and writes each result or error back to stdout as one line.
//! Responses are correlated by `id`, not by position in the stream.

pub mod config;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod logging;
pub mod protocol;
pub mod server;

pub mod schema;
