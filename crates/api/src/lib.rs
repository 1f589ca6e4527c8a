//! Agent-facing tool surface for the bazaar checkout system.
//!
//! Exposes the catalog and checkout operations as named tools over a
//! newline-delimited JSON channel on stdin/stdout. Every tool call is
//! answered with a single structured text payload plus a boolean error
//! flag; failures never escape the dispatcher.

pub mod config;
pub mod tools;
pub mod transport;

pub use config::Config;
pub use tools::{ToolCall, ToolReply, ToolRouter};
