//! Model Context Protocol implementation
//!
//! JSON-RPC types, the stdio server loop, and the tool registry.

pub mod server;
pub mod tools;
pub mod types;
