//! Google Workspace MCP Server Library
//!
//! A Model Context Protocol (MCP) server for Google Workspace integration.
//! Provides tools for reading and editing Google Docs tabs and managing
//! document comments via the Docs and Drive APIs.

pub mod config;
pub mod error;
pub mod google;
pub mod mcp;

pub use config::Config;
pub use error::{Result, WorkspaceMcpError};
