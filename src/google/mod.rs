//! Google Workspace API integration
//!
//! OAuth authentication, typed Docs/Drive clients, document content
//! rendering, and the document cache.

pub mod auth;
pub mod cache;
pub mod client;
pub mod content;
pub mod types;
