//! Error types for the Workspace MCP Server
//!
//! This module defines the error hierarchy for all operations in the server.

use thiserror::Error;

/// Main error type for the Workspace MCP Server
#[derive(Error, Debug)]
pub enum WorkspaceMcpError {
    /// OAuth authentication errors
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Google Workspace API errors
    #[error("Workspace API error: {0}")]
    Api(#[from] ApiError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// MCP protocol errors
    #[error("MCP protocol error: {0}")]
    Mcp(#[from] McpError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl WorkspaceMcpError {
    /// Whether this error requires the user to (re-)authenticate
    pub fn is_auth_required(&self) -> bool {
        matches!(self, WorkspaceMcpError::Auth(AuthError::AuthRequired { .. }))
    }
}

/// OAuth authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// No usable credential; the interactive flow must run
    #[error("Authentication required: {reason}. Run the `start_google_auth` tool or `workspace-mcp-server auth`")]
    AuthRequired { reason: String },

    #[error("Client secret file not found: {path}")]
    ClientSecretNotFound { path: String },

    #[error("Invalid client secret format: expected 'installed' or 'web' credentials")]
    InvalidClientSecret,

    #[error("Failed to refresh access token: {message}")]
    TokenRefreshFailed { message: String },

    #[error("OAuth callback error: {message}")]
    CallbackError { message: String },

    #[error("No authorization code provided")]
    NoAuthCode,

    #[error("Authentication flow timed out after {secs} seconds")]
    FlowTimeout { secs: u64 },

    #[error("Token exchange failed: {message}")]
    TokenExchangeFailed { message: String },
}

/// Errors propagated from the Google Docs / Drive APIs.
///
/// Upstream failures keep the HTTP status and response body verbatim.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Document not found: {document_id}")]
    DocumentNotFound { document_id: String },

    #[error("Tab not found: {tab_id}")]
    TabNotFound { tab_id: String },

    #[error("Comment not found: {comment_id}")]
    CommentNotFound { comment_id: String },

    #[error("Upstream API error ({status}): {body}")]
    Upstream { status: u16, body: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config directory not found: {path}")]
    DirNotFound { path: String },

    #[error("Failed to create config directory: {path}")]
    DirCreationFailed { path: String },

    #[error("Missing OAuth client configuration: set {vars} or GOOGLE_CLIENT_SECRET_PATH")]
    MissingOAuthClient { vars: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// MCP protocol errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Invalid tool arguments: {message}")]
    InvalidArguments { message: String },

    #[error("Protocol error: {message}")]
    ProtocolError { message: String },
}

/// Result type alias for Workspace MCP operations
pub type Result<T> = std::result::Result<T, WorkspaceMcpError>;
