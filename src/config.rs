//! Configuration management for the Workspace MCP Server
//!
//! Handles paths, environment variables, and OAuth client settings.

use std::path::PathBuf;

use crate::error::{ConfigError, Result, WorkspaceMcpError};

/// Default port for the local OAuth callback listener
const DEFAULT_PORT: u16 = 8000;

/// Configuration for the Workspace MCP Server
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory for storing configuration files
    pub config_dir: PathBuf,

    /// Path to the Google client secret file (client credentials)
    pub client_secret_path: PathBuf,

    /// Path to stored credentials (access/refresh tokens)
    pub credentials_path: PathBuf,

    /// OAuth client id from the environment, if set
    pub oauth_client_id: Option<String>,

    /// OAuth client secret from the environment, if set
    pub oauth_client_secret: Option<String>,

    /// Base URI the callback listener is reachable at
    pub base_uri: String,

    /// Port for the local OAuth callback listener
    pub port: u16,

    /// Full OAuth redirect URI
    pub redirect_uri: String,

    /// Whether plain-http redirect URIs are permitted (local development)
    pub allow_insecure_transport: bool,

    /// Google API scopes
    pub scopes: Vec<String>,
}

impl Config {
    /// Create a new configuration from the environment with default paths
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;

        let client_secret_path = std::env::var("GOOGLE_CLIENT_SECRET_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir.join("client_secret.json"));

        let credentials_path = config_dir.join("credentials.json");

        let oauth_client_id = std::env::var("GOOGLE_OAUTH_CLIENT_ID").ok();
        let oauth_client_secret = std::env::var("GOOGLE_OAUTH_CLIENT_SECRET").ok();

        let base_uri = std::env::var("WORKSPACE_MCP_BASE_URI")
            .unwrap_or_else(|_| "http://localhost".to_string());

        let port = match std::env::var("WORKSPACE_MCP_PORT") {
            Ok(p) => p.parse().map_err(|_| {
                WorkspaceMcpError::Config(ConfigError::InvalidConfig {
                    message: format!("WORKSPACE_MCP_PORT is not a valid port: {}", p),
                })
            })?,
            Err(_) => DEFAULT_PORT,
        };

        let redirect_uri = std::env::var("GOOGLE_OAUTH_REDIRECT_URI")
            .unwrap_or_else(|_| format!("{}:{}/oauth2callback", base_uri, port));

        let allow_insecure_transport = std::env::var("OAUTHLIB_INSECURE_TRANSPORT")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let config = Self {
            config_dir,
            client_secret_path,
            credentials_path,
            oauth_client_id,
            oauth_client_secret,
            base_uri,
            port,
            redirect_uri,
            allow_insecure_transport,
            scopes: vec![
                "https://www.googleapis.com/auth/documents".to_string(),
                "https://www.googleapis.com/auth/drive.file".to_string(),
                "https://www.googleapis.com/auth/drive.readonly".to_string(),
            ],
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject redirect URIs that OAuth would refuse at the token endpoint
    fn validate(&self) -> Result<()> {
        if self.redirect_uri.starts_with("http://")
            && !self.allow_insecure_transport
            && !self.redirect_uri.starts_with("http://localhost")
            && !self.redirect_uri.starts_with("http://127.0.0.1")
        {
            return Err(WorkspaceMcpError::Config(ConfigError::InvalidConfig {
                message: format!(
                    "non-local http redirect URI {} requires OAUTHLIB_INSECURE_TRANSPORT=1",
                    self.redirect_uri
                ),
            }));
        }
        Ok(())
    }

    /// Get the configuration directory, creating it if necessary
    fn get_config_dir() -> Result<PathBuf> {
        let config_dir = match std::env::var("WORKSPACE_MCP_CONFIG_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => dirs::home_dir()
                .ok_or_else(|| {
                    WorkspaceMcpError::Config(ConfigError::DirNotFound {
                        path: "~".to_string(),
                    })
                })?
                .join(".workspace-mcp"),
        };

        if !config_dir.exists() {
            std::fs::create_dir_all(&config_dir).map_err(|_| {
                WorkspaceMcpError::Config(ConfigError::DirCreationFailed {
                    path: config_dir.display().to_string(),
                })
            })?;
        }

        Ok(config_dir)
    }

    /// Check whether OAuth client settings are available from either source
    pub fn oauth_client_configured(&self) -> bool {
        (self.oauth_client_id.is_some() && self.oauth_client_secret.is_some())
            || self.client_secret_path.exists()
    }

    /// Check if credentials (tokens) exist
    pub fn credentials_exist(&self) -> bool {
        self.credentials_path.exists()
    }
}

/// Google API constants
pub mod google_api {
    /// Base URL for the Google Docs API
    pub const DOCS_BASE_URL: &str = "https://docs.googleapis.com/v1";

    /// Base URL for the Google Drive API
    pub const DRIVE_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

    /// Google OAuth authorization endpoint
    pub const AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";

    /// Google OAuth token endpoint
    pub const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

    /// MIME type of a native Google Doc
    pub const DOC_MIME_TYPE: &str = "application/vnd.google-apps.document";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = Config::new();
        assert!(config.is_ok());
    }

    #[test]
    fn test_default_scopes() {
        let config = Config::new().unwrap();
        assert_eq!(config.scopes.len(), 3);
        assert!(config.scopes[0].contains("documents"));
    }

    #[test]
    fn test_default_redirect_uri_uses_port() {
        let config = Config::new().unwrap();
        if std::env::var("GOOGLE_OAUTH_REDIRECT_URI").is_err() {
            assert!(config.redirect_uri.contains("/oauth2callback"));
            assert!(config.redirect_uri.contains(&config.port.to_string()));
        }
    }
}
