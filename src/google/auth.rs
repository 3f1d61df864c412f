//! OAuth authentication for Google Workspace APIs
//!
//! Handles the OAuth 2.0 credential lifecycle:
//! - Loading client configuration from the environment or a client secret file
//! - Interactive browser-based authentication with a local callback listener
//! - Token storage and silent refresh

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::config::{google_api, Config};
use crate::error::{AuthError, ConfigError, Result, WorkspaceMcpError};

/// Refresh margin: tokens expiring within this window are refreshed eagerly
const REFRESH_MARGIN_SECS: i64 = 300;

/// How long the callback listener stays armed before giving up
const FLOW_TIMEOUT_SECS: u64 = 300;

/// OAuth client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthClient {
    /// Client ID
    pub client_id: String,

    /// Client secret
    pub client_secret: String,

    /// Auth URI
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,

    /// Token URI
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    google_api::AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    google_api::TOKEN_URI.to_string()
}

/// Client secret file format (can be "installed" or "web")
#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    #[serde(alias = "web")]
    installed: Option<OAuthClient>,
}

/// Stored credentials (tokens)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredentials {
    /// Access token
    pub access_token: String,

    /// Refresh token
    pub refresh_token: Option<String>,

    /// Token type (usually "Bearer")
    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// Expiry timestamp (Unix seconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<i64>,

    /// Scopes
    #[serde(default)]
    pub scope: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Token response from the OAuth token endpoint
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    token_type: String,
    expires_in: Option<i64>,
    #[serde(default)]
    scope: String,
}

fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Merge a token response into stored credentials.
///
/// The token endpoint usually omits the refresh token on refresh; the
/// previous one is carried forward so it is never discarded while valid.
fn merge_token_response(
    response: TokenResponse,
    previous_refresh_token: Option<String>,
) -> StoredCredentials {
    let now = unix_now();
    StoredCredentials {
        access_token: response.access_token,
        refresh_token: response.refresh_token.or(previous_refresh_token),
        token_type: response.token_type,
        expiry: response.expires_in.map(|e| now + e),
        scope: response.scope,
    }
}

/// OAuth credential manager
pub struct Authenticator {
    /// Configuration
    config: Config,

    /// HTTP client
    http_client: reqwest::Client,

    /// OAuth client configuration
    client: OAuthClient,

    /// Current credentials (tokens)
    credentials: Arc<RwLock<Option<StoredCredentials>>>,
}

impl Authenticator {
    /// Create a new authenticator
    pub async fn new(config: Config) -> Result<Self> {
        let client = Self::load_oauth_client(&config)?;

        let auth = Self {
            config,
            http_client: reqwest::Client::new(),
            client,
            credentials: Arc::new(RwLock::new(None)),
        };

        // Pick up credentials persisted by an earlier run
        if auth.config.credentials_exist() {
            match auth.load_credentials().await {
                Ok(creds) => *auth.credentials.write().await = Some(creds),
                Err(e) => tracing::warn!("Ignoring unreadable stored credentials: {}", e),
            }
        }

        Ok(auth)
    }

    /// Resolve OAuth client settings: environment variables win, with the
    /// client secret file as fallback
    fn load_oauth_client(config: &Config) -> Result<OAuthClient> {
        if let (Some(client_id), Some(client_secret)) =
            (&config.oauth_client_id, &config.oauth_client_secret)
        {
            return Ok(OAuthClient {
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
                auth_uri: default_auth_uri(),
                token_uri: default_token_uri(),
            });
        }

        if !config.client_secret_path.exists() {
            return Err(WorkspaceMcpError::Config(ConfigError::MissingOAuthClient {
                vars: "GOOGLE_OAUTH_CLIENT_ID/GOOGLE_OAUTH_CLIENT_SECRET".to_string(),
            }));
        }

        Self::load_client_secret_file(&config.client_secret_path)
    }

    /// Load client configuration from a Google client secret JSON file
    fn load_client_secret_file(path: &Path) -> Result<OAuthClient> {
        let content = std::fs::read_to_string(path).map_err(|_| {
            WorkspaceMcpError::Auth(AuthError::ClientSecretNotFound {
                path: path.display().to_string(),
            })
        })?;
        let file: ClientSecretFile = serde_json::from_str(&content)?;

        file.installed
            .ok_or_else(|| WorkspaceMcpError::Auth(AuthError::InvalidClientSecret))
    }

    /// Load stored credentials from file
    async fn load_credentials(&self) -> Result<StoredCredentials> {
        let content = tokio::fs::read_to_string(&self.config.credentials_path).await?;
        let creds: StoredCredentials = serde_json::from_str(&content)?;
        Ok(creds)
    }

    /// Save credentials to file
    async fn save_credentials(&self, credentials: &StoredCredentials) -> Result<()> {
        let content = serde_json::to_string_pretty(credentials)?;
        tokio::fs::write(&self.config.credentials_path, content).await?;
        Ok(())
    }

    /// Check if we have stored credentials
    pub async fn is_authenticated(&self) -> bool {
        self.credentials.read().await.is_some()
    }

    /// Get a valid access token, refreshing if necessary.
    ///
    /// This is the `ensure_valid_credential` contract: a missing credential,
    /// or an expired one with no refresh path, fails with `AuthRequired`
    /// rather than silently returning a stale token.
    pub async fn access_token(&self) -> Result<String> {
        // The read guard must be released before refreshing, which takes
        // the write lock
        let (token, needs_refresh) = {
            let creds = self.credentials.read().await;
            match creds.as_ref() {
                None => {
                    return Err(WorkspaceMcpError::Auth(AuthError::AuthRequired {
                        reason: "no stored credentials".to_string(),
                    }))
                }
                Some(c) => {
                    let expiring = c
                        .expiry
                        .is_some_and(|e| e - unix_now() < REFRESH_MARGIN_SECS);
                    (c.access_token.clone(), expiring)
                }
            }
        };

        if needs_refresh {
            return self.refresh_token().await;
        }

        Ok(token)
    }

    /// Refresh the access token using the refresh token
    async fn refresh_token(&self) -> Result<String> {
        let creds = self.credentials.read().await;
        let refresh_token = creds.as_ref().and_then(|c| c.refresh_token.clone());
        drop(creds);

        let Some(refresh_token) = refresh_token else {
            return Err(WorkspaceMcpError::Auth(AuthError::AuthRequired {
                reason: "access token expired and no refresh token is stored".to_string(),
            }));
        };

        let params = [
            ("client_id", self.client.client_id.as_str()),
            ("client_secret", self.client.client_secret.as_str()),
            ("refresh_token", refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .http_client
            .post(&self.client.token_uri)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            // A rejected refresh token means the grant was revoked; the user
            // has to go through the consent flow again.
            if status.as_u16() == 400 || status.as_u16() == 401 {
                return Err(WorkspaceMcpError::Auth(AuthError::AuthRequired {
                    reason: format!("token refresh rejected ({}): {}", status, text),
                }));
            }
            return Err(WorkspaceMcpError::Auth(AuthError::TokenRefreshFailed {
                message: text,
            }));
        }

        let token_response: TokenResponse = response.json().await?;
        let new_credentials = merge_token_response(token_response, Some(refresh_token));

        self.save_credentials(&new_credentials).await?;
        let access_token = new_credentials.access_token.clone();
        *self.credentials.write().await = Some(new_credentials);

        tracing::info!("Access token refreshed");
        Ok(access_token)
    }

    /// Generate the authorization URL
    pub fn generate_auth_url(&self) -> String {
        let scopes = self.config.scopes.join(" ");
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            self.client.auth_uri,
            urlencoding::encode(&self.client.client_id),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode(&scopes)
        )
    }

    /// Exchange an authorization code for tokens
    pub async fn exchange_code(&self, code: &str) -> Result<StoredCredentials> {
        let params = [
            ("client_id", self.client.client_id.as_str()),
            ("client_secret", self.client.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.client.token_uri)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(WorkspaceMcpError::Auth(AuthError::TokenExchangeFailed {
                message: text,
            }));
        }

        let token_response: TokenResponse = response.json().await?;
        let credentials = merge_token_response(token_response, None);

        self.save_credentials(&credentials).await?;
        *self.credentials.write().await = Some(credentials.clone());

        Ok(credentials)
    }

    /// Wait for the authorization code on a single-shot local callback
    /// listener, then exchange it for tokens.
    ///
    /// The listener binds the configured port and is released once the
    /// callback arrives or the flow times out.
    async fn wait_for_callback(&self) -> Result<()> {
        use axum::{extract::Query, response::Html, routing::get, Router};
        use std::collections::HashMap;
        use tokio::sync::oneshot;

        let (tx, rx) = oneshot::channel::<String>();
        let tx = Arc::new(std::sync::Mutex::new(Some(tx)));

        let tx_clone = tx.clone();
        let callback_handler = move |Query(params): Query<HashMap<String, String>>| async move {
            if let Some(code) = params.get("code") {
                if let Some(tx) = tx_clone.lock().unwrap().take() {
                    let _ = tx.send(code.clone());
                }
                Html("<html><body><h1>Authentication successful!</h1><p>You can close this window.</p></body></html>")
            } else {
                Html("<html><body><h1>Authentication failed</h1><p>No authorization code received.</p></body></html>")
            }
        };

        let app = Router::new().route("/oauth2callback", get(callback_handler));

        let addr = std::net::SocketAddr::from(([127, 0, 0, 1], self.config.port));
        let listener = tokio::net::TcpListener::bind(addr).await?;

        tracing::info!("Waiting for authentication callback on port {}", self.config.port);

        let server = std::future::IntoFuture::into_future(axum::serve(listener, app));

        tokio::select! {
            result = server => {
                if let Err(e) = result {
                    return Err(WorkspaceMcpError::Auth(AuthError::CallbackError {
                        message: e.to_string(),
                    }));
                }
                Err(WorkspaceMcpError::Auth(AuthError::NoAuthCode))
            }
            code = rx => {
                match code {
                    Ok(code) => {
                        tracing::info!("Received authorization code, exchanging for tokens");
                        self.exchange_code(&code).await?;
                        Ok(())
                    }
                    Err(_) => Err(WorkspaceMcpError::Auth(AuthError::NoAuthCode)),
                }
            }
            _ = tokio::time::sleep(Duration::from_secs(FLOW_TIMEOUT_SECS)) => {
                Err(WorkspaceMcpError::Auth(AuthError::FlowTimeout {
                    secs: FLOW_TIMEOUT_SECS,
                }))
            }
        }
    }

    /// Run the interactive authentication flow, blocking until tokens are
    /// stored or the flow times out
    pub async fn authenticate_interactive(&self) -> Result<()> {
        let auth_url = self.generate_auth_url();
        eprintln!("\nPlease visit this URL to authenticate:");
        eprintln!("{}\n", auth_url);

        if let Err(e) = open::that(&auth_url) {
            eprintln!("Could not open browser automatically: {}", e);
            eprintln!("Please open the URL manually.");
        }

        self.wait_for_callback().await
    }

    /// Begin the authentication flow without blocking the caller: arms the
    /// callback listener in the background and returns the URL to visit.
    ///
    /// Used by the `start_google_auth` tool so the MCP request loop stays
    /// responsive while the user completes the consent screen.
    pub fn start_auth_flow(self: &Arc<Self>) -> String {
        let auth_url = self.generate_auth_url();

        if let Err(e) = open::that(&auth_url) {
            tracing::debug!("Could not open browser automatically: {}", e);
        }

        let auth = Arc::clone(self);
        tokio::spawn(async move {
            match auth.wait_for_callback().await {
                Ok(()) => tracing::info!("Authentication completed successfully"),
                Err(e) => tracing::error!("Authentication flow failed: {}", e),
            }
        });

        auth_url
    }
}
