//! Google Workspace API client
//!
//! Typed wrappers over the Docs and Drive endpoints this server uses.
//! Upstream failures are propagated with their HTTP status and body intact.

use std::sync::Arc;

use crate::config::google_api::{DOCS_BASE_URL, DRIVE_BASE_URL};
use crate::error::{ApiError, Result, WorkspaceMcpError};
use crate::google::auth::Authenticator;
use crate::google::cache::DocumentCache;
use crate::google::types::*;

/// Fields requested when listing comments
const COMMENT_FIELDS: &str =
    "comments(id,content,author,createdTime,modifiedTime,resolved,replies(id,content,author,createdTime,modifiedTime))";

/// Fields requested when creating a comment or reply
const COMMENT_CREATE_FIELDS: &str = "id,content,author,createdTime,modifiedTime";

/// Workspace API client
pub struct WorkspaceClient {
    /// HTTP client
    http_client: reqwest::Client,

    /// OAuth credential manager
    authenticator: Arc<Authenticator>,

    /// Document cache
    cache: DocumentCache,
}

impl WorkspaceClient {
    /// Create a new Workspace client
    pub fn new(authenticator: Arc<Authenticator>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            authenticator,
            cache: DocumentCache::default(),
        }
    }

    /// The credential manager backing this client
    pub fn authenticator(&self) -> &Arc<Authenticator> {
        &self.authenticator
    }

    /// Get a valid access token
    async fn access_token(&self) -> Result<String> {
        self.authenticator.access_token().await
    }

    /// Map a failed response to an API error, preserving status and body
    async fn upstream_error(response: reqwest::Response) -> WorkspaceMcpError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        WorkspaceMcpError::Api(ApiError::Upstream { status, body })
    }

    // ==================== Docs operations ====================

    /// Fetch a document, bypassing the cache
    pub async fn fetch_document(&self, document_id: &str, include_tabs: bool) -> Result<Document> {
        let token = self.access_token().await?;
        let url = format!(
            "{}/documents/{}?includeTabsContent={}",
            DOCS_BASE_URL, document_id, include_tabs
        );

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else if response.status().as_u16() == 404 {
            Err(WorkspaceMcpError::Api(ApiError::DocumentNotFound {
                document_id: document_id.to_string(),
            }))
        } else {
            Err(Self::upstream_error(response).await)
        }
    }

    /// Get a document with tab content, served from the cache when fresh
    pub async fn get_document(&self, document_id: &str) -> Result<Arc<Document>> {
        if let Some(cached) = self.cache.get(document_id).await {
            tracing::debug!("Using cached content for document {}", document_id);
            return Ok(cached);
        }

        let document = self.fetch_document(document_id, true).await?;
        Ok(self.cache.insert(document_id, document).await)
    }

    /// Insert text into a tab at the given index and invalidate the cached
    /// document
    pub async fn insert_tab_text(
        &self,
        document_id: &str,
        tab_id: &str,
        index: i64,
        text: &str,
    ) -> Result<()> {
        let token = self.access_token().await?;
        let url = format!("{}/documents/{}:batchUpdate", DOCS_BASE_URL, document_id);

        let request = BatchUpdateRequest {
            requests: vec![DocsRequest {
                insert_text: Some(InsertTextRequest {
                    location: Location {
                        index,
                        tab_id: Some(tab_id.to_string()),
                    },
                    text: text.to_string(),
                }),
            }],
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&token)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::upstream_error(response).await);
        }

        self.cache.invalidate(document_id).await;
        Ok(())
    }

    // ==================== Drive comment operations ====================

    /// List all comments on a document, with replies
    pub async fn list_comments(&self, document_id: &str) -> Result<Vec<Comment>> {
        let token = self.access_token().await?;
        let url = format!(
            "{}/files/{}/comments?fields={}",
            DRIVE_BASE_URL,
            document_id,
            urlencoding::encode(COMMENT_FIELDS)
        );

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await?;

        if response.status().is_success() {
            let list: CommentList = response.json().await?;
            Ok(list.comments)
        } else if response.status().as_u16() == 404 {
            Err(WorkspaceMcpError::Api(ApiError::DocumentNotFound {
                document_id: document_id.to_string(),
            }))
        } else {
            Err(Self::upstream_error(response).await)
        }
    }

    /// Create a new top-level comment on a document
    pub async fn create_comment(&self, document_id: &str, content: &str) -> Result<Comment> {
        let token = self.access_token().await?;
        let url = format!(
            "{}/files/{}/comments?fields={}",
            DRIVE_BASE_URL,
            document_id,
            urlencoding::encode(COMMENT_CREATE_FIELDS)
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&token)
            .json(&CommentBody {
                content: content.to_string(),
            })
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(Self::upstream_error(response).await)
        }
    }

    /// Post a reply to an existing comment
    pub async fn create_reply(
        &self,
        document_id: &str,
        comment_id: &str,
        content: &str,
    ) -> Result<Reply> {
        let token = self.access_token().await?;
        let url = format!(
            "{}/files/{}/comments/{}/replies?fields={}",
            DRIVE_BASE_URL,
            document_id,
            comment_id,
            urlencoding::encode(COMMENT_CREATE_FIELDS)
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&token)
            .json(&CommentBody {
                content: content.to_string(),
            })
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else if response.status().as_u16() == 404 {
            Err(WorkspaceMcpError::Api(ApiError::CommentNotFound {
                comment_id: comment_id.to_string(),
            }))
        } else {
            Err(Self::upstream_error(response).await)
        }
    }
}
