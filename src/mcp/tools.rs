//! MCP Tool definitions and handlers
//!
//! Defines all available tools and their implementations. The registered
//! set is fixed at construction; a `--tools` subset restricts it further,
//! and anything outside the subset is indistinguishable from an unknown
//! tool at invocation time.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{McpError, Result, WorkspaceMcpError};
use crate::google::client::WorkspaceClient;
use crate::google::content::{
    describe_tabs, end_insert_index, extract_tab_id_from_url, find_subtab, find_tab_by_id,
    find_tabs_by_name, render_tab_body, TabMatch,
};
use crate::google::types::{Document, Tab};
use crate::mcp::types::{CallToolResult, Tool};

/// Names of every tool this server can expose
pub const ALL_TOOLS: &[&str] = &[
    "start_google_auth",
    "list_doc_tabs",
    "get_tab_content",
    "edit_tab_content",
    "read_doc_comments",
    "reply_to_comment",
    "create_doc_comment",
];

/// Tool handler
pub struct ToolHandler {
    client: Arc<WorkspaceClient>,

    /// Registered tool names; invocations outside this set fail as unknown
    registered: HashSet<String>,
}

impl ToolHandler {
    /// Create a handler exposing every tool
    pub fn new(client: Arc<WorkspaceClient>) -> Self {
        Self::with_tools(client, ALL_TOOLS.iter().map(|s| s.to_string()))
    }

    /// Create a handler exposing only the given subset of tools
    pub fn with_tools(client: Arc<WorkspaceClient>, tools: impl IntoIterator<Item = String>) -> Self {
        let registered: HashSet<String> = tools
            .into_iter()
            .filter(|name| ALL_TOOLS.contains(&name.as_str()))
            .collect();

        Self { client, registered }
    }

    /// Whether a tool name is registered
    pub fn is_registered(&self, name: &str) -> bool {
        self.registered.contains(name)
    }

    /// List all registered tools
    pub fn list_tools(&self) -> Vec<Tool> {
        let all = vec![
            tool_def(
                "start_google_auth",
                "Begins the Google OAuth flow: returns the authorization URL and waits for the browser callback in the background",
                json!({"type": "object", "properties": {}}),
            ),
            tool_def(
                "list_doc_tabs",
                "Lists the tab and subtab structure of a Google Doc (IDs, titles, indices)",
                document_id_schema(),
            ),
            tool_def(
                "get_tab_content",
                "Retrieves the text content of a specific tab or subtab of a Google Doc",
                get_tab_content_schema(),
            ),
            tool_def(
                "edit_tab_content",
                "Inserts text into a specific tab of a Google Doc at the beginning or end",
                edit_tab_content_schema(),
            ),
            tool_def(
                "read_doc_comments",
                "Reads all comments and replies on a Google Doc",
                document_id_schema(),
            ),
            tool_def(
                "reply_to_comment",
                "Replies to a specific comment on a Google Doc",
                reply_to_comment_schema(),
            ),
            tool_def(
                "create_doc_comment",
                "Creates a new comment on a Google Doc",
                create_doc_comment_schema(),
            ),
        ];

        all.into_iter()
            .filter(|t| self.registered.contains(&t.name))
            .collect()
    }

    /// Call a tool by name
    pub async fn call_tool(&self, name: &str, args: Value) -> CallToolResult {
        if !self.registered.contains(name) {
            return CallToolResult::error(
                WorkspaceMcpError::Mcp(McpError::UnknownTool {
                    name: name.to_string(),
                })
                .to_string(),
            );
        }

        let result = match name {
            "start_google_auth" => self.handle_start_google_auth().await,
            "list_doc_tabs" => self.handle_list_doc_tabs(args).await,
            "get_tab_content" => self.handle_get_tab_content(args).await,
            "edit_tab_content" => self.handle_edit_tab_content(args).await,
            "read_doc_comments" => self.handle_read_doc_comments(args).await,
            "reply_to_comment" => self.handle_reply_to_comment(args).await,
            "create_doc_comment" => self.handle_create_doc_comment(args).await,
            _ => Err(WorkspaceMcpError::Mcp(McpError::UnknownTool {
                name: name.to_string(),
            })),
        };

        match result {
            Ok(text) => CallToolResult::text(text),
            // Wrap with the tool name for traceability; the underlying
            // Google API error text passes through verbatim.
            Err(e) => CallToolResult::error(format!("{}: {}", name, e)),
        }
    }

    // ==================== Tool Handlers ====================

    async fn handle_start_google_auth(&self) -> Result<String> {
        let auth_url = self.client.authenticator().start_auth_flow();
        Ok(format!(
            "Authorization flow started. Visit this URL to grant access:\n\n{}\n\n\
             The local callback listener will capture the result and store the credentials.",
            auth_url
        ))
    }

    async fn handle_list_doc_tabs(&self, args: Value) -> Result<String> {
        let args: DocumentIdArgs = parse_args(args)?;
        let document = self.client.get_document(&args.document_id).await?;

        if document.tabs.is_empty() {
            return Ok(format!(
                "Document \"{}\" ({}) has no tabs.",
                document.title, args.document_id
            ));
        }

        Ok(format!(
            "{}\n\nTabs in this document:\n{}",
            document_header(&document, &args.document_id),
            describe_tabs(&document.tabs)
        ))
    }

    async fn handle_get_tab_content(&self, args: Value) -> Result<String> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Args {
            document_id: String,
            tab_identifier: String,
            parent_tab_id: Option<String>,
            #[serde(default)]
            search_by_name: bool,
        }

        let args: Args = parse_args(args)?;
        let tab_id = extract_tab_id_from_url(&args.tab_identifier);

        tracing::info!(
            "Getting content for document {}, tab {}",
            args.document_id,
            tab_id
        );

        let document = self.client.get_document(&args.document_id).await?;
        let header = document_header(&document, &args.document_id);

        if args.search_by_name {
            let matches = find_tabs_by_name(&document.tabs, &tab_id);
            if matches.is_empty() {
                return Ok(format!(
                    "{}\n\nNo tabs matched the name \"{}\".\n\nAvailable tabs:\n{}",
                    header,
                    tab_id,
                    describe_tabs(&document.tabs)
                ));
            }

            let mut parts = vec![header, String::new()];
            parts.push(format!("Found {} match(es) by name:", matches.len()));
            for (i, m) in matches.iter().enumerate() {
                parts.push(String::new());
                parts.push(format!("Match {}:", i + 1));
                parts.push(render_tab_match(m, &document));
            }
            return Ok(parts.join("\n"));
        }

        let found = match args.parent_tab_id.as_deref() {
            Some(parent_id) => find_subtab(&document.tabs, parent_id, &tab_id),
            None => find_tab_by_id(&document.tabs, &tab_id),
        };

        match found {
            Some(m) => Ok(format!(
                "{}\n\n{}",
                header,
                render_tab_match(&m, &document)
            )),
            None => Ok(format!(
                "{}\n\nTab not found: {}\n\nAvailable tabs:\n{}",
                header,
                tab_id,
                describe_tabs(&document.tabs)
            )),
        }
    }

    async fn handle_edit_tab_content(&self, args: Value) -> Result<String> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Args {
            document_id: String,
            tab_identifier: String,
            content_to_add: String,
            #[serde(default = "default_position")]
            position: String,
            parent_tab_id: Option<String>,
            #[serde(default)]
            search_by_name: bool,
        }

        fn default_position() -> String {
            "end".to_string()
        }

        let args: Args = parse_args(args)?;
        let tab_id = extract_tab_id_from_url(&args.tab_identifier);

        // Fetch fresh: insertion indices must not come from a stale cache
        let document = self.client.fetch_document(&args.document_id, true).await?;

        let found = if args.search_by_name {
            find_tabs_by_name(&document.tabs, &tab_id).into_iter().next()
        } else {
            match args.parent_tab_id.as_deref() {
                Some(parent_id) => find_subtab(&document.tabs, parent_id, &tab_id),
                None => find_tab_by_id(&document.tabs, &tab_id),
            }
        };

        let Some(found) = found else {
            return Ok(format!(
                "Tab '{}' not found in document {}.\n\nAvailable tabs:\n{}",
                args.tab_identifier,
                args.document_id,
                describe_tabs(&document.tabs)
            ));
        };

        let resolved_tab_id = found.tab.tab_properties.tab_id.clone();
        let tab_body = tab_content(found.tab);

        let (index, text) = match args.position.as_str() {
            "end" => {
                let index = end_insert_index(tab_body);
                let text = if index > 1 {
                    format!("\n{}", args.content_to_add)
                } else {
                    args.content_to_add.clone()
                };
                (index, text)
            }
            "beginning" => (1, args.content_to_add.clone()),
            other => {
                return Err(WorkspaceMcpError::Mcp(McpError::InvalidArguments {
                    message: format!("position '{}' not supported, use 'end' or 'beginning'", other),
                }))
            }
        };

        self.client
            .insert_tab_text(&args.document_id, &resolved_tab_id, index, &text)
            .await?;

        Ok(format!(
            "Successfully added content to tab '{}' (ID: {}) at position '{}' in document {}.",
            found.title(),
            resolved_tab_id,
            args.position,
            args.document_id
        ))
    }

    async fn handle_read_doc_comments(&self, args: Value) -> Result<String> {
        let args: DocumentIdArgs = parse_args(args)?;
        let comments = self.client.list_comments(&args.document_id).await?;

        if comments.is_empty() {
            return Ok(format!("No comments found in document {}", args.document_id));
        }

        let mut output = vec![format!(
            "Found {} comments in document {}:\n",
            comments.len(),
            args.document_id
        )];

        for comment in &comments {
            let status = if comment.resolved { " [RESOLVED]" } else { "" };
            output.push(format!("Comment ID: {}", comment.id));
            output.push(format!(
                "Author: {}",
                comment.author.display_name.as_deref().unwrap_or("Unknown")
            ));
            output.push(format!("Created: {}{}", comment.created_time, status));
            output.push(format!("Content: {}", comment.content));

            if !comment.replies.is_empty() {
                output.push(format!("  Replies ({}):", comment.replies.len()));
                for reply in &comment.replies {
                    output.push(format!("    Reply ID: {}", reply.id));
                    output.push(format!(
                        "    Author: {}",
                        reply.author.display_name.as_deref().unwrap_or("Unknown")
                    ));
                    output.push(format!("    Created: {}", reply.created_time));
                    output.push(format!("    Content: {}", reply.content));
                }
            }

            output.push(String::new());
        }

        Ok(output.join("\n"))
    }

    async fn handle_reply_to_comment(&self, args: Value) -> Result<String> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Args {
            document_id: String,
            comment_id: String,
            reply_content: String,
        }

        let args: Args = parse_args(args)?;
        let reply = self
            .client
            .create_reply(&args.document_id, &args.comment_id, &args.reply_content)
            .await?;

        Ok(format!(
            "Reply posted successfully!\nReply ID: {}\nAuthor: {}\nCreated: {}\nContent: {}",
            reply.id,
            reply.author.display_name.as_deref().unwrap_or("Unknown"),
            reply.created_time,
            args.reply_content
        ))
    }

    async fn handle_create_doc_comment(&self, args: Value) -> Result<String> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Args {
            document_id: String,
            comment_content: String,
        }

        let args: Args = parse_args(args)?;
        let comment = self
            .client
            .create_comment(&args.document_id, &args.comment_content)
            .await?;

        Ok(format!(
            "Comment created successfully!\nComment ID: {}\nAuthor: {}\nCreated: {}\nContent: {}",
            comment.id,
            comment.author.display_name.as_deref().unwrap_or("Unknown"),
            comment.created_time,
            args.comment_content
        ))
    }
}

/// Arguments common to tools that take only a document ID
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentIdArgs {
    document_id: String,
}

fn parse_args<T: serde::de::DeserializeOwned>(args: Value) -> Result<T> {
    serde_json::from_value(args).map_err(|e| {
        WorkspaceMcpError::Mcp(McpError::InvalidArguments {
            message: e.to_string(),
        })
    })
}

fn document_header(document: &Document, document_id: &str) -> String {
    format!(
        "File: \"{}\" (ID: {})\nLink: https://docs.google.com/document/d/{}/edit",
        document.title, document_id, document_id
    )
}

/// The structural elements of a tab's body, or an empty slice
fn tab_content(tab: &Tab) -> &[crate::google::types::StructuralElement] {
    tab.document_tab
        .as_ref()
        .and_then(|dt| dt.body.as_ref())
        .map(|b| b.content.as_slice())
        .unwrap_or(&[])
}

fn render_tab_match(m: &TabMatch<'_>, document: &Document) -> String {
    let props = &m.tab.tab_properties;
    let mut parts = Vec::new();

    if let Some(parent) = m.parent {
        parts.push(format!("--- SUBTAB: {} ---", props.tab_id));
        parts.push(format!(
            "Parent Tab: {} (ID: {})",
            parent.tab_properties.title.as_deref().unwrap_or("Untitled Tab"),
            parent.tab_properties.tab_id
        ));
    } else {
        parts.push(format!("--- TAB: {} ---", props.tab_id));
    }
    parts.push(format!("Title: {}", m.title()));
    parts.push(format!("Index: {}", props.index));
    parts.push(String::new());
    parts.push("--- TAB CONTENT ---".to_string());

    let rendered = render_tab_body(m.tab, &document.inline_objects);
    if rendered.is_empty() {
        parts.push("No content found in this tab.".to_string());
    } else {
        parts.extend(rendered);
    }

    if !m.tab.child_tabs.is_empty() {
        parts.push(String::new());
        parts.push("--- SUBTABS ---".to_string());
        for child in &m.tab.child_tabs {
            parts.push(format!(
                "  - Subtab ID: {} | Title: \"{}\"",
                child.tab_properties.tab_id,
                child.tab_properties.title.as_deref().unwrap_or("Untitled Subtab")
            ));
        }
    }

    parts.join("\n")
}

// ==================== Tool Schemas ====================

fn tool_def(name: &str, description: &str, schema: Value) -> Tool {
    Tool {
        name: name.to_string(),
        description: Some(description.to_string()),
        input_schema: schema,
    }
}

fn document_id_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "documentId": {
                "type": "string",
                "description": "The ID of the Google Document"
            }
        },
        "required": ["documentId"]
    })
}

fn get_tab_content_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "documentId": {
                "type": "string",
                "description": "The ID of the Google Document"
            },
            "tabIdentifier": {
                "type": "string",
                "description": "Tab ID, tab name, or a Google Docs URL with a tab parameter"
            },
            "parentTabId": {
                "type": "string",
                "description": "Parent tab ID, required when addressing a subtab by ID"
            },
            "searchByName": {
                "type": "boolean",
                "description": "Treat tabIdentifier as a name and match case-insensitively"
            }
        },
        "required": ["documentId", "tabIdentifier"]
    })
}

fn edit_tab_content_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "documentId": {
                "type": "string",
                "description": "The ID of the Google Document"
            },
            "tabIdentifier": {
                "type": "string",
                "description": "Tab ID, tab name, or a Google Docs URL with a tab parameter"
            },
            "contentToAdd": {
                "type": "string",
                "description": "The text to insert into the tab"
            },
            "position": {
                "type": "string",
                "enum": ["end", "beginning"],
                "description": "Where to insert the content (default: end)"
            },
            "parentTabId": {
                "type": "string",
                "description": "Parent tab ID, required when addressing a subtab by ID"
            },
            "searchByName": {
                "type": "boolean",
                "description": "Treat tabIdentifier as a name and match case-insensitively"
            }
        },
        "required": ["documentId", "tabIdentifier", "contentToAdd"]
    })
}

fn reply_to_comment_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "documentId": {
                "type": "string",
                "description": "The ID of the Google Document"
            },
            "commentId": {
                "type": "string",
                "description": "The ID of the comment to reply to"
            },
            "replyContent": {
                "type": "string",
                "description": "The content of the reply"
            }
        },
        "required": ["documentId", "commentId", "replyContent"]
    })
}

fn create_doc_comment_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "documentId": {
                "type": "string",
                "description": "The ID of the Google Document"
            },
            "commentContent": {
                "type": "string",
                "description": "The content of the comment"
            }
        },
        "required": ["documentId", "commentContent"]
    })
}
