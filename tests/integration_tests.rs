//! Integration tests for the Workspace MCP Server
//!
//! These tests verify the MCP protocol handling, the tool registry contract,
//! and the credential requirement - they don't make real API calls.

use std::sync::Arc;

use serde_json::{json, Value};

use workspace_mcp_server::config::Config;
use workspace_mcp_server::google::auth::Authenticator;
use workspace_mcp_server::google::client::WorkspaceClient;
use workspace_mcp_server::mcp::tools::{ToolHandler, ALL_TOOLS};
use workspace_mcp_server::mcp::types::{CallToolResult, ToolResultContent};

/// Build a client against a scratch config dir with no stored credentials
async fn unauthenticated_client() -> Arc<WorkspaceClient> {
    std::env::set_var("GOOGLE_OAUTH_CLIENT_ID", "test-client-id");
    std::env::set_var("GOOGLE_OAUTH_CLIENT_SECRET", "test-client-secret");
    let dir = std::env::temp_dir().join(format!("workspace-mcp-test-{}", std::process::id()));
    std::env::set_var("WORKSPACE_MCP_CONFIG_DIR", &dir);

    let config = Config::new().expect("config");
    let authenticator = Authenticator::new(config).await.expect("authenticator");
    Arc::new(WorkspaceClient::new(authenticator.into()))
}

fn result_text(result: &CallToolResult) -> &str {
    let ToolResultContent::Text { text } = &result.content[0];
    text
}

mod tool_registry_tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_tool_name_is_rejected() {
        let handler = ToolHandler::new(unauthenticated_client().await);
        let result = handler.call_tool("no_such_tool", json!({})).await;

        assert!(result.is_error);
        assert!(result_text(&result).contains("Unknown tool: no_such_tool"));
    }

    #[tokio::test]
    async fn test_all_tools_listed_by_default() {
        let handler = ToolHandler::new(unauthenticated_client().await);
        let tools = handler.list_tools();

        assert_eq!(tools.len(), ALL_TOOLS.len());
        for name in ALL_TOOLS {
            assert!(tools.iter().any(|t| t.name == *name), "missing {}", name);
        }
    }

    #[tokio::test]
    async fn test_tool_subset_restricts_listing() {
        let handler = ToolHandler::with_tools(
            unauthenticated_client().await,
            vec!["read_doc_comments".to_string(), "get_tab_content".to_string()],
        );
        let tools = handler.list_tools();

        assert_eq!(tools.len(), 2);
        assert!(tools.iter().any(|t| t.name == "read_doc_comments"));
        assert!(tools.iter().any(|t| t.name == "get_tab_content"));
    }

    #[tokio::test]
    async fn test_tool_outside_subset_behaves_as_unknown() {
        let handler = ToolHandler::with_tools(
            unauthenticated_client().await,
            vec!["read_doc_comments".to_string()],
        );

        let result = handler
            .call_tool("create_doc_comment", json!({"documentId": "d", "commentContent": "c"}))
            .await;

        assert!(result.is_error);
        assert!(result_text(&result).contains("Unknown tool: create_doc_comment"));
    }

    #[tokio::test]
    async fn test_subset_ignores_invented_tool_names() {
        let handler = ToolHandler::with_tools(
            unauthenticated_client().await,
            vec!["read_doc_comments".to_string(), "made_up_tool".to_string()],
        );

        assert_eq!(handler.list_tools().len(), 1);
        assert!(!handler.is_registered("made_up_tool"));
    }

    #[tokio::test]
    async fn test_invalid_arguments_are_reported() {
        let handler = ToolHandler::new(unauthenticated_client().await);

        // documentId is required
        let result = handler.call_tool("read_doc_comments", json!({})).await;

        assert!(result.is_error);
        assert!(result_text(&result).contains("read_doc_comments"));
    }
}

mod auth_contract_tests {
    use super::*;

    #[tokio::test]
    async fn test_google_backed_tool_requires_auth() {
        let handler = ToolHandler::new(unauthenticated_client().await);

        let result = handler
            .call_tool("read_doc_comments", json!({"documentId": "doc1"}))
            .await;

        assert!(result.is_error);
        assert!(result_text(&result).contains("Authentication required"));
    }

    #[tokio::test]
    async fn test_get_tab_content_requires_auth() {
        let handler = ToolHandler::new(unauthenticated_client().await);

        let result = handler
            .call_tool(
                "get_tab_content",
                json!({"documentId": "doc1", "tabIdentifier": "t.0"}),
            )
            .await;

        assert!(result.is_error);
        assert!(result_text(&result).contains("Authentication required"));
    }

    #[tokio::test]
    async fn test_auth_error_is_wrapped_with_tool_name() {
        let handler = ToolHandler::new(unauthenticated_client().await);

        let result = handler
            .call_tool(
                "edit_tab_content",
                json!({"documentId": "doc1", "tabIdentifier": "t.0", "contentToAdd": "x"}),
            )
            .await;

        assert!(result.is_error);
        assert!(result_text(&result).starts_with("Error: edit_tab_content:"));
    }
}

mod mcp_protocol_tests {
    use super::*;

    fn make_request(id: i64, method: &str, params: Option<Value>) -> Value {
        let mut request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
        });
        if let Some(p) = params {
            request["params"] = p;
        }
        request
    }

    #[test]
    fn test_initialize_request_format() {
        let request = make_request(1, "initialize", Some(json!({
            "protocolVersion": "2024-11-05",
            "clientInfo": {
                "name": "test-client",
                "version": "1.0.0"
            },
            "capabilities": {}
        })));

        assert_eq!(request["method"], "initialize");
        assert_eq!(request["id"], 1);
        assert!(request["params"]["protocolVersion"].is_string());
    }

    #[test]
    fn test_call_tool_request_format() {
        let request = make_request(3, "tools/call", Some(json!({
            "name": "get_tab_content",
            "arguments": {
                "documentId": "doc1",
                "tabIdentifier": "t.0"
            }
        })));

        assert_eq!(request["method"], "tools/call");
        assert_eq!(request["params"]["name"], "get_tab_content");
        assert_eq!(request["params"]["arguments"]["documentId"], "doc1");
    }

    #[test]
    fn test_jsonrpc_response_structure() {
        let response: Value =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":{"tools":[]}}"#).unwrap();

        assert_eq!(response["jsonrpc"], "2.0");
        assert_eq!(response["id"], 1);
        assert!(response["result"].is_object());
        assert!(response["error"].is_null());
    }

    #[test]
    fn test_jsonrpc_error_response_structure() {
        let response: Value = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32601,"message":"Method not found: unknown"}}"#,
        )
        .unwrap();

        assert!(response["result"].is_null());
        assert_eq!(response["error"]["code"], -32601);
    }
}

mod tool_schema_tests {
    use super::*;

    #[tokio::test]
    async fn test_every_tool_has_object_schema() {
        let handler = ToolHandler::new(unauthenticated_client().await);

        for tool in handler.list_tools() {
            assert_eq!(tool.input_schema["type"], "object", "tool {}", tool.name);
            assert!(tool.description.is_some(), "tool {}", tool.name);
        }
    }

    #[tokio::test]
    async fn test_edit_tab_content_schema_requires_content() {
        let handler = ToolHandler::new(unauthenticated_client().await);
        let tool = handler
            .list_tools()
            .into_iter()
            .find(|t| t.name == "edit_tab_content")
            .unwrap();

        let required = tool.input_schema["required"].as_array().unwrap().clone();
        assert!(required.iter().any(|v| v == "documentId"));
        assert!(required.iter().any(|v| v == "tabIdentifier"));
        assert!(required.iter().any(|v| v == "contentToAdd"));
    }
}

mod content_rendering_tests {
    use std::collections::HashMap;

    use workspace_mcp_server::google::content::*;
    use workspace_mcp_server::google::types::*;

    fn text_paragraph(text: &str) -> StructuralElement {
        StructuralElement {
            paragraph: Some(Paragraph {
                elements: vec![ParagraphElement {
                    text_run: Some(TextRun {
                        content: text.to_string(),
                        text_style: TextStyle::default(),
                    }),
                    ..Default::default()
                }],
                bullet: None,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_render_elements_skips_empty_paragraphs() {
        let elements = vec![text_paragraph("first\n"), text_paragraph("\n"), text_paragraph("second\n")];
        let rendered = render_elements(&elements, "", &HashMap::new());
        assert_eq!(rendered, vec!["first", "second"]);
    }

    #[test]
    fn test_render_elements_marks_section_break() {
        let elements = vec![StructuralElement {
            section_break: Some(serde_json::json!({})),
            ..Default::default()
        }];
        let rendered = render_elements(&elements, "", &HashMap::new());
        assert_eq!(rendered, vec!["[SECTION BREAK]"]);
    }

    #[test]
    fn test_tab_id_extraction_round_trip() {
        let url = "https://docs.google.com/document/d/abc/edit?tab=t.99";
        assert_eq!(extract_tab_id_from_url(url), "t.99");
        assert_eq!(extract_tab_id_from_url("t.99"), "t.99");
    }
}
