//! Google Docs and Drive API types
//!
//! Serde mappings for the subset of the Docs document model and Drive
//! comment resources this server touches.

use serde::{Deserialize, Serialize};

// ==================== Docs document model ====================

/// A Google Docs document as returned by `documents.get`
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Document ID
    #[serde(default)]
    pub document_id: String,

    /// Document title
    #[serde(default)]
    pub title: String,

    /// Main document body (legacy single-tab documents)
    pub body: Option<Body>,

    /// Document tabs (present when requested with includeTabsContent)
    #[serde(default)]
    pub tabs: Vec<Tab>,

    /// Inline objects (images) keyed by object ID
    #[serde(default)]
    pub inline_objects: std::collections::HashMap<String, InlineObject>,
}

/// A tab within a document
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    #[serde(default)]
    pub tab_properties: TabProperties,

    /// Content of a document tab
    pub document_tab: Option<DocumentTab>,

    /// Nested subtabs
    #[serde(default)]
    pub child_tabs: Vec<Tab>,
}

/// Identifying properties of a tab
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TabProperties {
    #[serde(default)]
    pub tab_id: String,

    pub title: Option<String>,

    #[serde(default)]
    pub index: i64,
}

/// The body content of a tab
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTab {
    pub body: Option<Body>,

    /// Tab-scoped inline objects; falls back to document-level ones
    #[serde(default)]
    pub inline_objects: std::collections::HashMap<String, InlineObject>,
}

/// A body: a sequence of structural elements
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    #[serde(default)]
    pub content: Vec<StructuralElement>,
}

/// One structural element of a body (paragraph, table, ...)
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StructuralElement {
    pub start_index: Option<i64>,
    pub end_index: Option<i64>,
    pub paragraph: Option<Paragraph>,
    pub table: Option<Table>,
    pub section_break: Option<serde_json::Value>,
    pub table_of_contents: Option<serde_json::Value>,
}

/// A paragraph and its layout bullet, if any
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Paragraph {
    #[serde(default)]
    pub elements: Vec<ParagraphElement>,
    pub bullet: Option<Bullet>,
}

/// Bullet / numbering info attached to a paragraph
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Bullet {
    pub list_id: Option<String>,
    #[serde(default)]
    pub nesting_level: i64,
}

/// One inline element of a paragraph
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphElement {
    pub text_run: Option<TextRun>,
    pub inline_object_element: Option<InlineObjectElement>,
    pub page_break: Option<serde_json::Value>,
    pub column_break: Option<serde_json::Value>,
    pub footnote_reference: Option<FootnoteReference>,
    pub horizontal_rule: Option<serde_json::Value>,
    pub equation: Option<serde_json::Value>,
    pub person: Option<Person>,
}

/// A run of text with uniform styling
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TextRun {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub text_style: TextStyle,
}

/// Styling applied to a text run
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub strikethrough: bool,
    pub link: Option<Link>,
    /// Person smart chip (mention)
    pub person_properties: Option<PersonProperties>,
    /// Rich link smart chip (Drive file links, etc.)
    pub rich_link_properties: Option<RichLinkProperties>,
}

/// A hyperlink
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub url: Option<String>,
}

/// Properties of a person mention
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PersonProperties {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Properties of a rich link chip
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RichLinkProperties {
    pub title: Option<String>,
    pub uri: Option<String>,
    pub mime_type: Option<String>,
}

/// Reference to an inline object (image)
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct InlineObjectElement {
    #[serde(default)]
    pub inline_object_id: String,
}

/// A footnote reference marker
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FootnoteReference {
    pub footnote_id: Option<String>,
    pub footnote_number: Option<String>,
}

/// A person element in paragraph content
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub person_id: Option<String>,
    #[serde(default)]
    pub person_properties: PersonProperties,
}

/// An inline object (image) definition
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct InlineObject {
    #[serde(default)]
    pub inline_object_properties: InlineObjectProperties,
}

/// Properties wrapper of an inline object
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct InlineObjectProperties {
    #[serde(default)]
    pub embedded_object: EmbeddedObject,
}

/// The embedded object payload of an inline object
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedObject {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub image_properties: ImageProperties,
}

/// Image-specific properties
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ImageProperties {
    pub content_uri: Option<String>,
}

/// A table
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    #[serde(default)]
    pub table_rows: Vec<TableRow>,
}

/// A table row
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    #[serde(default)]
    pub table_cells: Vec<TableCell>,
}

/// A table cell; its content is a nested body
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TableCell {
    #[serde(default)]
    pub content: Vec<StructuralElement>,
}

// ==================== Docs batchUpdate requests ====================

/// `documents.batchUpdate` request body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateRequest {
    pub requests: Vec<DocsRequest>,
}

/// One update request; only insertText is needed here
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insert_text: Option<InsertTextRequest>,
}

/// Insert text at a location within a tab
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertTextRequest {
    pub location: Location,
    pub text: String,
}

/// An index within a specific tab
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub index: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<String>,
}

// ==================== Drive comment resources ====================

/// Response of Drive `comments.list`
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CommentList {
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// A Drive comment on a file
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: Author,
    #[serde(default)]
    pub created_time: String,
    #[serde(default)]
    pub modified_time: String,
    #[serde(default)]
    pub resolved: bool,
    #[serde(default)]
    pub replies: Vec<Reply>,
}

/// A reply to a comment
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: Author,
    #[serde(default)]
    pub created_time: String,
    #[serde(default)]
    pub modified_time: String,
}

/// The author of a comment or reply
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub display_name: Option<String>,
}

/// Body for Drive `comments.create` and `replies.create`
#[derive(Debug, Clone, Serialize)]
pub struct CommentBody {
    pub content: String,
}
