//! Document content rendering
//!
//! Turns the Docs structural model into readable text for MCP clients, and
//! resolves tab identifiers (IDs, names, URLs) against a document's tab tree.

use std::collections::HashMap;

use crate::google::types::{
    InlineObject, Paragraph, StructuralElement, Tab, Table, TextRun,
};

/// Extract a tab ID from a Google Docs URL, or return the identifier as-is.
///
/// URLs carry the tab as a query parameter:
/// `https://docs.google.com/document/d/.../edit?tab=t.xyz`
pub fn extract_tab_id_from_url(url_or_id: &str) -> String {
    if !url_or_id.starts_with("http") {
        return url_or_id.to_string();
    }

    let query = match url_or_id.split_once('?') {
        Some((_, q)) => q,
        None => return url_or_id.to_string(),
    };

    for pair in query.split('&') {
        if let Some(value) = pair.strip_prefix("tab=") {
            // Strip a fragment if the tab param is the last one
            let value = value.split('#').next().unwrap_or(value);
            return urlencoding::decode(value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string());
        }
    }

    url_or_id.to_string()
}

/// Render a single text run with its styling markers
pub fn render_text_run(run: &TextRun) -> String {
    let content = &run.content;
    let style = &run.text_style;

    // Person smart chips (mentions)
    if let Some(ref person) = style.person_properties {
        let name = person
            .name
            .clone()
            .unwrap_or_else(|| content.trim().to_string());
        return match person.email.as_deref() {
            Some(email) if !email.is_empty() => format!("@{} ({})", name, email),
            _ => format!("@{}", name),
        };
    }

    // Rich link smart chips (Drive file links, etc.)
    if let Some(ref rich) = style.rich_link_properties {
        let title = rich
            .title
            .clone()
            .unwrap_or_else(|| content.trim().to_string());
        return match rich.uri.as_deref() {
            Some(uri) if !uri.is_empty() => match rich.mime_type.as_deref() {
                Some(mime) if !mime.is_empty() => format!("[{}]({}) [{}]", title, uri, mime),
                _ => format!("[{}]({})", title, uri),
            },
            _ => format!("[RICH_LINK: {}]", title),
        };
    }

    // Regular hyperlinks
    if let Some(url) = style.link.as_ref().and_then(|l| l.url.as_deref()) {
        if !url.is_empty() {
            return if content.trim() == url {
                format!("[LINK: {}]", url)
            } else {
                format!("[LINK: {} -> {}]", content.trim(), url)
            };
        }
    }

    let mut markers = Vec::new();
    if style.bold {
        markers.push("**");
    }
    if style.italic {
        markers.push("*");
    }
    if style.underline {
        markers.push("_");
    }
    if style.strikethrough {
        markers.push("~~");
    }

    if markers.is_empty() {
        return content.clone();
    }

    let prefix: String = markers.iter().copied().collect();
    let suffix: String = markers.iter().rev().copied().collect();
    format!("{}{}{}", prefix, content, suffix)
}

/// Render one paragraph, including bullets and inline objects
pub fn render_paragraph(
    paragraph: &Paragraph,
    inline_objects: &HashMap<String, InlineObject>,
) -> String {
    let mut text = String::new();

    for element in &paragraph.elements {
        if let Some(ref run) = element.text_run {
            text.push_str(&render_text_run(run));
        } else if let Some(ref obj) = element.inline_object_element {
            text.push_str(&render_inline_object(&obj.inline_object_id, inline_objects));
        } else if element.page_break.is_some() {
            text.push_str("[PAGE BREAK]");
        } else if element.column_break.is_some() {
            text.push_str("[COLUMN BREAK]");
        } else if let Some(ref footnote) = element.footnote_reference {
            text.push_str(&format!(
                "[FOOTNOTE: {}]",
                footnote.footnote_number.as_deref().unwrap_or("")
            ));
        } else if element.horizontal_rule.is_some() {
            text.push_str("\n---\n");
        } else if element.equation.is_some() {
            text.push_str("[EQUATION]");
        } else if let Some(ref person) = element.person {
            let name = person
                .person_properties
                .name
                .as_deref()
                .unwrap_or("Unknown Person");
            match person.person_properties.email.as_deref() {
                Some(email) if !email.is_empty() => {
                    text.push_str(&format!("@{} ({})", name, email));
                }
                _ => text.push_str(&format!("@{}", name)),
            }
        }
    }

    if let Some(ref bullet) = paragraph.bullet {
        let indent = "  ".repeat(bullet.nesting_level.max(0) as usize);
        text = format!("{}• {}", indent, text);
    }

    text.trim_end_matches('\n').to_string()
}

/// Render an inline object (image) reference
fn render_inline_object(object_id: &str, inline_objects: &HashMap<String, InlineObject>) -> String {
    if let Some(obj) = inline_objects.get(object_id) {
        let embedded = &obj.inline_object_properties.embedded_object;
        if let Some(uri) = embedded.image_properties.content_uri.as_deref() {
            if !uri.is_empty() {
                let alt = embedded
                    .title
                    .clone()
                    .filter(|t| !t.is_empty())
                    .or_else(|| embedded.description.clone().filter(|d| !d.is_empty()))
                    .unwrap_or_else(|| format!("Image {}", object_id));
                return format!("![{}]({})", alt, uri);
            }
        }
    }
    format!("[IMAGE: {}]", object_id)
}

/// Render a table as pipe-delimited rows
pub fn render_table(table: &Table, inline_objects: &HashMap<String, InlineObject>) -> String {
    let mut lines = vec!["\n[TABLE]".to_string()];
    let rows = &table.table_rows;

    for (row_idx, row) in rows.iter().enumerate() {
        let mut cells = Vec::new();
        for cell in &row.table_cells {
            let mut cell_text = Vec::new();
            for element in &cell.content {
                if let Some(ref paragraph) = element.paragraph {
                    let text = render_paragraph(paragraph, inline_objects);
                    if !text.trim().is_empty() {
                        cell_text.push(text);
                    }
                }
            }
            cells.push(cell_text.join(" "));
        }

        lines.push(format!("| {} |", cells.join(" | ")));

        if row_idx == 0 && rows.len() > 1 {
            let separators: Vec<String> = cells.iter().map(|c| "-".repeat(c.len())).collect();
            lines.push(format!("| {} |", separators.join(" | ")));
        }
    }

    lines.push("[/TABLE]\n".to_string());
    lines.join("\n")
}

/// Render a sequence of structural elements (a body or a tab body)
pub fn render_elements(
    elements: &[StructuralElement],
    indent: &str,
    inline_objects: &HashMap<String, InlineObject>,
) -> Vec<String> {
    let mut rendered = Vec::new();

    for element in elements {
        if let Some(ref paragraph) = element.paragraph {
            let text = render_paragraph(paragraph, inline_objects);
            if !text.trim().is_empty() {
                rendered.push(format!("{}{}", indent, text));
            }
        } else if let Some(ref table) = element.table {
            rendered.push(format!(
                "{}{}",
                indent,
                render_table(table, inline_objects)
            ));
        } else if element.section_break.is_some() {
            rendered.push(format!("{}[SECTION BREAK]", indent));
        } else if element.table_of_contents.is_some() {
            rendered.push(format!("{}[TABLE OF CONTENTS]", indent));
        }
    }

    rendered
}

/// Render the body content of a tab, preferring tab-scoped inline objects
/// over document-level ones
pub fn render_tab_body(tab: &Tab, doc_inline_objects: &HashMap<String, InlineObject>) -> Vec<String> {
    let Some(ref document_tab) = tab.document_tab else {
        return Vec::new();
    };

    let inline_objects = if document_tab.inline_objects.is_empty() {
        doc_inline_objects
    } else {
        &document_tab.inline_objects
    };

    match document_tab.body {
        Some(ref body) => render_elements(&body.content, "", inline_objects),
        None => Vec::new(),
    }
}

/// A tab located within the document's tab tree
#[derive(Debug, Clone, Copy)]
pub struct TabMatch<'a> {
    pub tab: &'a Tab,
    /// The parent tab when the match is a subtab
    pub parent: Option<&'a Tab>,
}

impl TabMatch<'_> {
    pub fn title(&self) -> &str {
        self.tab.tab_properties.title.as_deref().unwrap_or("Untitled Tab")
    }
}

/// Find a tab or subtab by exact ID
pub fn find_tab_by_id<'a>(tabs: &'a [Tab], tab_id: &str) -> Option<TabMatch<'a>> {
    for tab in tabs {
        if tab.tab_properties.tab_id == tab_id {
            return Some(TabMatch { tab, parent: None });
        }
        for child in &tab.child_tabs {
            if child.tab_properties.tab_id == tab_id {
                return Some(TabMatch {
                    tab: child,
                    parent: Some(tab),
                });
            }
        }
    }
    None
}

/// Find a subtab by ID restricted to a specific parent tab
pub fn find_subtab<'a>(tabs: &'a [Tab], parent_tab_id: &str, tab_id: &str) -> Option<TabMatch<'a>> {
    let parent = tabs
        .iter()
        .find(|t| t.tab_properties.tab_id == parent_tab_id)?;
    parent
        .child_tabs
        .iter()
        .find(|c| c.tab_properties.tab_id == tab_id)
        .map(|tab| TabMatch {
            tab,
            parent: Some(parent),
        })
}

/// Find tabs and subtabs whose title contains the needle, case-insensitively
pub fn find_tabs_by_name<'a>(tabs: &'a [Tab], needle: &str) -> Vec<TabMatch<'a>> {
    let needle = needle.to_lowercase();
    let mut matches = Vec::new();

    for tab in tabs {
        if let Some(title) = tab.tab_properties.title.as_deref() {
            if title.to_lowercase().contains(&needle) {
                matches.push(TabMatch { tab, parent: None });
            }
        }
        for child in &tab.child_tabs {
            if let Some(title) = child.tab_properties.title.as_deref() {
                if title.to_lowercase().contains(&needle) {
                    matches.push(TabMatch {
                        tab: child,
                        parent: Some(tab),
                    });
                }
            }
        }
    }

    matches
}

/// Describe the document's tab tree: IDs, titles, indices
pub fn describe_tabs(tabs: &[Tab]) -> String {
    let mut lines = Vec::new();
    for tab in tabs {
        let props = &tab.tab_properties;
        lines.push(format!(
            "- Tab ID: {} | Title: \"{}\" | Index: {}",
            props.tab_id,
            props.title.as_deref().unwrap_or("Untitled Tab"),
            props.index
        ));
        for child in &tab.child_tabs {
            let child_props = &child.tab_properties;
            lines.push(format!(
                "  - Subtab ID: {} | Title: \"{}\"",
                child_props.tab_id,
                child_props.title.as_deref().unwrap_or("Untitled Subtab")
            ));
        }
    }
    lines.join("\n")
}

/// Pick a safe index for inserting text at the end of tab content.
///
/// The Docs API rejects insertions at the segment's final newline, so back
/// off from the last paragraph's end index.
pub fn end_insert_index(elements: &[StructuralElement]) -> i64 {
    for element in elements.iter().rev() {
        if element.paragraph.is_some() {
            if let Some(end) = element.end_index {
                return (end - 1).max(1);
            }
        }
    }

    for element in elements.iter().rev() {
        if let Some(end) = element.end_index {
            if end > 10 {
                return (end - 10).max(1);
            }
        }
    }

    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::google::types::*;

    fn run(content: &str, style: TextStyle) -> TextRun {
        TextRun {
            content: content.to_string(),
            text_style: style,
        }
    }

    #[test]
    fn test_extract_tab_id_from_plain_id() {
        assert_eq!(extract_tab_id_from_url("t.abc123"), "t.abc123");
    }

    #[test]
    fn test_extract_tab_id_from_url() {
        let url = "https://docs.google.com/document/d/doc1/edit?tab=t.xyz";
        assert_eq!(extract_tab_id_from_url(url), "t.xyz");
    }

    #[test]
    fn test_extract_tab_id_from_url_with_extra_params() {
        let url = "https://docs.google.com/document/d/doc1/edit?usp=sharing&tab=t.42#heading";
        assert_eq!(extract_tab_id_from_url(url), "t.42");
    }

    #[test]
    fn test_extract_tab_id_url_without_tab_param() {
        let url = "https://docs.google.com/document/d/doc1/edit";
        assert_eq!(extract_tab_id_from_url(url), url);
    }

    #[test]
    fn test_render_plain_text_run() {
        let r = run("hello", TextStyle::default());
        assert_eq!(render_text_run(&r), "hello");
    }

    #[test]
    fn test_render_bold_italic_run() {
        let r = run(
            "hi",
            TextStyle {
                bold: true,
                italic: true,
                ..Default::default()
            },
        );
        assert_eq!(render_text_run(&r), "***hi***");
    }

    #[test]
    fn test_render_link_with_custom_text() {
        let r = run(
            "docs",
            TextStyle {
                link: Some(Link {
                    url: Some("https://example.com".to_string()),
                }),
                ..Default::default()
            },
        );
        assert_eq!(render_text_run(&r), "[LINK: docs -> https://example.com]");
    }

    #[test]
    fn test_render_link_bare_url() {
        let r = run(
            "https://example.com",
            TextStyle {
                link: Some(Link {
                    url: Some("https://example.com".to_string()),
                }),
                ..Default::default()
            },
        );
        assert_eq!(render_text_run(&r), "[LINK: https://example.com]");
    }

    #[test]
    fn test_render_person_mention() {
        let r = run(
            "Ana",
            TextStyle {
                person_properties: Some(PersonProperties {
                    name: Some("Ana".to_string()),
                    email: Some("ana@example.com".to_string()),
                }),
                ..Default::default()
            },
        );
        assert_eq!(render_text_run(&r), "@Ana (ana@example.com)");
    }

    #[test]
    fn test_render_rich_link() {
        let r = run(
            "",
            TextStyle {
                rich_link_properties: Some(RichLinkProperties {
                    title: Some("Spec".to_string()),
                    uri: Some("https://docs.google.com/d/x".to_string()),
                    mime_type: Some("application/vnd.google-apps.document".to_string()),
                }),
                ..Default::default()
            },
        );
        let rendered = render_text_run(&r);
        assert!(rendered.starts_with("[Spec](https://docs.google.com/d/x)"));
        assert!(rendered.contains("application/vnd.google-apps.document"));
    }

    fn paragraph_with_text(text: &str) -> Paragraph {
        Paragraph {
            elements: vec![ParagraphElement {
                text_run: Some(run(text, TextStyle::default())),
                ..Default::default()
            }],
            bullet: None,
        }
    }

    #[test]
    fn test_render_bulleted_paragraph() {
        let mut p = paragraph_with_text("item\n");
        p.bullet = Some(Bullet {
            list_id: Some("list1".to_string()),
            nesting_level: 1,
        });
        assert_eq!(render_paragraph(&p, &HashMap::new()), "  • item");
    }

    #[test]
    fn test_render_image_fallback_without_uri() {
        let p = Paragraph {
            elements: vec![ParagraphElement {
                inline_object_element: Some(InlineObjectElement {
                    inline_object_id: "obj1".to_string(),
                }),
                ..Default::default()
            }],
            bullet: None,
        };
        assert_eq!(render_paragraph(&p, &HashMap::new()), "[IMAGE: obj1]");
    }

    #[test]
    fn test_render_image_with_content_uri() {
        let mut objects = HashMap::new();
        objects.insert(
            "obj1".to_string(),
            InlineObject {
                inline_object_properties: InlineObjectProperties {
                    embedded_object: EmbeddedObject {
                        title: Some("Diagram".to_string()),
                        description: None,
                        image_properties: ImageProperties {
                            content_uri: Some("https://lh3.example/img".to_string()),
                        },
                    },
                },
            },
        );

        let p = Paragraph {
            elements: vec![ParagraphElement {
                inline_object_element: Some(InlineObjectElement {
                    inline_object_id: "obj1".to_string(),
                }),
                ..Default::default()
            }],
            bullet: None,
        };
        assert_eq!(
            render_paragraph(&p, &objects),
            "![Diagram](https://lh3.example/img)"
        );
    }

    fn table_with_rows(rows: Vec<Vec<&str>>) -> Table {
        Table {
            table_rows: rows
                .into_iter()
                .map(|cells| TableRow {
                    table_cells: cells
                        .into_iter()
                        .map(|text| TableCell {
                            content: vec![StructuralElement {
                                paragraph: Some(paragraph_with_text(text)),
                                ..Default::default()
                            }],
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_render_table() {
        let table = table_with_rows(vec![vec!["Name", "Role"], vec!["Ana", "Editor"]]);
        let rendered = render_table(&table, &HashMap::new());
        assert!(rendered.contains("[TABLE]"));
        assert!(rendered.contains("| Name | Role |"));
        assert!(rendered.contains("| Ana | Editor |"));
        assert!(rendered.contains("[/TABLE]"));
    }

    fn tab(id: &str, title: &str, children: Vec<Tab>) -> Tab {
        Tab {
            tab_properties: TabProperties {
                tab_id: id.to_string(),
                title: Some(title.to_string()),
                index: 0,
            },
            document_tab: None,
            child_tabs: children,
        }
    }

    #[test]
    fn test_find_tab_by_id_top_level() {
        let tabs = vec![tab("t.0", "Overview", vec![])];
        let found = find_tab_by_id(&tabs, "t.0").unwrap();
        assert_eq!(found.title(), "Overview");
        assert!(found.parent.is_none());
    }

    #[test]
    fn test_find_tab_by_id_subtab() {
        let tabs = vec![tab("t.0", "Overview", vec![tab("t.1", "Details", vec![])])];
        let found = find_tab_by_id(&tabs, "t.1").unwrap();
        assert_eq!(found.title(), "Details");
        assert_eq!(found.parent.unwrap().tab_properties.tab_id, "t.0");
    }

    #[test]
    fn test_find_subtab_requires_matching_parent() {
        let tabs = vec![
            tab("t.0", "Overview", vec![tab("t.1", "Details", vec![])]),
            tab("t.2", "Appendix", vec![]),
        ];
        assert!(find_subtab(&tabs, "t.0", "t.1").is_some());
        assert!(find_subtab(&tabs, "t.2", "t.1").is_none());
    }

    #[test]
    fn test_find_tabs_by_name_case_insensitive() {
        let tabs = vec![
            tab("t.0", "Planning Notes", vec![tab("t.1", "Notes Archive", vec![])]),
            tab("t.2", "Budget", vec![]),
        ];
        let matches = find_tabs_by_name(&tabs, "notes");
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn test_describe_tabs_lists_subtabs() {
        let tabs = vec![tab("t.0", "Overview", vec![tab("t.1", "Details", vec![])])];
        let description = describe_tabs(&tabs);
        assert!(description.contains("Tab ID: t.0"));
        assert!(description.contains("Subtab ID: t.1"));
    }

    #[test]
    fn test_end_insert_index_uses_last_paragraph() {
        let elements = vec![
            StructuralElement {
                end_index: Some(10),
                paragraph: Some(paragraph_with_text("a")),
                ..Default::default()
            },
            StructuralElement {
                end_index: Some(25),
                paragraph: Some(paragraph_with_text("b")),
                ..Default::default()
            },
        ];
        assert_eq!(end_insert_index(&elements), 24);
    }

    #[test]
    fn test_end_insert_index_empty_body() {
        assert_eq!(end_insert_index(&[]), 1);
    }
}
