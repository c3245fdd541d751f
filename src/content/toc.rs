use crate::content::collection::ContentDocument;
use comrak::nodes::{AstNode, NodeValue};
use comrak::{parse_document, Arena, Options};
use serde::Serialize;

/// Formatter for the link of a matched TOC entry
pub type LinkFormatter<'a> = &'a dyn Fn(&ContentDocument) -> String;

/// One entry of the docs navigation tree
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TocEntry {
    pub id: String,
    pub label: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TocEntry>,
}

/// Build the navigation tree for a documentation collection
///
/// `toc_markdown` is a nested-list markdown document. Each item naming a
/// `.md` file is resolved against `documents` by id-suffix match; matched
/// entries take label/title/link from the document (label prefers the
/// short name, then the title), unmatched entries keep the literal text
/// with no link. The fallback is intentional: a TOC may reference pages
/// that are not published.
pub fn build_toc_tree(
    toc_markdown: &str,
    documents: &[ContentDocument],
    link_formatter: Option<LinkFormatter>,
) -> Vec<TocEntry> {
    let arena = Arena::new();
    let root = parse_document(&arena, toc_markdown, &Options::default());

    // The first list in the document is the TOC; surrounding headings and
    // prose are ignored
    let Some(list) = first_list(root) else {
        return Vec::new();
    };

    list_entries(list, documents, link_formatter)
}

fn first_list<'a>(root: &'a AstNode<'a>) -> Option<&'a AstNode<'a>> {
    root.children()
        .find(|n| matches!(n.data.borrow().value, NodeValue::List(_)))
}

/// Entries of one list node, in document order
fn list_entries<'a>(
    list: &'a AstNode<'a>,
    documents: &[ContentDocument],
    link_formatter: Option<LinkFormatter>,
) -> Vec<TocEntry> {
    list.children()
        .filter(|n| matches!(n.data.borrow().value, NodeValue::Item(_)))
        .map(|item| item_entry(item, documents, link_formatter))
        .collect()
}

/// A single list item: its own text plus an optional nested sublist
fn item_entry<'a>(
    item: &'a AstNode<'a>,
    documents: &[ContentDocument],
    link_formatter: Option<LinkFormatter>,
) -> TocEntry {
    let text = item_text(item);

    let children = item
        .children()
        .find(|n| matches!(n.data.borrow().value, NodeValue::List(_)))
        .map(|list| list_entries(list, documents, link_formatter))
        .unwrap_or_default();

    let mut entry = TocEntry {
        id: text.clone(),
        label: text.clone(),
        title: text.clone(),
        link: None,
        children,
    };

    if text.ends_with(".md") {
        if let Some(doc) = documents.iter().find(|d| d.id.ends_with(&text)) {
            entry.id = doc.id.clone();
            entry.label = doc
                .short_name
                .clone()
                .unwrap_or_else(|| doc.title.clone());
            entry.title = doc.title.clone();
            entry.link = Some(match link_formatter {
                Some(format) => format(doc),
                None => format!("/{}", doc.stem),
            });
        }
    }

    entry
}

/// Concatenated text of an item's non-list content, trimmed
fn item_text<'a>(item: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    collect_text(item, &mut text);
    text.trim().to_string()
}

fn collect_text<'a>(node: &'a AstNode<'a>, out: &mut String) {
    for child in node.children() {
        match &child.data.borrow().value {
            // Sublists become child entries, not item text
            NodeValue::List(_) => {}
            NodeValue::Text(t) => out.push_str(t),
            NodeValue::Code(c) => out.push_str(&c.literal),
            NodeValue::SoftBreak | NodeValue::LineBreak => out.push(' '),
            _ => collect_text(child, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, title: &str, short_name: Option<&str>) -> ContentDocument {
        ContentDocument {
            id: id.to_string(),
            stem: id.strip_suffix(".md").unwrap_or(id).to_string(),
            title: title.to_string(),
            short_name: short_name.map(String::from),
            order: None,
            body: String::new(),
        }
    }

    #[test]
    fn test_matched_entry_takes_document_metadata() {
        let documents = vec![doc("docs/guide/intro.md", "Introduction", None)];
        let tree = build_toc_tree("- guide/intro.md\n", &documents, None);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].id, "docs/guide/intro.md");
        assert_eq!(tree[0].title, "Introduction");
        assert_eq!(tree[0].label, "Introduction");
        assert_eq!(tree[0].link.as_deref(), Some("/docs/guide/intro"));
    }

    #[test]
    fn test_label_prefers_short_name() {
        let documents = vec![doc("docs/guide/intro.md", "Introduction", Some("Intro"))];
        let tree = build_toc_tree("- guide/intro.md\n", &documents, None);

        assert_eq!(tree[0].label, "Intro");
        assert_eq!(tree[0].title, "Introduction");
    }

    #[test]
    fn test_unmatched_entry_keeps_literal_text() {
        let tree = build_toc_tree("- guide/missing.md\n", &[], None);

        assert_eq!(tree[0].id, "guide/missing.md");
        assert_eq!(tree[0].title, "guide/missing.md");
        assert_eq!(tree[0].link, None);
    }

    #[test]
    fn test_section_heading_entry_has_no_link() {
        let tree = build_toc_tree("- Getting Started\n", &[], None);

        assert_eq!(tree[0].label, "Getting Started");
        assert_eq!(tree[0].link, None);
    }

    #[test]
    fn test_nested_list_becomes_children() {
        let documents = vec![
            doc("docs/guide/intro.md", "Introduction", None),
            doc("docs/guide/usage.md", "Usage", None),
        ];
        let toc = "- Guide\n  - guide/intro.md\n  - guide/usage.md\n- Reference\n";
        let tree = build_toc_tree(toc, &documents, None);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].label, "Guide");
        assert_eq!(tree[0].children.len(), 2);
        assert_eq!(tree[0].children[0].title, "Introduction");
        assert_eq!(tree[0].children[1].title, "Usage");
        assert_eq!(tree[1].label, "Reference");
        assert!(tree[1].children.is_empty());
    }

    #[test]
    fn test_custom_link_formatter() {
        let documents = vec![doc("docs/guide/intro.md", "Introduction", None)];
        let format = |d: &ContentDocument| format!("/manual/{}", d.stem);
        let tree = build_toc_tree("- guide/intro.md\n", &documents, Some(&format));

        assert_eq!(tree[0].link.as_deref(), Some("/manual/docs/guide/intro"));
    }

    #[test]
    fn test_no_list_in_document() {
        assert!(build_toc_tree("# Only a heading\n", &[], None).is_empty());
    }
}
