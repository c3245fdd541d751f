use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Typed front matter of a content document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub short_name: Option<String>,
    pub order: Option<i64>,
}

/// One markdown document of a content collection
#[derive(Debug, Clone)]
pub struct ContentDocument {
    /// Root-relative path, e.g. `docs/guide/intro.md`
    pub id: String,
    /// `id` without the `.md` extension
    pub stem: String,
    pub title: String,
    pub short_name: Option<String>,
    pub order: Option<i64>,
    /// Markdown body with the front matter stripped
    pub body: String,
}

/// Load every markdown document under `root`
///
/// Documents are ordered by their `order` front matter field, then id.
pub fn load_collection(root: &Path) -> Result<Vec<ContentDocument>> {
    let mut documents = Vec::new();
    visit_dir(root, root, &mut documents)?;
    documents.sort_by(|a, b| {
        let a_key = (a.order.unwrap_or(i64::MAX), &a.id);
        let b_key = (b.order.unwrap_or(i64::MAX), &b.id);
        a_key.cmp(&b_key)
    });
    Ok(documents)
}

/// Find a document by its stem (root-relative path without extension)
pub fn find_by_stem<'a>(
    documents: &'a [ContentDocument],
    stem: &str,
) -> Option<&'a ContentDocument> {
    documents.iter().find(|d| d.stem == stem)
}

fn visit_dir(root: &Path, dir: &Path, documents: &mut Vec<ContentDocument>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            visit_dir(root, &path, documents)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some("md") {
            documents.push(parse_document_file(root, &path)?);
        }
    }
    Ok(())
}

fn parse_document_file(root: &Path, path: &Path) -> Result<ContentDocument> {
    let source = std::fs::read_to_string(path)?;

    let rel = path
        .strip_prefix(root)
        .map_err(|_| Error::Content(format!("{} is outside the content root", path.display())))?;
    let id = rel.to_string_lossy().replace('\\', "/");
    let stem = id.strip_suffix(".md").unwrap_or(&id).to_string();

    let (front, body) = split_front_matter(&source);
    let meta: FrontMatter = match front {
        Some(raw) => serde_yaml::from_str(raw)
            .map_err(|e| Error::Content(format!("invalid front matter in {id}: {e}")))?,
        None => FrontMatter::default(),
    };

    let title = meta
        .title
        .clone()
        .or_else(|| first_heading(body))
        .unwrap_or_else(|| file_stem_title(&stem));

    Ok(ContentDocument {
        id,
        stem,
        title,
        short_name: meta.short_name,
        order: meta.order,
        body: body.to_string(),
    })
}

/// Split an optional leading `---` front matter block off a markdown
/// source, returning the raw YAML (if any) and the remaining body
pub fn split_front_matter(source: &str) -> (Option<&str>, &str) {
    let Some(rest) = source.strip_prefix("---\n") else {
        return (None, source);
    };

    match rest.find("\n---") {
        Some(end) => {
            let front = &rest[..end];
            let body = rest[end + 4..].trim_start_matches('\n');
            (Some(front), body)
        }
        None => (None, source),
    }
}

/// Text of the first `#` heading, if any
fn first_heading(body: &str) -> Option<String> {
    body.lines()
        .find_map(|line| line.strip_prefix("# ").map(|t| t.trim().to_string()))
}

fn file_stem_title(stem: &str) -> String {
    stem.rsplit('/').next().unwrap_or(stem).to_string()
}
