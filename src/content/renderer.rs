use crate::utils::sanitize::clean_markup;
use crate::{Error, Result};
use comrak::adapters::{HeadingAdapter, HeadingMeta};
use comrak::nodes::{AstNode, NodeCodeBlock, NodeValue, Sourcepos};
use comrak::{format_html_with_plugins, parse_document, Arena, Options, Plugins};
use regex::Regex;
use std::io::Write;

/// A renderable fragment produced by `render`, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedNode {
    /// Sanitized HTML markup
    Markup(String),
    /// A fenced code block lifted out of the markup stream
    CodeBlock { code: String, language: String },
}

/// Render markdown into an ordered sequence of `RenderedNode`s
///
/// Two passes: comrak parses the document into an AST (fence bodies and
/// info strings intact), then the top-level blocks are walked to emit
/// sanitized markup fragments and out-of-band code blocks in reading
/// order. A fence nested inside another block is detached and emitted
/// right after that block's markup.
///
/// Empty or whitespace-only markup fragments are dropped; code blocks are
/// kept even when empty.
pub fn render(markdown: &str) -> Result<Vec<RenderedNode>> {
    let arena = Arena::new();
    let options = comrak_options();
    let root = parse_document(&arena, markdown, &options);

    let mut nodes = Vec::new();
    let mut markup = String::new();

    for block in root.children() {
        if let Some(code) = fenced_code(block) {
            flush_markup(&mut markup, &mut nodes);
            nodes.push(code);
            continue;
        }

        let nested = detach_nested_fences(block);
        markup.push_str(&format_block(block, &options)?);

        if !nested.is_empty() {
            flush_markup(&mut markup, &mut nodes);
            nodes.extend(nested);
        }
    }

    flush_markup(&mut markup, &mut nodes);
    Ok(nodes)
}

/// Stable heading id: lowercase, strip everything outside word
/// characters/whitespace/hyphens, collapse whitespace runs to one hyphen
pub fn heading_slug(text: &str) -> String {
    let strip = Regex::new(r"[^\w\s-]").unwrap();
    let collapse = Regex::new(r"\s+").unwrap();

    let lowered = text.to_lowercase();
    let stripped = strip.replace_all(&lowered, "");
    collapse.replace_all(stripped.trim(), "-").to_string()
}

fn comrak_options() -> Options {
    let mut options = Options::default();
    options.extension.autolink = true;
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.tasklist = true;
    options.parse.smart = true;
    options.render.hardbreaks = true;
    // Raw markup passes through the renderer; ammonia sanitizes the
    // assembled fragment afterwards
    options.render.unsafe_ = true;
    options
}

/// Writes heading tags with ids derived from their text content, for
/// in-page anchor navigation
struct IdHeadingAdapter;

impl HeadingAdapter for IdHeadingAdapter {
    fn enter(
        &self,
        output: &mut dyn Write,
        heading: &HeadingMeta,
        _sourcepos: Option<Sourcepos>,
    ) -> std::io::Result<()> {
        write!(
            output,
            "<h{} id=\"{}\">",
            heading.level,
            heading_slug(&heading.content)
        )
    }

    fn exit(&self, output: &mut dyn Write, heading: &HeadingMeta) -> std::io::Result<()> {
        write!(output, "</h{}>", heading.level)
    }
}

/// The block as a code node, if it is a fenced code block
fn fenced_code<'a>(node: &'a AstNode<'a>) -> Option<RenderedNode> {
    match &node.data.borrow().value {
        NodeValue::CodeBlock(block) if block.fenced => Some(code_node(block)),
        _ => None,
    }
}

fn code_node(block: &NodeCodeBlock) -> RenderedNode {
    // A fence info string may carry more than the language
    // (```python [main.py]); the first token is the language tag
    let language = block.info.split_whitespace().next().unwrap_or("");

    RenderedNode::CodeBlock {
        code: block.literal.trim().to_string(),
        language: if language.is_empty() {
            "plaintext".to_string()
        } else {
            language.to_string()
        },
    }
}

/// Detach fenced blocks nested below `node`, returning them in document
/// order
fn detach_nested_fences<'a>(node: &'a AstNode<'a>) -> Vec<RenderedNode> {
    let fences: Vec<_> = node
        .descendants()
        .skip(1)
        .filter(|n| matches!(&n.data.borrow().value, NodeValue::CodeBlock(block) if block.fenced))
        .collect();

    let mut nodes = Vec::new();
    for fence in fences {
        fence.detach();
        if let NodeValue::CodeBlock(block) = &fence.data.borrow().value {
            nodes.push(code_node(block));
        }
    }
    nodes
}

fn format_block<'a>(node: &'a AstNode<'a>, options: &Options) -> Result<String> {
    let adapter = IdHeadingAdapter;
    let mut plugins = Plugins::default();
    plugins.render.heading_adapter = Some(&adapter);

    let mut out = Vec::new();
    format_html_with_plugins(node, options, &mut out, &plugins)
        .map_err(|e| Error::Render(format!("markdown formatting failed: {e}")))?;

    String::from_utf8(out).map_err(|e| Error::Render(format!("rendered markup is not UTF-8: {e}")))
}

fn flush_markup(markup: &mut String, nodes: &mut Vec<RenderedNode>) {
    if markup.trim().is_empty() {
        markup.clear();
        return;
    }

    let cleaned = clean_markup(markup);
    markup.clear();

    if !cleaned.trim().is_empty() {
        nodes.push(RenderedNode::Markup(cleaned));
    }
}
