use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;

use crate::{
    api::handlers::AppState,
    content::{self, collection, RenderedNode, TocEntry},
    db, registry,
    toolparser::ToolInput,
    utils::prettify_date,
    Error, Result,
};

/// Template-friendly rendered fragment
pub enum Fragment {
    Markup(String),
    /// code, language
    Code(String, String),
}

fn fragments(markdown: &str) -> Result<Vec<Fragment>> {
    Ok(content::render(markdown)?
        .into_iter()
        .map(|node| match node {
            RenderedNode::Markup(html) => Fragment::Markup(html),
            RenderedNode::CodeBlock { code, language } => Fragment::Code(code, language),
        })
        .collect())
}

#[derive(Clone)]
#[allow(dead_code)] // Fields are used by Askama templates
struct IndexCardData {
    id: i64,
    full_name: String,
    owner: String,
    description: String,
    version: i64,
    num_tools: i64,
    added: String,
}

async fn card_data(
    state: &AppState,
    index: crate::db::models::ToolIndex,
) -> Result<IndexCardData> {
    let num_tools = db::tools::count_tools_for_index(&state.pool, index.id).await?;
    Ok(IndexCardData {
        id: index.id,
        full_name: index.full_name,
        owner: index.owner,
        description: index.description.unwrap_or_default(),
        version: index.version,
        num_tools,
        added: prettify_date(index.added_at, Utc::now()),
    })
}

/// Home page template
#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    recent: Vec<IndexCardData>,
    repositories: usize,
    tools: i64,
}

/// GET / - Home page with recently registered indexes
pub async fn index(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let latest = registry::list_latest_indexes(&state.pool).await?;
    let repositories = latest.len();
    let tools = db::tools::count_tools(&state.pool).await?;

    let mut recent = Vec::new();
    for index in latest
        .into_iter()
        .take(state.settings.pagination.web_default_limit)
    {
        recent.push(card_data(&state, index).await?);
    }

    let template = IndexTemplate {
        recent,
        repositories,
        tools,
    };

    Ok(Html(render_template(template)?))
}

#[derive(Deserialize)]
pub struct BrowseParams {
    #[serde(default)]
    owner: Option<String>,
}

/// Browse page template
#[derive(Template)]
#[template(path = "browse.html")]
struct BrowseTemplate {
    owners: Vec<String>,
    selected_owner: String,
    indexes: Vec<IndexCardData>,
}

/// GET /browse - All registered indexes, filterable by owner
pub async fn browse_page(
    State(state): State<AppState>,
    Query(params): Query<BrowseParams>,
) -> Result<impl IntoResponse> {
    let latest = registry::list_latest_indexes(&state.pool).await?;

    let mut owners: Vec<String> = Vec::new();
    for index in &latest {
        if !owners.contains(&index.owner) {
            owners.push(index.owner.clone());
        }
    }

    let selected_owner = params.owner.unwrap_or_default();
    let mut indexes = Vec::new();
    for index in latest {
        if !selected_owner.is_empty() && index.owner != selected_owner {
            continue;
        }
        indexes.push(card_data(&state, index).await?);
    }

    let template = BrowseTemplate {
        owners,
        selected_owner,
        indexes,
    };

    Ok(Html(render_template(template)?))
}

#[allow(dead_code)] // Fields are used by Askama templates
struct ToolData {
    name: String,
    doc: String,
    output: String,
    inputs: Vec<ToolInput>,
}

/// Tool index detail template
#[derive(Template)]
#[template(path = "index_detail.html")]
struct IndexDetailTemplate {
    full_name: String,
    owner: String,
    description: String,
    clone_url: String,
    branch: String,
    commit_sha: String,
    version: i64,
    added: String,
    tools: Vec<ToolData>,
    readme: Vec<Fragment>,
}

/// GET /indexes/:id - Tool index detail with rendered readme
pub async fn index_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let index = db::indexes::get_tool_index(&state.pool, id).await?;
    let tools = db::tools::get_tools_for_index(&state.pool, id).await?;

    let mut tool_data = Vec::with_capacity(tools.len());
    for tool in tools {
        tool_data.push(ToolData {
            inputs: tool.parsed_inputs()?,
            name: tool.name,
            doc: tool.doc,
            output: tool.output,
        });
    }

    let readme = match &index.readme {
        Some(markdown) => fragments(markdown)?,
        None => Vec::new(),
    };

    let template = IndexDetailTemplate {
        full_name: index.full_name,
        owner: index.owner,
        description: index.description.unwrap_or_default(),
        clone_url: index.clone_url,
        branch: index.branch,
        commit_sha: index.commit_sha,
        version: index.version,
        added: prettify_date(index.added_at, Utc::now()),
        tools: tool_data,
        readme,
    };

    Ok(Html(render_template(template)?))
}

/// Sidebar section of the docs navigation
#[allow(dead_code)] // Fields are used by Askama templates
struct NavSection {
    label: String,
    link: String,
    items: Vec<NavItem>,
}

#[allow(dead_code)] // Fields are used by Askama templates
struct NavItem {
    label: String,
    link: String,
    active: bool,
}

/// Navigation tree for the docs sidebar, flattened to two levels
fn docs_nav(state: &AppState, current_stem: &str) -> Vec<NavSection> {
    let Some(toc) = collection::find_by_stem(&state.content, "docs/toc") else {
        return Vec::new();
    };

    let tree = content::build_toc_tree(&toc.body, &state.content, None);
    tree.into_iter()
        .map(|entry| NavSection {
            label: entry.label,
            link: entry.link.unwrap_or_default(),
            items: flatten_items(entry.children, current_stem),
        })
        .collect()
}

fn flatten_items(entries: Vec<TocEntry>, current_stem: &str) -> Vec<NavItem> {
    let mut items = Vec::new();
    for entry in entries {
        let link = entry.link.unwrap_or_default();
        items.push(NavItem {
            active: link.trim_start_matches('/') == current_stem,
            label: entry.label,
            link,
        });
        items.extend(flatten_items(entry.children, current_stem));
    }
    items
}

fn first_nav_link(sections: &[NavSection]) -> Option<String> {
    for section in sections {
        if !section.link.is_empty() {
            return Some(section.link.clone());
        }
        for item in &section.items {
            if !item.link.is_empty() {
                return Some(item.link.clone());
            }
        }
    }
    None
}

/// Docs page template
#[derive(Template)]
#[template(path = "docs.html")]
struct DocsTemplate {
    title: String,
    nav: Vec<NavSection>,
    body: Vec<Fragment>,
}

/// GET /docs - Redirect to the first page of the docs navigation
pub async fn docs_root(State(state): State<AppState>) -> Result<Response> {
    let nav = docs_nav(&state, "");
    match first_nav_link(&nav) {
        Some(link) => Ok(Redirect::to(&link).into_response()),
        None => Err(Error::NotFound("No documentation published".to_string())),
    }
}

/// GET /docs/*stem - A documentation page with the TOC sidebar
pub async fn docs_page(
    State(state): State<AppState>,
    Path(stem): Path<String>,
) -> Result<impl IntoResponse> {
    let full_stem = format!("docs/{}", stem.trim_matches('/'));

    let doc = collection::find_by_stem(&state.content, &full_stem)
        .ok_or_else(|| Error::NotFound(format!("No documentation page at {full_stem}")))?;

    let template = DocsTemplate {
        title: doc.title.clone(),
        nav: docs_nav(&state, &full_stem),
        body: fragments(&doc.body)?,
    };

    Ok(Html(render_template(template)?))
}

/// About page template
#[derive(Template)]
#[template(path = "about.html")]
struct AboutTemplate {
    title: String,
    body: Vec<Fragment>,
}

/// GET /about - Rendered about page
pub async fn about_page(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let doc = collection::find_by_stem(&state.content, "about")
        .ok_or_else(|| Error::NotFound("No about page published".to_string()))?;

    let template = AboutTemplate {
        title: doc.title.clone(),
        body: fragments(&doc.body)?,
    };

    Ok(Html(render_template(template)?))
}

fn render_template<T: Template>(template: T) -> Result<String> {
    template
        .render()
        .map_err(|e| Error::Render(format!("Template rendering failed: {e}")))
}
