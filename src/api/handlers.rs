use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::{
    api::models::*,
    content::ContentDocument,
    db,
    github::{BranchRecord, GitHubClient, RepoSort, RepositoryRecord, SortDirection},
    registry::{self, RegistrationOutcome, Registrar},
    Error, Result,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::SqlitePool,
    pub github: GitHubClient,
    /// Absent when no tool-parsing service is configured
    pub registrar: Option<Registrar>,
    pub content: Arc<Vec<ContentDocument>>,
    pub settings: crate::config::Settings,
}

/// Extract the bearer token from an Authorization header
fn bearer_token(headers: &HeaderMap) -> Result<String> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| Error::Validation("Missing Authorization header".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .map(|token| token.to_string())
        .ok_or_else(|| {
            Error::Validation("Authorization header must be 'Bearer <token>'".to_string())
        })
}

/// GET /api/indexes - List registered tool indexes (newest version per
/// repository)
pub async fn list_indexes(
    State(state): State<AppState>,
    Query(params): Query<IndexListParams>,
) -> Result<Json<IndexesResponse>> {
    debug!("List indexes request: {:?}", params);

    let mut indexes = registry::list_latest_indexes(&state.pool).await?;

    if let Some(owner) = &params.owner {
        indexes.retain(|index| &index.owner == owner);
    }

    let total = indexes.len();
    let limit = params.limit.min(state.settings.pagination.api_max_limit);
    let offset = params.page.saturating_sub(1) * limit;

    let indexes = indexes
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(IndexCard::from)
        .collect();

    Ok(Json(IndexesResponse { indexes, total }))
}

/// GET /api/indexes/:id - Tool index details with its tools
pub async fn get_index(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<IndexDetail>> {
    debug!("Get index request: {}", id);

    let index = db::indexes::get_tool_index(&state.pool, id).await?;
    let tools = db::tools::get_tools_for_index(&state.pool, id).await?;

    let mut tool_details = Vec::with_capacity(tools.len());
    for tool in tools {
        tool_details.push(ToolDetail {
            inputs: tool.parsed_inputs()?,
            name: tool.name,
            doc: tool.doc,
            output: tool.output,
        });
    }

    Ok(Json(IndexDetail {
        id: index.id,
        full_name: index.full_name,
        owner: index.owner,
        clone_url: index.clone_url,
        branch: index.branch,
        commit_sha: index.commit_sha,
        version: index.version,
        description: index.description,
        readme: index.readme,
        added_at: index.added_at,
        tools: tool_details,
    }))
}

/// POST /api/indexes - Register a repository's tool index
///
/// A parse rejection from the upstream service maps to 422 with the
/// upstream message; it is not an internal error.
pub async fn register_index(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<RegisterRequest>,
) -> Result<Response> {
    let token = bearer_token(&headers)?;

    let registrar = state.registrar.as_ref().ok_or_else(|| {
        Error::Config("Tool parsing service is not configured (set TOOL_PARSER_URL)".to_string())
    })?;

    let outcome = registrar
        .register_repository(&request.repository, request.branch.as_deref(), &token)
        .await?;

    Ok(match outcome {
        RegistrationOutcome::Registered(index) => {
            (StatusCode::CREATED, Json(IndexCard::from(index))).into_response()
        }
        RegistrationOutcome::Rejected { message } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": message })),
        )
            .into_response(),
    })
}

/// GET /api/repos - List the authenticated user's repositories
pub async fn list_repos(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ReposParams>,
) -> Result<Json<Vec<RepositoryRecord>>> {
    let token = bearer_token(&headers)?;

    let sort = match params.sort.as_deref() {
        Some(raw) => raw.parse::<RepoSort>()?,
        None => RepoSort::default(),
    };
    let direction = match params.direction.as_deref() {
        Some(raw) => raw.parse::<SortDirection>()?,
        None => SortDirection::default(),
    };

    let repos = state.github.list_repositories(&token, sort, direction).await?;
    Ok(Json(repos))
}

/// GET /api/repos/:owner/:repo/branches - List branches of a repository
pub async fn list_branches(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((owner, repo)): Path<(String, String)>,
) -> Result<Json<Vec<BranchRecord>>> {
    let token = bearer_token(&headers)?;
    let full_name = format!("{owner}/{repo}");

    let branches = state.github.list_branches(&full_name, &token).await?;
    Ok(Json(branches))
}

/// GET /api/stats - Registry statistics
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let repositories = registry::list_latest_indexes(&state.pool).await?.len();
    let versions = db::indexes::count_tool_indexes(&state.pool).await?;
    let tools = db::tools::count_tools(&state.pool).await?;

    Ok(Json(StatsResponse {
        repositories,
        versions,
        tools,
    }))
}

/// GET /health - Liveness probe
pub async fn health_check() -> &'static str {
    "OK"
}

/// GET /ready - Readiness probe (database reachable)
pub async fn readiness_check(State(state): State<AppState>) -> Result<&'static str> {
    sqlx::query("SELECT 1").execute(&state.pool).await?;
    Ok("READY")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_err());

        headers.insert(header::AUTHORIZATION, "Bearer gho_abc".parse().unwrap());
        assert_eq!(bearer_token(&headers).unwrap(), "gho_abc");

        headers.insert(header::AUTHORIZATION, "Basic dXNlcg==".parse().unwrap());
        assert!(bearer_token(&headers).is_err());
    }
}
