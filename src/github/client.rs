use crate::github::{
    config::GitHubConfig,
    models::{Branch, BranchRecord, RepoSort, Repository, RepositoryRecord, SortDirection},
    pagination::PageLinks,
};
use crate::{Error, Result};
use reqwest::{header, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error};
use url::Url;

/// Page size requested on paginated listings
const PER_PAGE: &str = "100";

/// Fixed REST API version header value
const API_VERSION: &str = "2022-11-28";

/// GitHub repository discovery client
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    config: GitHubConfig,
}

impl GitHubClient {
    /// Create a new GitHub client
    pub fn new(config: GitHubConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            header::HeaderName::from_static("x-github-api-version"),
            header::HeaderValue::from_static(API_VERSION),
        );

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// List the authenticated user's public repositories
    ///
    /// Flattens every page into one sequence. Order is whatever the
    /// upstream returned for the requested sort key; no local re-sort.
    pub async fn list_repositories(
        &self,
        token: &str,
        sort: RepoSort,
        direction: SortDirection,
    ) -> Result<Vec<RepositoryRecord>> {
        let mut url = Url::parse(&format!("{}/user/repos", self.config.api_base_url))?;
        url.query_pairs_mut()
            .append_pair("sort", sort.as_str())
            .append_pair("direction", direction.as_str())
            .append_pair("visibility", "public")
            .append_pair("affiliation", "owner,collaborator,organization_member")
            .append_pair("per_page", PER_PAGE)
            .append_pair("page", "1");

        let repos: Vec<Repository> = self.get_paginated(url, token).await?;
        Ok(repos.into_iter().map(RepositoryRecord::from).collect())
    }

    /// List branches of a repository, following pagination to exhaustion
    pub async fn list_branches(
        &self,
        repo_full_name: &str,
        token: &str,
    ) -> Result<Vec<BranchRecord>> {
        let mut url = Url::parse(&format!(
            "{}/repos/{}/branches",
            self.config.api_base_url, repo_full_name
        ))?;
        url.query_pairs_mut()
            .append_pair("per_page", PER_PAGE)
            .append_pair("page", "1");

        let branches: Vec<Branch> = self.get_paginated(url, token).await?;
        Ok(branches.into_iter().map(BranchRecord::from).collect())
    }

    /// Get the latest commit SHA of a branch
    ///
    /// A response without the nested `commit.sha` field is a decode error;
    /// the caller must treat that as inability to resolve a revision.
    pub async fn latest_commit(
        &self,
        repo_full_name: &str,
        branch: &str,
        token: &str,
    ) -> Result<String> {
        let path = format!("/repos/{repo_full_name}/branches/{branch}");
        let branch: Branch = self.get(&path, token).await?;
        Ok(branch.commit.sha)
    }

    /// Get repository information
    pub async fn get_repository(&self, full_name: &str, token: &str) -> Result<Repository> {
        let path = format!("/repos/{full_name}");
        self.get(&path, token).await
    }

    /// Make a single authenticated GET request against the API
    async fn get<T>(&self, path: &str, token: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        require_token(token)?;

        let url = format!("{}{}", self.config.api_base_url, path);
        debug!("GitHub API request: GET {}", url);

        let response = self.client.get(&url).bearer_auth(token).send().await?;
        let response = check_status(response).await?;

        decode_json(response).await
    }

    /// Repeatedly GET `first`, following `rel="next"` links until the
    /// termination rule in `PageLinks::advance` fires, concatenating the
    /// decoded pages in request order
    async fn get_paginated<T>(&self, first: Url, token: &str) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        require_token(token)?;

        let mut results = Vec::new();
        let mut url = first.to_string();

        loop {
            debug!("GitHub API request: GET {}", url);

            let response = self.client.get(&url).bearer_auth(token).send().await?;
            let response = check_status(response).await?;

            let links = PageLinks::parse(
                response
                    .headers()
                    .get(header::LINK)
                    .and_then(|v| v.to_str().ok()),
            );

            let page: Vec<T> = decode_json(response).await?;
            results.extend(page);

            match links.advance(&url) {
                Some(next) => url = next.to_string(),
                None => break,
            }
        }

        Ok(results)
    }
}

fn require_token(token: &str) -> Result<()> {
    if token.trim().is_empty() {
        return Err(Error::Validation(
            "GitHub token must not be empty".to_string(),
        ));
    }
    Ok(())
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read error response".to_string());
    error!("GitHub API error: {} - {}", status, error_body);

    Err(match status {
        StatusCode::NOT_FOUND => Error::NotFound("GitHub resource not found".to_string()),
        StatusCode::FORBIDDEN => Error::Internal("GitHub API rate limit exceeded".to_string()),
        StatusCode::UNAUTHORIZED => Error::Internal("GitHub authentication failed".to_string()),
        _ => Error::Internal(format!("GitHub API error: {status}")),
    })
}

/// Decode a JSON body, keeping transport failures and shape mismatches
/// distinguishable for callers
async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    response.json::<T>().await.map_err(|e| {
        if e.is_decode() {
            Error::Decode(format!("GitHub API response: {e}"))
        } else {
            Error::Http(e)
        }
    })
}
