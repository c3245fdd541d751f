use crate::db::models::ToolIndex;
use crate::toolparser::ToolInput;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    20
}

#[derive(Debug, Deserialize)]
pub struct IndexListParams {
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[derive(Debug, Deserialize)]
pub struct ReposParams {
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RegisterRequest {
    /// Repository reference: owner/name or a clone URL
    pub repository: String,
    /// Branch to index; the default branch when omitted
    #[serde(default)]
    pub branch: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IndexCard {
    pub id: i64,
    pub full_name: String,
    pub owner: String,
    pub description: Option<String>,
    pub version: i64,
    pub commit_sha: String,
    pub added_at: DateTime<Utc>,
}

impl From<ToolIndex> for IndexCard {
    fn from(index: ToolIndex) -> Self {
        Self {
            id: index.id,
            full_name: index.full_name,
            owner: index.owner,
            description: index.description,
            version: index.version,
            commit_sha: index.commit_sha,
            added_at: index.added_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IndexesResponse {
    pub indexes: Vec<IndexCard>,
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToolDetail {
    pub name: String,
    pub doc: String,
    pub inputs: Vec<ToolInput>,
    pub output: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IndexDetail {
    pub id: i64,
    pub full_name: String,
    pub owner: String,
    pub clone_url: String,
    pub branch: String,
    pub commit_sha: String,
    pub version: i64,
    pub description: Option<String>,
    pub readme: Option<String>,
    pub added_at: DateTime<Utc>,
    pub tools: Vec<ToolDetail>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    /// Distinct registered repositories
    pub repositories: usize,
    /// Registered versions across all repositories
    pub versions: i64,
    /// Extracted tools across all versions
    pub tools: i64,
}
