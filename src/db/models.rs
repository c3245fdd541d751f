use crate::toolparser::ToolInput;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered tool-index repository version
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ToolIndex {
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
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewToolIndex {
    pub full_name: String,
    pub owner: String,
    pub clone_url: String,
    pub branch: String,
    pub commit_sha: String,
    pub description: Option<String>,
    pub readme: Option<String>,
}

/// One extracted tool belonging to a tool index
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tool {
    pub id: i64,
    pub index_id: i64,
    pub name: String,
    pub doc: String,
    /// JSON-encoded list of `{name, type}` inputs
    pub inputs: String,
    pub output: String,
    pub created_at: DateTime<Utc>,
}

impl Tool {
    /// Decode the JSON-encoded inputs column
    pub fn parsed_inputs(&self) -> Result<Vec<ToolInput>> {
        serde_json::from_str(&self.inputs).map_err(|e| {
            crate::Error::Internal(format!("Corrupt inputs for tool {}: {e}", self.id))
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTool {
    pub index_id: i64,
    pub name: String,
    pub doc: String,
    pub inputs: Vec<ToolInput>,
    pub output: String,
}
