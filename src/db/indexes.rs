use crate::db::{models::*, DbPool};
use crate::error::{Error, Result};
use chrono::Utc;

/// Create a new tool-index version
///
/// Versions count up per full_name; re-registering a repository records a
/// new row rather than overwriting the previous one.
pub async fn create_tool_index(pool: &DbPool, new_index: &NewToolIndex) -> Result<ToolIndex> {
    let now = Utc::now();

    let version: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(version), 0) + 1 FROM tool_indexes WHERE full_name = ?",
    )
    .bind(&new_index.full_name)
    .fetch_one(pool)
    .await?;

    let index = sqlx::query_as::<_, ToolIndex>(
        r#"
        INSERT INTO tool_indexes (full_name, owner, clone_url, branch, commit_sha, version, description, readme, added_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&new_index.full_name)
    .bind(&new_index.owner)
    .bind(&new_index.clone_url)
    .bind(&new_index.branch)
    .bind(&new_index.commit_sha)
    .bind(version)
    .bind(&new_index.description)
    .bind(&new_index.readme)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(index)
}

/// Get tool index by ID
pub async fn get_tool_index(pool: &DbPool, id: i64) -> Result<ToolIndex> {
    let index = sqlx::query_as::<_, ToolIndex>("SELECT * FROM tool_indexes WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Tool index {id} not found")))?;

    Ok(index)
}

/// List all tool-index rows, newest first
///
/// Contains one row per registered version; callers dedup by full_name
/// when they want only the newest version of each repository.
pub async fn list_tool_indexes(pool: &DbPool) -> Result<Vec<ToolIndex>> {
    let indexes = sqlx::query_as::<_, ToolIndex>(
        "SELECT * FROM tool_indexes ORDER BY added_at DESC, id DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(indexes)
}

/// Count all tool-index rows
pub async fn count_tool_indexes(pool: &DbPool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tool_indexes")
        .fetch_one(pool)
        .await?;

    Ok(count)
}
