use crate::db::{models::*, DbPool};
use crate::error::{Error, Result};
use chrono::Utc;

/// Insert the tools of a freshly registered index
pub async fn create_tools(pool: &DbPool, new_tools: &[NewTool]) -> Result<Vec<Tool>> {
    let now = Utc::now();
    let mut tools = Vec::with_capacity(new_tools.len());

    for new_tool in new_tools {
        let inputs = serde_json::to_string(&new_tool.inputs)
            .map_err(|e| Error::Internal(format!("Failed to encode tool inputs: {e}")))?;

        let tool = sqlx::query_as::<_, Tool>(
            r#"
            INSERT INTO tools (index_id, name, doc, inputs, output, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(new_tool.index_id)
        .bind(&new_tool.name)
        .bind(&new_tool.doc)
        .bind(inputs)
        .bind(&new_tool.output)
        .bind(now)
        .fetch_one(pool)
        .await?;

        tools.push(tool);
    }

    Ok(tools)
}

/// Tools of one index, in insertion order
pub async fn get_tools_for_index(pool: &DbPool, index_id: i64) -> Result<Vec<Tool>> {
    let tools = sqlx::query_as::<_, Tool>("SELECT * FROM tools WHERE index_id = ? ORDER BY id")
        .bind(index_id)
        .fetch_all(pool)
        .await?;

    Ok(tools)
}

/// Count the tools of one index
pub async fn count_tools_for_index(pool: &DbPool, index_id: i64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tools WHERE index_id = ?")
        .bind(index_id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Count all tools
pub async fn count_tools(pool: &DbPool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tools")
        .fetch_one(pool)
        .await?;

    Ok(count)
}
