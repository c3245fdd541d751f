use crate::toolparser::models::{ToolIndexOutcome, ToolMetadata};
use crate::{Error, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Client for the external tool-parsing service
#[derive(Clone)]
pub struct ToolParserClient {
    client: Client,
    endpoint: String,
}

#[derive(Serialize)]
struct ParseRequest<'a> {
    clone_url: &'a str,
}

/// Raw wire response: a bare JSON string is an error message, an object
/// is a successful parse
#[derive(Deserialize)]
#[serde(untagged)]
enum ParseResponse {
    Failure(String),
    Success {
        tools_metadata: Vec<ToolMetadata>,
        readme: String,
    },
}

impl ToolParserClient {
    pub fn new(endpoint: String) -> Result<Self> {
        url::Url::parse(&endpoint)?;

        // Parsing clones the repository server-side, so allow a long wait
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, endpoint })
    }

    /// Ask the parsing service to extract the tool index of a repository
    pub async fn request_tool_index(&self, clone_url: &str) -> Result<ToolIndexOutcome> {
        debug!("Tool parse request: POST {} ({})", self.endpoint, clone_url);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&ParseRequest { clone_url })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Internal(format!(
                "Tool parsing service error: {status}"
            )));
        }

        let parsed: ParseResponse = response.json().await.map_err(|e| {
            if e.is_decode() {
                Error::Decode(format!("tool parsing response: {e}"))
            } else {
                Error::Http(e)
            }
        })?;

        Ok(match parsed {
            ParseResponse::Failure(message) => ToolIndexOutcome::Rejected { message },
            ParseResponse::Success {
                tools_metadata,
                readme,
            } => ToolIndexOutcome::Parsed {
                tools: tools_metadata,
                readme,
            },
        })
    }
}
