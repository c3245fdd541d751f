use crate::db::{
    self,
    models::{NewTool, NewToolIndex, ToolIndex},
    DbPool,
};
use crate::github::{parse_repo_reference, GitHubClient};
use crate::toolparser::{ToolIndexOutcome, ToolParserClient};
use crate::utils::{uniq_by, validation::validate_clone_url};
use crate::{Error, Result};
use tracing::{debug, info};

/// Orchestrates repository registration: GitHub lookups, the parsing
/// service, and persistence
#[derive(Clone)]
pub struct Registrar {
    github: GitHubClient,
    parser: ToolParserClient,
    pool: DbPool,
}

/// Result of a registration attempt
///
/// A parse rejection is data, not an error; the upstream message is
/// carried to the caller as-is.
#[derive(Debug)]
pub enum RegistrationOutcome {
    Registered(ToolIndex),
    Rejected { message: String },
}

impl Registrar {
    pub fn new(github: GitHubClient, parser: ToolParserClient, pool: DbPool) -> Self {
        Self {
            github,
            parser,
            pool,
        }
    }

    /// Register (or re-register) a repository's tool index
    ///
    /// `reference` accepts any form `parse_repo_reference` does. When no
    /// branch is given, the repository's default branch is used.
    pub async fn register_repository(
        &self,
        reference: &str,
        branch: Option<&str>,
        token: &str,
    ) -> Result<RegistrationOutcome> {
        let repo_ref = parse_repo_reference(reference)?;
        let full_name = repo_ref.full_name();
        info!("Registering tool index for {}", full_name);

        let repo = self.github.get_repository(&full_name, token).await?;
        if repo.archived {
            return Err(Error::Validation(format!(
                "Repository {full_name} is archived and cannot be registered"
            )));
        }

        validate_clone_url(&repo.clone_url)?;
        let branch = branch.unwrap_or(&repo.default_branch);

        // The commit lookup and the parse hit different services; wait for
        // both together
        let (commit_sha, outcome) = futures::join!(
            self.github.latest_commit(&full_name, branch, token),
            self.parser.request_tool_index(&repo.clone_url),
        );
        let commit_sha = commit_sha?;

        let (tools, readme) = match outcome? {
            ToolIndexOutcome::Rejected { message } => {
                debug!("Parse rejected for {}: {}", full_name, message);
                return Ok(RegistrationOutcome::Rejected { message });
            }
            ToolIndexOutcome::Parsed { tools, readme } => (tools, readme),
        };

        let new_index = NewToolIndex {
            full_name: repo.full_name,
            owner: repo.owner.login,
            clone_url: repo.clone_url,
            branch: branch.to_string(),
            commit_sha,
            description: repo.description,
            readme: Some(readme),
        };

        let index = db::indexes::create_tool_index(&self.pool, &new_index).await?;

        let new_tools: Vec<NewTool> = tools
            .into_iter()
            .map(|tool| NewTool {
                index_id: index.id,
                name: tool.name,
                doc: tool.doc,
                inputs: tool.inputs,
                output: tool.output,
            })
            .collect();
        db::tools::create_tools(&self.pool, &new_tools).await?;

        info!(
            "Registered {} v{} ({} tools)",
            index.full_name,
            index.version,
            new_tools.len()
        );

        Ok(RegistrationOutcome::Registered(index))
    }
}

/// Newest version of every registered repository, newest-first
///
/// The table keeps one row per registered version; re-registrations are
/// collapsed here by first-seen dedup over the newest-first listing.
pub async fn list_latest_indexes(pool: &DbPool) -> Result<Vec<ToolIndex>> {
    let all = db::indexes::list_tool_indexes(pool).await?;
    Ok(uniq_by(all, |index| index.full_name.clone()))
}
