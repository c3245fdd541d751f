use crate::api::models::IndexesResponse;
use crate::db::DbPool;
use crate::github::{
    models::owner_logins, parse_repo_reference, GitHubClient, GitHubConfig, RepoSort,
    SortDirection,
};
use crate::registry::{Registrar, RegistrationOutcome};
use crate::store::{FileStorage, UserSession};
use crate::toolparser::ToolParserClient;
use crate::utils::prettify_date;
use crate::Result;
use chrono::Utc;
use std::path::PathBuf;

fn session_store_path() -> PathBuf {
    std::env::var("SESSION_STORE_PATH")
        .unwrap_or_else(|_| "./data/session.json".to_string())
        .into()
}

/// `toolhub repos` - list repositories, cached between invocations
pub async fn repos(
    token: &str,
    sort: RepoSort,
    direction: SortDirection,
    refresh: bool,
    username: Option<String>,
) -> Result<()> {
    let session = UserSession::new(FileStorage::new(session_store_path()));

    if let Some(username) = &username {
        session.set_username(username)?;
    }

    let cached = if refresh {
        None
    } else {
        session.cached_repos()?
    };

    let (repos, from_cache) = match cached {
        Some(repos) => (repos, true),
        None => {
            let client = GitHubClient::new(GitHubConfig::from_env())?;
            let repos = client.list_repositories(token, sort, direction).await?;
            session.cache_repos(&repos)?;
            (repos, false)
        }
    };

    let now = Utc::now();
    let owners = owner_logins(&repos, session.username()?.as_deref());
    for owner in &owners {
        println!("\n{owner}");
        for repo in repos.iter().filter(|r| &r.owner == owner) {
            println!(
                "  {:<44} {:<16} pushed {}",
                repo.full_name,
                repo.default_branch,
                prettify_date(repo.pushed_at, now)
            );
        }
    }

    if from_cache {
        println!(
            "\n{} repositories (cached; pass --refresh to re-fetch)",
            repos.len()
        );
    } else {
        println!("\n{} repositories", repos.len());
    }

    Ok(())
}

/// `toolhub branches` - list a repository's branches with head commits
pub async fn branches(repository: &str, token: &str) -> Result<()> {
    let reference = parse_repo_reference(repository)?;

    let client = GitHubClient::new(GitHubConfig::from_env())?;
    let branches = client.list_branches(&reference.full_name(), token).await?;

    for branch in &branches {
        println!("{:<32} {}", branch.name, branch.commit_sha);
    }
    println!("\n{} branches", branches.len());

    Ok(())
}

/// `toolhub register` - register a repository's tool index
pub async fn register(
    pool: DbPool,
    parser_endpoint: String,
    repository: &str,
    branch: Option<&str>,
    token: &str,
) -> Result<()> {
    let github = GitHubClient::new(GitHubConfig::from_env())?;
    let parser = ToolParserClient::new(parser_endpoint)?;
    let registrar = Registrar::new(github, parser, pool);

    match registrar
        .register_repository(repository, branch, token)
        .await?
    {
        RegistrationOutcome::Registered(index) => {
            println!(
                "\x1b[32m\u{2713}\x1b[0m Registered {} v{} @ {}",
                index.full_name, index.version, index.commit_sha
            );
        }
        RegistrationOutcome::Rejected { message } => {
            println!("\x1b[31m\u{2717}\x1b[0m Parse rejected: {message}");
        }
    }

    Ok(())
}

/// `toolhub indexes` - list registered indexes from a running server
pub async fn list_indexes(server_url: &str, owner: Option<&str>) -> Result<()> {
    let mut url = format!("{server_url}/api/indexes");
    if let Some(owner) = owner {
        url.push_str(&format!("?owner={}", urlencoding::encode(owner)));
    }

    let response: IndexesResponse = reqwest::get(&url)
        .await?
        .error_for_status()?
        .json()
        .await?;

    for index in &response.indexes {
        println!(
            "{:<44} v{:<4} {}",
            index.full_name,
            index.version,
            index.description.as_deref().unwrap_or("")
        );
    }
    println!("\n{} registered indexes", response.total);

    Ok(())
}
