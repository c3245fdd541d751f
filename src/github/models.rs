use crate::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Repository as returned by the GitHub API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    pub owner: Owner,
    pub clone_url: String,
    pub default_branch: String,
    pub description: Option<String>,
    pub archived: bool,
    pub pushed_at: DateTime<Utc>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Repository owner information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Owner {
    pub login: String,
}

/// Flattened repository row handed to callers of `list_repositories`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RepositoryRecord {
    pub name: String,
    pub full_name: String,
    pub clone_url: String,
    pub default_branch: String,
    pub owner: String,
    pub pushed_at: DateTime<Utc>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<Repository> for RepositoryRecord {
    fn from(repo: Repository) -> Self {
        Self {
            name: repo.name,
            full_name: repo.full_name,
            clone_url: repo.clone_url,
            default_branch: repo.default_branch,
            owner: repo.owner.login,
            pushed_at: repo.pushed_at,
            created_at: repo.created_at,
        }
    }
}

/// Branch as returned by the GitHub API
///
/// Shared by the branches listing and the single-branch endpoint; the
/// nested `commit.sha` is the branch head.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub commit: CommitRef,
}

/// Commit reference nested in branch responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRef {
    pub sha: String,
}

/// Flattened branch row handed to callers of `list_branches`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BranchRecord {
    pub name: String,
    pub commit_sha: String,
}

impl From<Branch> for BranchRecord {
    fn from(branch: Branch) -> Self {
        Self {
            name: branch.name,
            commit_sha: branch.commit.sha,
        }
    }
}

/// Sort key for repository listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepoSort {
    #[default]
    FullName,
    Created,
    Updated,
    Pushed,
}

impl RepoSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepoSort::FullName => "full_name",
            RepoSort::Created => "created",
            RepoSort::Updated => "updated",
            RepoSort::Pushed => "pushed",
        }
    }
}

impl FromStr for RepoSort {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full_name" => Ok(RepoSort::FullName),
            "created" => Ok(RepoSort::Created),
            "updated" => Ok(RepoSort::Updated),
            "pushed" => Ok(RepoSort::Pushed),
            other => Err(Error::Validation(format!(
                "Invalid sort key '{other}'. Expected one of: full_name, created, updated, pushed"
            ))),
        }
    }
}

/// Sort direction for repository listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(Error::Validation(format!(
                "Invalid sort direction '{other}'. Expected asc or desc"
            ))),
        }
    }
}

/// Distinct owner logins of `repos` in first-seen order, with `username`
/// moved to the front when it appears
pub fn owner_logins(repos: &[RepositoryRecord], username: Option<&str>) -> Vec<String> {
    let mut owners: Vec<String> = Vec::new();
    for repo in repos {
        if !owners.contains(&repo.owner) {
            owners.push(repo.owner.clone());
        }
    }

    if let Some(user) = username {
        if let Some(pos) = owners.iter().position(|o| o == user) {
            let user = owners.remove(pos);
            owners.insert(0, user);
        }
    }

    owners
}
