use crate::{Error, Result};

/// Normalized reference to a GitHub repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoReference {
    pub owner: String,
    pub name: String,
}

impl RepoReference {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Parse a repository reference
/// Accepts formats:
/// - owner/name
/// - github.com/owner/name (with or without scheme)
/// - https://github.com/owner/name(.git)
/// - git@github.com:owner/name(.git)
pub fn parse_repo_reference(input: &str) -> Result<RepoReference> {
    let input = input.trim();

    // SSH remotes use a colon separator after the host
    let input = input.strip_prefix("git@github.com:").unwrap_or(input);

    // Remove trailing slashes and .git suffix
    let input = input.trim_end_matches('/').trim_end_matches(".git");

    // Remove protocol if present
    let input = input
        .strip_prefix("https://")
        .or_else(|| input.strip_prefix("http://"))
        .unwrap_or(input);

    // Remove github.com if present
    let input = input.strip_prefix("github.com/").unwrap_or(input);

    let mut parts = input.split('/');
    let owner = parts.next().unwrap_or("").trim();
    let name = parts.next().unwrap_or("").trim();

    if owner.is_empty() || name.is_empty() {
        return Err(Error::Validation(
            "Invalid repository reference. Expected: owner/name".to_string(),
        ));
    }

    Ok(RepoReference {
        owner: owner.to_string(),
        name: name.to_string(),
    })
}
