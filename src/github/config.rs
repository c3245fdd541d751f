use std::env;

/// GitHub client configuration
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    /// Base URL of the REST API; overridable for tests and GHE deployments
    pub api_base_url: String,

    /// User agent sent with every request
    pub user_agent: String,
}

impl GitHubConfig {
    /// Create a new GitHubConfig from environment variables
    pub fn from_env() -> Self {
        Self {
            api_base_url: env::var("GITHUB_API_URL")
                .unwrap_or_else(|_| "https://api.github.com".to_string()),
            user_agent: format!("Toolhub/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.github.com".to_string(),
            user_agent: format!("Toolhub/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
