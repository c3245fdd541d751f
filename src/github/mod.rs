pub mod client;
pub mod config;
pub mod models;
pub mod pagination;
pub mod reference;

pub use client::GitHubClient;
pub use config::GitHubConfig;
pub use models::{BranchRecord, RepoSort, RepositoryRecord, SortDirection};
pub use pagination::PageLinks;
pub use reference::{parse_repo_reference, RepoReference};
