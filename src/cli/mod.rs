pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "toolhub")]
#[command(about = "Toolhub - a registry of tool-index repositories", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the registry server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long, env = "HOST")]
        host: Option<String>,
    },

    /// Run database migrations
    Migrate,

    /// List your GitHub repositories
    Repos {
        /// GitHub token
        #[arg(long, env = "GITHUB_TOKEN")]
        token: String,

        /// Sort key: full_name, created, updated, pushed
        #[arg(long, default_value = "full_name")]
        sort: String,

        /// Sort direction: asc or desc
        #[arg(long, default_value = "asc")]
        direction: String,

        /// Ignore the cached listing and re-fetch
        #[arg(long)]
        refresh: bool,

        /// Your login, shown first in the owner grouping
        #[arg(long)]
        username: Option<String>,
    },

    /// List branches of a repository
    Branches {
        /// Repository (owner/name or clone URL)
        repository: String,

        /// GitHub token
        #[arg(long, env = "GITHUB_TOKEN")]
        token: String,
    },

    /// Register a repository's tool index
    Register {
        /// Repository (owner/name or clone URL)
        repository: String,

        /// Branch to index (defaults to the repository's default branch)
        #[arg(short, long)]
        branch: Option<String>,

        /// GitHub token
        #[arg(long, env = "GITHUB_TOKEN")]
        token: String,
    },

    /// List registered indexes from a running server
    Indexes {
        /// Filter by owner login
        #[arg(long)]
        owner: Option<String>,
    },
}
