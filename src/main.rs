use clap::Parser;
use std::sync::Arc;
use toolhub::{
    api::{handlers::AppState, routes},
    cli::{Cli, Commands},
    config::Settings,
    content, db,
    github::{GitHubClient, GitHubConfig},
    registry::Registrar,
    toolparser::ToolParserClient,
    Error, Result,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    // Silently ignore if file doesn't exist
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,toolhub=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let settings = Settings::from_env()?;
    settings.validate()?;

    // Handle commands
    match cli.command {
        Commands::Serve { port, host } => {
            serve(settings, port, host).await?;
        }
        Commands::Migrate => {
            migrate(settings).await?;
        }
        Commands::Repos {
            token,
            sort,
            direction,
            refresh,
            username,
        } => {
            let sort = sort.parse()?;
            let direction = direction.parse()?;
            toolhub::cli::commands::repos(&token, sort, direction, refresh, username).await?;
        }
        Commands::Branches { repository, token } => {
            toolhub::cli::commands::branches(&repository, &token).await?;
        }
        Commands::Register {
            repository,
            branch,
            token,
        } => {
            let endpoint = settings.parser.endpoint.clone().ok_or_else(|| {
                Error::Config("TOOL_PARSER_URL must be set to register repositories".to_string())
            })?;

            let pool = db::init_pool(&settings.database.url).await?;
            db::run_migrations(&pool).await?;

            toolhub::cli::commands::register(pool, endpoint, &repository, branch.as_deref(), &token)
                .await?;
        }
        Commands::Indexes { owner } => {
            let server_url = settings.server.external_url.clone().unwrap_or_else(|| {
                format!("http://{}:{}", settings.server.host, settings.server.port)
            });
            toolhub::cli::commands::list_indexes(&server_url, owner.as_deref()).await?;
        }
    }

    Ok(())
}

async fn serve(mut settings: Settings, port: Option<u16>, host: Option<String>) -> Result<()> {
    // Override settings with CLI arguments
    if let Some(port) = port {
        settings.server.port = port;
    }
    if let Some(host) = host {
        settings.server.host = host;
    }

    info!("Starting Toolhub server");
    info!("Database: {}", settings.database.url);
    info!("Server: {}:{}", settings.server.host, settings.server.port);

    // Initialize database with connection pooling configuration
    let pool = db::init_pool_with_config(&settings.database).await?;
    info!(
        "Database connection established (max_connections: {}, min_connections: {})",
        settings.database.max_connections, settings.database.min_connections
    );

    // Run migrations
    db::run_migrations(&pool).await?;
    info!("Database migrations completed");

    // Load the docs content collection
    let documents = match content::load_collection(&settings.content.root) {
        Ok(documents) => {
            info!(
                "Loaded {} content documents from {:?}",
                documents.len(),
                settings.content.root
            );
            documents
        }
        Err(e) => {
            warn!(
                "Failed to load content from {:?}: {}",
                settings.content.root, e
            );
            warn!("Continuing without docs content - docs pages will be unavailable");
            Vec::new()
        }
    };

    // GitHub discovery client
    let github = GitHubClient::new(GitHubConfig::from_env())?;

    // Registration needs the external parsing service
    let registrar = match &settings.parser.endpoint {
        Some(endpoint) => {
            let parser = ToolParserClient::new(endpoint.clone())?;
            info!("Tool parsing service: {}", endpoint);
            Some(Registrar::new(github.clone(), parser, pool.clone()))
        }
        None => {
            warn!("TOOL_PARSER_URL not set - registration is disabled");
            None
        }
    };

    // Create application state
    let state = AppState {
        pool,
        github,
        registrar,
        content: Arc::new(documents),
        settings: settings.clone(),
    };

    // Create router with rate limiting
    let app = routes::create_router(state, &settings);

    // Start server
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    println!("\n========================================");
    println!("Toolhub Server");
    println!("========================================");
    println!("Status: Running");
    println!("Address: http://{addr}");
    println!("Database: Connected");
    println!("\nAPI Endpoints:");
    println!("  GET  /api/indexes");
    println!("  GET  /api/indexes/:id");
    println!("  POST /api/indexes");
    println!("  GET  /api/repos");
    println!("  GET  /api/repos/:owner/:repo/branches");
    println!("  GET  /api/stats");
    println!("\nPress Ctrl+C to stop");
    println!("========================================\n");

    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Internal(format!("Server error: {e}")))?;

    info!("Shutting down...");
    Ok(())
}

async fn migrate(settings: Settings) -> Result<()> {
    info!("Running database migrations");

    let pool = db::init_pool(&settings.database.url).await?;
    db::run_migrations(&pool).await?;

    println!("\x1b[32m\u{2713}\x1b[0m Database migrations completed successfully");
    Ok(())
}
