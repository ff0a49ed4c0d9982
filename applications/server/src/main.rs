/// Roster Server - user records with timed bans and a deployment webhook
use clap::{Parser, Subcommand};
use roster_core::SystemClock;
use roster_server::{
    config::ServerConfig,
    create_router,
    services::{GitSync, RecordService, WebhookService, WebhookVerifier},
    state::AppState,
};
use roster_storage::SqliteRecordStore;
use sqlx::SqlitePool;
use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "roster-server")]
#[command(about = "Roster user record server", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Import a JSON dataset into an empty user table
    Seed {
        /// Dataset path
        path: PathBuf,
    },
    /// List all users
    ListUsers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roster_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve => {
            serve(config).await?;
        }
        Commands::Seed { path } => {
            seed(&config, &path).await?;
        }
        Commands::ListUsers => {
            list_users(&config).await?;
        }
    }

    Ok(())
}

async fn open_database(config: &ServerConfig) -> anyhow::Result<SqlitePool> {
    let pool = roster_storage::create_pool(&config.storage.database_url).await?;
    roster_storage::run_migrations(&pool).await?;
    Ok(pool)
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    config.validate()?;

    tracing::info!("Starting Roster Server");
    tracing::info!("Host: {}", config.server.host);
    tracing::info!("Port: {}", config.server.port);

    // Initialize database
    let pool = open_database(&config).await?;
    tracing::info!("Database connected");

    if let Some(seed_path) = &config.storage.seed_path {
        match roster_storage::seed::seed_from_file(&pool, seed_path).await {
            Ok(imported) => tracing::info!(imported, "Seeded user table"),
            Err(e) => tracing::error!("Failed to seed user table: {}", e),
        }
    }

    let records = RecordService::new(
        Arc::new(SqliteRecordStore::new(pool)),
        Arc::new(SystemClock),
    );

    let sync = GitSync::new(
        config.webhook.git_path.clone(),
        config.webhook.repo_dir.clone(),
        config.webhook.remote.clone(),
    );
    let webhook = WebhookService::new(
        WebhookVerifier::new(
            config.webhook.secret.clone(),
            config.webhook.user_agent_prefix.clone(),
        ),
        config.webhook.branch_ref.clone(),
        Arc::new(sync),
    );
    tracing::info!(
        repo = %config.webhook.repo_dir.display(),
        branch = %config.webhook.branch_ref,
        "Deployment webhook armed"
    );

    // Build application state
    let app_state = AppState::new(Arc::new(records), Arc::new(webhook));

    // Build router
    let app = create_router(app_state);

    // Create server address
    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    tracing::info!("Server listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn seed(config: &ServerConfig, path: &Path) -> anyhow::Result<()> {
    let pool = open_database(config).await?;

    let imported = roster_storage::seed::seed_from_file(&pool, path).await?;
    if imported == 0 {
        println!("User table already populated; nothing imported");
    } else {
        println!("Imported {imported} users from {}", path.display());
    }

    Ok(())
}

async fn list_users(config: &ServerConfig) -> anyhow::Result<()> {
    let pool = open_database(config).await?;

    let records = RecordService::new(
        Arc::new(SqliteRecordStore::new(pool)),
        Arc::new(SystemClock),
    );
    let users = records.list_all().await?;

    println!("Users:");
    for user in users {
        let ban = match (user.is_banned(), user.banned_until()) {
            (false, _) => String::new(),
            (true, None) => " (banned)".to_string(),
            (true, Some(until)) => format!(" (banned until {until})"),
        };
        println!("  {} - {}{}", user.user_id, user.user_name, ban);
    }

    Ok(())
}
