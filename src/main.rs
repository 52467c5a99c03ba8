use std::{process::ExitCode, sync::Arc};

use gcx_cms::{
    AppState,
    bootstrap::ensure_default_admin,
    config::{AppConfig, ConfigError, DatabaseConfig, Env},
    create_router,
    repository::{MemoryRepository, PostgresRepository, RepositoryState},
    storage::{LocalDiskStorage, StorageService, StorageState},
};
use sqlx::{migrate::MigrateError, postgres::PgPoolOptions};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Reasons the server refuses to start.
#[derive(Debug, Error)]
enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("database connection: {0}")]
    Database(#[from] sqlx::Error),
    #[error("schema migration: {0}")]
    Migrate(#[from] MigrateError),
    #[error("server: {0}")]
    Io(#[from] std::io::Error),
}

/// main
///
/// Loads configuration, sets up logging, connects the store, seeds the admin account
/// and serves the API until the process is stopped.
#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // Logging comes up first so a bad configuration is reported like any other failure.
    init_tracing(config.as_ref().map(|c| c.env).unwrap_or(Env::Local));

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "fatal startup error");
            ExitCode::FAILURE
        }
    }
}

/// Pretty output locally, JSON lines in production. `RUST_LOG` overrides the filter.
fn init_tracing(env: Env) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "gcx_cms=debug,tower_http=info,axum=info".into());

    match env {
        Env::Local => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init(),
        Env::Production => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

async fn run(config: Result<AppConfig, ConfigError>) -> Result<(), StartupError> {
    let config = config?;
    tracing::info!("Application starting in {:?} mode", config.env);

    let repo: RepositoryState = match &config.database {
        DatabaseConfig::Postgres {
            url,
            max_connections,
        } => {
            let pool = PgPoolOptions::new()
                .max_connections(*max_connections)
                .connect(url)
                .await?;
            let repo = PostgresRepository::new(pool);
            repo.migrate().await?;
            tracing::info!("connected to Postgres, migrations applied");
            Arc::new(repo)
        }
        DatabaseConfig::Memory => {
            tracing::warn!("DB_TYPE=memory: data lives only as long as this process");
            Arc::new(MemoryRepository::new())
        }
    };

    // A failed seed leaves the server usable for existing accounts.
    if let Err(err) = ensure_default_admin(&repo, &config).await {
        tracing::error!(error = %err, "default admin bootstrap failed");
    }

    let disk = LocalDiskStorage::new(&config.upload_dir);
    if let Err(err) = disk.ensure_directories().await {
        tracing::warn!(
            error = %err,
            dir = %disk.images_dir().display(),
            "upload directory unavailable; media uploads will fail"
        );
    }
    let storage: StorageState = Arc::new(disk);

    let port = config.port;
    let app = create_router(AppState {
        repo,
        storage,
        config,
    });

    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("Listening on 0.0.0.0:{port}");
    tracing::info!("API Documentation (Swagger UI) available at: http://localhost:{port}/swagger-ui");

    axum::serve(listener, app).await?;
    Ok(())
}
