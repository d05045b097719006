// src/main.rs

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use testprep::config::Config;
use testprep::routes;
use testprep::state::AppState;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DB_CONNECT_RETRIES: u32 = 5;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration from environment (.env included)
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "testprep.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let pool = connect_with_retry(&config.database_url).await?;
    tracing::info!("Database connected...");

    tracing::info!("Running migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Migrations applied successfully.");

    let bind_addr = config.bind_addr.clone();
    let app = routes::create_router(AppState::new(pool, config));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn connect_with_retry(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let mut retry_count = 0;
    loop {
        match PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await
        {
            Ok(pool) => return Ok(pool),
            Err(e) if retry_count < DB_CONNECT_RETRIES => {
                retry_count += 1;
                tracing::warn!(
                    "Database not ready ({}), retrying in 2s... (Attempt {})",
                    e,
                    retry_count
                );
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
            Err(e) => {
                tracing::error!("Failed to connect to database after {} retries", DB_CONNECT_RETRIES);
                return Err(e);
            }
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
