use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use styleduel::app::{AppState, Repositories, build_router};
use styleduel::config::{AppConfig, StorageBackend};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "styleduel=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let repositories = match &config.storage {
        StorageBackend::Memory => {
            info!("Using in-memory storage");
            Repositories::in_memory()
        }
        StorageBackend::Postgres { database_url } => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            info!("Connected to database");

            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("Migrations completed");

            Repositories::postgres(pool)
        }
    };

    let app = build_router(AppState::new(repositories, &config));

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        %addr,
        policy = ?config.duel.policy,
        feedback_delay_ms = config.duel.feedback_delay.as_millis() as u64,
        "Server running, API docs at http://{addr}/api/docs"
    );

    axum::serve(listener, app).await?;

    Ok(())
}
