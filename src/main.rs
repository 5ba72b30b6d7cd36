use cragbook::{
    config::AppConfig,
    router,
    session::{InMemorySessionRepository, PostgresSessionRepository, SessionRepository},
    AppState,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn session_repository(
    config: &AppConfig,
) -> Result<Arc<dyn SessionRepository + Send + Sync>, Box<dyn std::error::Error>> {
    let Some(database_url) = config.database_url.as_deref() else {
        info!("DATABASE_URL not set, keeping sessions in memory");
        return Ok(Arc::new(InMemorySessionRepository::new()));
    };

    let pool = sqlx::PgPool::connect(database_url).await?;
    let repository = PostgresSessionRepository::new(pool);
    repository.ensure_schema().await?;
    info!("Connected to PostgreSQL session store");
    Ok(Arc::new(repository))
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env();
    let session_repository = session_repository(&config).await?;

    let bind_addr = config.bind_addr.clone();
    let app = router(AppState::new(session_repository, config));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(%bind_addr, "Climbing journal listening");
    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cragbook=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting climbing journal server");

    if let Err(err) = run().await {
        error!(error = %err, "Server exited with error");
        std::process::exit(1);
    }
}
