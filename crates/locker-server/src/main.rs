mod config;

use std::sync::Arc;

use tower_http::services::ServeDir;
use tracing::info;

use locker_api::{AppState, AppStateInner};
use locker_db::Database;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "locker=debug,locker_api=debug,locker_db=info,tower_http=debug".into()
            }),
        )
        .init();

    let config = Config::from_env()?;

    // Init database
    let db = Arc::new(Database::open(&config.db_path)?);

    let state: AppState = Arc::new(
        AppStateInner::new(db, config.public_url.clone()).with_send_delay(config.send_delay),
    );

    let mut app = locker_api::router(state);
    if let Some(dir) = &config.static_dir {
        info!("Serving front-end from {}", dir.display());
        app = app.fallback_service(ServeDir::new(dir));
    }

    let addr = config.addr()?;
    info!("Locker server listening on {} (public url {})", addr, config.public_url);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
