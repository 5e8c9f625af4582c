// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use anyhow::Context;
use chrono::Utc;
use server::config::{self, Config};
use server::{database, routes};
use tokio::time::{self, Duration};

// How often expired sessions are swept from the store.
const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(10 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    config::load_env_file();
    let config = Config::from_env()?;

    tracing::info!("Starting up the server...");

    let db_pool = match database::establish_connection_pool(&config.database_url).await {
        Ok(pool) => {
            tracing::info!("Database connection was made successfully.");
            pool
        }
        Err(e) => {
            tracing::error!("Failed to connect with the database: {:?}", e);
            std::process::exit(1);
        }
    };

    let purge_pool = db_pool.clone();
    tokio::spawn(async move {
        let mut interval = time::interval(SESSION_PURGE_INTERVAL);

        loop {
            interval.tick().await; // The first tick completes immediately.

            match database::purge_expired_sessions_in_db(&purge_pool, Utc::now()).await {
                Ok(0) => tracing::debug!("No expired sessions to purge."),
                Ok(count) => tracing::info!("Purged {} expired sessions.", count),
                Err(e) => tracing::error!("Error while purging expired sessions: {:?}", e),
            }
        }
    });

    let state = routes::AppState::new(db_pool, config.auth_settings());
    let cors = routes::build_cors(&config.cors_origin)?;
    let app = routes::create_router(state).layer(cors);

    let addr = config.socket_addr();
    tracing::info!("The server listens on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received.");
        })
        .await
        .context("Server error")?;

    Ok(())
}
