// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
//! Creates the admin account used to log into the dashboard.
//! Running it again with the same email leaves the existing account alone.
use anyhow::Context;
use common::Role;
use server::config::{self, Config, SeedAdmin};
use server::{auth, database};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    config::load_env_file();
    let config = Config::from_env()?;
    let admin = SeedAdmin::from_env();

    let pool = database::establish_connection_pool(&config.database_url).await?;

    if let Some(existing) = database::find_user_by_email_in_db(&pool, &admin.email).await? {
        tracing::info!(
            "User {} already exists (ID: {}), nothing to do.",
            existing.email,
            existing.id
        );
        return Ok(());
    }

    let iterations = config.pbkdf2_iterations;
    let password = admin.password.clone();
    let hash = tokio::task::spawn_blocking(move || auth::hash_password(&password, iterations))
        .await
        .context("Password hashing task failed")?;

    let user =
        database::create_user_in_db(&pool, &admin.username, &admin.email, &hash, Role::Admin)
            .await?;
    tracing::info!("Seeded admin {} with ID: {}", user.email, user.id);

    Ok(())
}
