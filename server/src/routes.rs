// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::auth::{self, AuthSettings};
use crate::handlers;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::FromRef,
    http::{
        HeaderValue, Method,
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    },
    middleware,
    routing::{get, post, put},
};
use sqlx::SqlitePool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// State shared by every handler. Handlers extract the part they need
/// (`State<SqlitePool>` or `State<AuthSettings>`).
#[derive(Clone, FromRef)]
pub struct AppState {
    pub pool: SqlitePool,
    pub auth: AuthSettings,
}

impl AppState {
    pub fn new(pool: SqlitePool, auth: AuthSettings) -> Self {
        Self { pool, auth }
    }
}

/// Creates and configures the application router.
///
/// Every `/api/tasks` route requires an admin bearer token; logout and
/// verify require any valid token; login and `/` are public.
pub fn create_router(state: AppState) -> Router {
    let session_routes = Router::new()
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/verify", get(auth::verify))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    let task_routes = Router::new()
        .route(
            "/api/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route(
            "/api/tasks/{id}",
            put(handlers::update_task).delete(handlers::delete_task),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ));

    Router::new()
        .route("/", get(handlers::health))
        .route("/api/auth/login", post(auth::login))
        .merge(session_routes)
        .merge(task_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the single known dashboard origin, with credentials allowed.
pub fn build_cors(origin: &str) -> Result<CorsLayer> {
    let origin: HeaderValue = origin
        .parse()
        .with_context(|| format!("Invalid CORS origin: {origin}"))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, ACCEPT, AUTHORIZATION]))
}
