// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::database;
use crate::error::AppError;

use anyhow::Context;
use axum::{
    extract::{Extension, Json, Request, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use common::{LoginRequest, LoginResponse, Role, SessionResponse, User, UserSummary};
use hex::encode as hex_encode;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

const HASH_PREFIX: &str = "pbkdf2:sha256:";

/// Settings of the Auth Service.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// How long an issued token stays valid.
    pub session_ttl: Duration,
    /// Iteration count used for newly hashed passwords.
    pub pbkdf2_iterations: u32,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            session_ttl: Duration::hours(crate::config::DEFAULT_SESSION_TTL_HOURS),
            pbkdf2_iterations: crate::config::DEFAULT_PBKDF2_ITERATIONS,
        }
    }
}

/// The session attached to a request by the bearer guard.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token_hash: String,
}

/// Hashes a password as `pbkdf2:sha256:<iterations>$<salt>$<hex digest>`.
pub fn hash_password(password: &str, iterations: u32) -> String {
    let mut salt_bytes = [0u8; 12];
    rand::rngs::OsRng.fill_bytes(&mut salt_bytes);
    let salt = hex_encode(salt_bytes);
    let mut dk = [0u8; 32];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut dk);
    format!("{HASH_PREFIX}{iterations}${salt}${}", hex_encode(dk))
}

/// Checks a candidate password against a stored hash, using the iteration
/// count recorded in the hash. Malformed hashes never match.
pub fn verify_password(stored: &str, candidate: &str) -> bool {
    let Some(rest) = stored.strip_prefix(HASH_PREFIX) else {
        return false;
    };
    let Some((iter_s, salt_hash)) = rest.split_once('$') else {
        return false;
    };
    let Some((salt, expected_hash)) = salt_hash.split_once('$') else {
        return false;
    };
    let Ok(iterations) = iter_s.parse::<u32>() else {
        return false;
    };
    if iterations == 0 {
        return false;
    }

    let mut dk = [0u8; 32];
    pbkdf2_hmac::<Sha256>(candidate.as_bytes(), salt.as_bytes(), iterations, &mut dk);
    let computed = hex_encode(dk);

    // Compare every byte so timing does not reveal the matching prefix.
    computed.len() == expected_hash.len()
        && computed
            .bytes()
            .zip(expected_hash.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

/// A well-formed hash with the given iteration count that no password matches.
fn unmatchable_hash(iterations: u32) -> String {
    format!("{HASH_PREFIX}{iterations}$unmatchable${}", "0".repeat(64))
}

/// A fresh opaque bearer token: 32 random bytes, hex encoded.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex_encode(bytes)
}

/// Only this digest of a token is stored.
pub fn hash_token(token: &str) -> String {
    hex_encode(Sha256::digest(token.as_bytes()))
}

/// Extracts the token of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

/// Handler for `POST /api/auth/login`.
pub async fn login(
    State(pool): State<SqlitePool>,
    State(settings): State<AuthSettings>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(request) = payload?;
    let email = request.email.trim().to_lowercase();
    debug!("Received login request for: {}", email);

    if email.is_empty() || request.password.is_empty() {
        return Err(AppError::validation("Email and password are required."));
    }

    let user = database::find_user_by_email_in_db(&pool, &email).await?;

    // Unknown emails are checked against a throwaway hash so both failures
    // cost the same PBKDF2 work.
    let stored = match &user {
        Some(user) => user.password.clone(),
        None => unmatchable_hash(settings.pbkdf2_iterations),
    };
    let candidate = request.password;
    let matches = tokio::task::spawn_blocking(move || verify_password(&stored, &candidate))
        .await
        .context("Password verification task failed")?;

    let user = match user {
        Some(user) if matches => user,
        Some(_) => {
            warn!("Login failed: wrong password for {}", email);
            return Err(AppError::invalid_credentials());
        }
        None => {
            warn!("Login failed: no user with email {}", email);
            return Err(AppError::invalid_credentials());
        }
    };

    let token = generate_token();
    let now = Utc::now();
    database::create_session_in_db(
        &pool,
        &hash_token(&token),
        user.id,
        now,
        now + settings.session_ttl,
    )
    .await?;

    info!("User {} logged in.", user.email);
    Ok(Json(LoginResponse {
        success: true,
        token: Some(token),
        user: Some(UserSummary::from(&user)),
        error: None,
    }))
}

/// Handler for `POST /api/auth/logout`: revokes the presented token.
pub async fn logout(
    State(pool): State<SqlitePool>,
    Extension(session): Extension<AuthSession>,
) -> Result<StatusCode, AppError> {
    database::delete_session_from_db(&pool, &session.token_hash).await?;
    info!("User {} logged out.", session.user.email);
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for `GET /api/auth/verify`.
pub async fn verify(Extension(session): Extension<AuthSession>) -> Json<SessionResponse> {
    Json(SessionResponse {
        success: true,
        user: UserSummary::from(&session.user),
    })
}

async fn resolve_session(pool: &SqlitePool, headers: &HeaderMap) -> Result<AuthSession, AppError> {
    let token = bearer_token(headers)
        .ok_or_else(|| AppError::unauthorized("Missing or malformed bearer token."))?;
    let token_hash = hash_token(token);
    let user = database::find_session_user_in_db(pool, &token_hash, Utc::now())
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid or expired token."))?;
    Ok(AuthSession { user, token_hash })
}

/// Bearer guard: any logged-in user passes.
pub async fn require_session(
    State(pool): State<SqlitePool>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let session = resolve_session(&pool, request.headers()).await?;
    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// Bearer guard for the task board: the user must be an admin.
pub async fn require_admin(
    State(pool): State<SqlitePool>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let session = resolve_session(&pool, request.headers()).await?;
    if session.user.role != Role::Admin {
        warn!("User {} is not allowed to manage tasks.", session.user.email);
        return Err(AppError::forbidden("Admin role required."));
    }
    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::tests::setup_test_db;
    use axum::http::HeaderValue;

    const TEST_ITERATIONS: u32 = 1_000;

    fn test_settings() -> AuthSettings {
        AuthSettings {
            pbkdf2_iterations: TEST_ITERATIONS,
            ..AuthSettings::default()
        }
    }

    fn login_payload(email: &str, password: &str) -> Result<Json<LoginRequest>, JsonRejection> {
        Ok(Json(LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }))
    }

    async fn seeded_pool() -> SqlitePool {
        let pool = setup_test_db().await.unwrap();
        let hash = hash_password("123admin", TEST_ITERATIONS);
        database::create_user_in_db(&pool, "Admin", "admin1@gmail.com", &hash, Role::Admin)
            .await
            .unwrap();
        pool
    }

    #[test]
    fn test_password_hash_round_trip() {
        let stored = hash_password("s3cret", TEST_ITERATIONS);
        assert!(stored.starts_with("pbkdf2:sha256:1000$"));
        assert!(verify_password(&stored, "s3cret"));
        assert!(!verify_password(&stored, "S3cret"));
    }

    #[test]
    fn test_same_password_gets_different_salts() {
        let a = hash_password("same", TEST_ITERATIONS);
        let b = hash_password("same", TEST_ITERATIONS);
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hashes_never_match() {
        assert!(!verify_password("plaintext", "plaintext"));
        assert!(!verify_password("pbkdf2:sha256:abc$salt$00", "x"));
        assert!(!verify_password("pbkdf2:sha256:0$salt$00", "x"));
        assert!(!verify_password("pbkdf2:sha256:1000$only-salt", "x"));
    }

    #[test]
    fn test_unmatchable_hash_runs_full_verification() {
        let stored = unmatchable_hash(TEST_ITERATIONS);
        assert!(stored.starts_with("pbkdf2:sha256:1000$"));
        assert!(!verify_password(&stored, ""));
        assert!(!verify_password(&stored, "123admin"));
    }

    #[test]
    fn test_tokens_are_random_hex() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
        assert_ne!(hash_token(&a), a);
        assert_eq!(hash_token(&a), hash_token(&a));
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers), Some("abc123"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer   xyz "));
        assert_eq!(bearer_token(&headers), Some("xyz"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc123"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }

    #[tokio::test]
    async fn test_login_success_issues_token() {
        let pool = seeded_pool().await;

        let Json(response) = login(
            State(pool.clone()),
            State(test_settings()),
            login_payload("Admin1@gmail.com", "123admin"),
        )
        .await
        .unwrap();

        assert!(response.success);
        let token = response.token.expect("token should be issued");
        assert_eq!(response.user.unwrap().role, Role::Admin);

        // The issued token resolves to a live session.
        let user = database::find_session_user_in_db(&pool, &hash_token(&token), Utc::now())
            .await
            .unwrap();
        assert_eq!(user.unwrap().email, "admin1@gmail.com");
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_invalid_credentials() {
        let pool = seeded_pool().await;

        let err = login(
            State(pool),
            State(test_settings()),
            login_payload("admin1@gmail.com", "wrong"),
        )
        .await
        .unwrap_err();

        assert_eq!(err.code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.message(), crate::error::INVALID_CREDENTIALS);
    }

    #[tokio::test]
    async fn test_login_unknown_email_is_invalid_credentials() {
        let pool = seeded_pool().await;

        let err = login(
            State(pool),
            State(test_settings()),
            login_payload("ghost@example.com", "123admin"),
        )
        .await
        .unwrap_err();

        assert_eq!(err.code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.message(), crate::error::INVALID_CREDENTIALS);
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let pool = seeded_pool().await;

        let err = login(State(pool), State(test_settings()), login_payload("", ""))
            .await
            .unwrap_err();

        assert_eq!(err.code(), StatusCode::BAD_REQUEST);
    }
}
