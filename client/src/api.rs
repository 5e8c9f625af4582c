// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::auth::AuthContext;
use crate::error::ClientError;

use common::{
    CreateTaskPayload, ErrorResponse, LoginRequest, LoginResponse, SessionResponse, Task,
    UpdateTaskPayload,
};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::future::Future;
use tracing::debug;

/// Task Service operations the dashboard relies on.
pub trait TaskApi {
    fn list_tasks(&self) -> impl Future<Output = Result<Vec<Task>, ClientError>> + Send;

    fn create_task(
        &self,
        payload: &CreateTaskPayload,
    ) -> impl Future<Output = Result<Task, ClientError>> + Send;

    fn update_task(
        &self,
        id: i64,
        payload: &UpdateTaskPayload,
    ) -> impl Future<Output = Result<Task, ClientError>> + Send;

    fn delete_task(&self, id: i64) -> impl Future<Output = Result<(), ClientError>> + Send;
}

/// Auth Service operations the login flow relies on.
pub trait AuthApi {
    /// A refused login is `ClientError::InvalidCredentials`.
    fn login(
        &self,
        request: &LoginRequest,
    ) -> impl Future<Output = Result<LoginResponse, ClientError>> + Send;
}

/// HTTP client for the task board API. Every request goes through the
/// shared `AuthContext`, which attaches the bearer token.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    auth: AuthContext,
}

impl ApiClient {
    pub fn new(base_url: &str, auth: AuthContext) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(format!("taskboard/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);
        self.auth.authorize(self.http.request(method, url))
    }

    /// Sends the request, turning any non-success status into a `ClientError`.
    async fn send(&self, request: RequestBuilder, is_login: bool) -> Result<Response, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        debug!("-> {}", status);
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(error_from_reply(status, &body, is_login))
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        Ok(self.send(request, false).await?.json().await?)
    }

    /// Revokes the current token on the server and forgets it locally.
    pub async fn logout(&self) -> Result<(), ClientError> {
        if self.auth.is_authenticated() {
            let result = self.send(self.request(Method::POST, "/api/auth/logout"), false).await;
            // An already expired token is as good as revoked.
            match result {
                Ok(_) | Err(ClientError::Unauthorized(_)) => {}
                Err(e) => return Err(e),
            }
        }
        self.auth.clear()
    }

    pub async fn verify(&self) -> Result<SessionResponse, ClientError> {
        self.send_json(self.request(Method::GET, "/api/auth/verify")).await
    }
}

/// Maps an error reply to the client taxonomy. The server's message is kept
/// when the body has the usual `{"success": false, "error": ...}` shape.
fn error_from_reply(status: StatusCode, body: &str, is_login: bool) -> ClientError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error)
        .unwrap_or_else(|_| {
            if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("Request failed").to_string()
            } else {
                body.trim().to_string()
            }
        });

    match status {
        StatusCode::BAD_REQUEST
        | StatusCode::UNPROCESSABLE_ENTITY
        | StatusCode::UNSUPPORTED_MEDIA_TYPE => ClientError::Validation(message),
        StatusCode::NOT_FOUND => ClientError::NotFound(message),
        StatusCode::UNAUTHORIZED if is_login => ClientError::InvalidCredentials(message),
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized(message),
        StatusCode::FORBIDDEN => ClientError::Forbidden(message),
        _ => ClientError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

impl AuthApi for ApiClient {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ClientError> {
        let response: LoginResponse = self
            .send(self.request(Method::POST, "/api/auth/login").json(request), true)
            .await?
            .json()
            .await?;

        match (&response.token, response.success) {
            (Some(token), true) => self.auth.set_token(token)?,
            _ => {
                return Err(ClientError::InvalidCredentials(
                    response
                        .error
                        .clone()
                        .unwrap_or_else(|| "Login failed.".to_string()),
                ));
            }
        }
        Ok(response)
    }
}

impl TaskApi for ApiClient {
    async fn list_tasks(&self) -> Result<Vec<Task>, ClientError> {
        self.send_json(self.request(Method::GET, "/api/tasks")).await
    }

    async fn create_task(&self, payload: &CreateTaskPayload) -> Result<Task, ClientError> {
        self.send_json(self.request(Method::POST, "/api/tasks").json(payload))
            .await
    }

    async fn update_task(&self, id: i64, payload: &UpdateTaskPayload) -> Result<Task, ClientError> {
        self.send_json(
            self.request(Method::PUT, &format!("/api/tasks/{id}"))
                .json(payload),
        )
        .await
    }

    async fn delete_task(&self, id: i64) -> Result<(), ClientError> {
        self.send(self.request(Method::DELETE, &format!("/api/tasks/{id}")), false)
            .await?;
        Ok(())
    }
}
