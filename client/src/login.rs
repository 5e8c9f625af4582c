// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::api::AuthApi;
use crate::error::ClientError;

use common::{LoginRequest, LoginResponse};
use tracing::{error, info};

pub const LOGIN_SUCCESS_MESSAGE: &str = "Logged in Successfully!";
pub const LOGIN_UNAVAILABLE_MESSAGE: &str = "Error! Cannot login at this moment.";

/// The login screen: two fields and an inline error line.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub error: Option<String>,
}

impl LoginForm {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
            error: None,
        }
    }

    /// Submits the form once. On success the token is already held by the
    /// API's auth context and the reply is returned; otherwise `error` holds
    /// the message to display.
    pub async fn submit<A: AuthApi>(&mut self, api: &A) -> Option<LoginResponse> {
        self.error = None;
        if self.email.trim().is_empty() || self.password.is_empty() {
            self.error = Some("Email and password are required.".to_string());
            return None;
        }

        let request = LoginRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        };
        match api.login(&request).await {
            Ok(response) => {
                info!("{}", LOGIN_SUCCESS_MESSAGE);
                Some(response)
            }
            Err(e) => {
                error!("Error! Couldn't log in: {}", e);
                self.error = Some(inline_message(e));
                None
            }
        }
    }
}

/// Messages the server sent are shown as is; transport and local
/// failures get the generic line.
fn inline_message(err: ClientError) -> String {
    match err {
        ClientError::InvalidCredentials(m)
        | ClientError::Validation(m)
        | ClientError::Unauthorized(m)
        | ClientError::Forbidden(m)
        | ClientError::NotFound(m)
        | ClientError::Api { message: m, .. } => m,
        ClientError::Network(_) | ClientError::Storage(_) => LOGIN_UNAVAILABLE_MESSAGE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Role, UserSummary};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Accepts exactly one email/password pair; `offline` simulates a dead server.
    #[derive(Default)]
    struct FakeAuth {
        offline: bool,
        calls: AtomicUsize,
    }

    impl AuthApi for FakeAuth {
        async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.offline {
                return Err(ClientError::Network("connection refused".to_string()));
            }
            if request.email == "admin1@gmail.com" && request.password == "123admin" {
                Ok(LoginResponse {
                    success: true,
                    token: Some("token".to_string()),
                    user: Some(UserSummary {
                        id: 1,
                        username: "Admin".to_string(),
                        email: request.email.clone(),
                        role: Role::Admin,
                    }),
                    error: None,
                })
            } else {
                Err(ClientError::InvalidCredentials(
                    "Invalid email or password.".to_string(),
                ))
            }
        }
    }

    #[tokio::test]
    async fn test_successful_login() {
        let api = FakeAuth::default();
        let mut form = LoginForm::new(" admin1@gmail.com ", "123admin");

        let response = form.submit(&api).await.expect("login should succeed");

        assert_eq!(response.token.as_deref(), Some("token"));
        assert!(form.error.is_none());
    }

    #[tokio::test]
    async fn test_wrong_password_shows_server_message() {
        let api = FakeAuth::default();
        let mut form = LoginForm::new("admin1@gmail.com", "nope");

        assert!(form.submit(&api).await.is_none());
        assert_eq!(form.error.as_deref(), Some("Invalid email or password."));
    }

    #[tokio::test]
    async fn test_unreachable_server_shows_generic_message() {
        let api = FakeAuth {
            offline: true,
            ..FakeAuth::default()
        };
        let mut form = LoginForm::new("admin1@gmail.com", "123admin");

        assert!(form.submit(&api).await.is_none());
        assert_eq!(form.error.as_deref(), Some(LOGIN_UNAVAILABLE_MESSAGE));
    }

    #[tokio::test]
    async fn test_blank_fields_are_rejected_locally() {
        let api = FakeAuth::default();
        let mut form = LoginForm::new("", "");

        assert!(form.submit(&api).await.is_none());
        assert_eq!(form.error.as_deref(), Some("Email and password are required."));
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
    }
}
