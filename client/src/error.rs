// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use common::ValidationError;
use thiserror::Error;

/// Errors surfaced by the dashboard and login clients.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Missing or malformed fields, shown as a form error.
    #[error("{0}")]
    Validation(String),

    /// The task (or route) does not exist on the server.
    #[error("{0}")]
    NotFound(String),

    /// Login was refused.
    #[error("{0}")]
    InvalidCredentials(String),

    /// No token, or the token is no longer accepted.
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    /// Any other non-success reply.
    #[error("Server error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The request never got a usable reply.
    #[error("Network error: {0}")]
    Network(String),

    /// Reading or writing the token file failed.
    #[error("Token storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Network(err.to_string())
    }
}

impl From<ValidationError> for ClientError {
    fn from(err: ValidationError) -> Self {
        ClientError::Validation(err.0)
    }
}
