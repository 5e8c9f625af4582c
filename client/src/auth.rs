// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::error::ClientError;

use parking_lot::RwLock;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Owns the bearer token and attaches it to outgoing requests.
///
/// Clones share the same token. When built with a token file the token
/// survives between runs of the terminal client.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    token: Arc<RwLock<Option<String>>>,
    store: Option<PathBuf>,
}

impl AuthContext {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Uses `path` as the token file, loading a token already stored there.
    pub fn with_token_file(path: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let path = path.into();
        let token = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            Some(raw.trim().to_string()).filter(|t| !t.is_empty())
        } else {
            None
        };
        debug!(
            "Token file {} ({})",
            path.display(),
            if token.is_some() { "loaded" } else { "empty" }
        );
        Ok(Self {
            token: Arc::new(RwLock::new(token)),
            store: Some(path),
        })
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.read().is_some()
    }

    pub fn token_file(&self) -> Option<&Path> {
        self.store.as_deref()
    }

    pub fn set_token(&self, token: &str) -> Result<(), ClientError> {
        if let Some(path) = &self.store {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            write_private(path, token)?;
        }
        *self.token.write() = Some(token.to_string());
        Ok(())
    }

    /// Forgets the token, removing the token file if there is one.
    pub fn clear(&self) -> Result<(), ClientError> {
        *self.token.write() = None;
        if let Some(path) = &self.store {
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }

    /// Adds `Authorization: Bearer <token>` when logged in.
    pub fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// Writes the token readable by its owner only.
fn write_private(path: &Path, token: &str) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        options.mode(0o600);
        let mut file = options.open(path)?;
        // The mode above only applies to new files.
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
        file.write_all(token.as_bytes())
    }
    #[cfg(not(unix))]
    {
        options.open(path)?.write_all(token.as_bytes())
    }
}
