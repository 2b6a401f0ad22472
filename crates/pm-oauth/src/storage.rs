//! Per-provider connection storage
//!
//! One JSON document per provider, holding either an in-flight PKCE session
//! or the credential record, in a single file with restrictive permissions.

use chrono::Utc;
use pm_types::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::debug;

use crate::types::{ConnectionDocument, PkceSession, ProviderCredentials};

/// File-backed connection store
///
/// All mutation goes through the write lock and is flushed to disk before
/// the call returns, so a handler never answers out of an unsaved state.
pub struct ConnectionStore {
    /// Path to the connections file
    storage_path: PathBuf,
    /// In-memory cache of connection documents, keyed by provider name
    cache: RwLock<HashMap<String, ConnectionDocument>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StorageFormat {
    connections: HashMap<String, ConnectionDocument>,
}

impl ConnectionStore {
    /// Create a new connection store backed by the given file
    pub async fn new(storage_path: PathBuf) -> AppResult<Self> {
        let store = Self {
            storage_path,
            cache: RwLock::new(HashMap::new()),
        };

        store.load().await?;

        Ok(store)
    }

    /// Load connection documents from disk
    async fn load(&self) -> AppResult<()> {
        if !self.storage_path.exists() {
            return Ok(());
        }

        let content = fs::read_to_string(&self.storage_path)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to read connection store: {}", e)))?;

        let storage: StorageFormat = serde_json::from_str(&content)
            .map_err(|e| AppError::Storage(format!("Failed to parse connection store: {}", e)))?;

        *self.cache.write().await = storage.connections;

        Ok(())
    }

    /// Save connection documents to disk
    async fn save(&self) -> AppResult<()> {
        if let Some(parent) = self.storage_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::Storage(format!("Failed to create storage directory: {}", e))
            })?;
        }

        let cache = self.cache.read().await;
        let storage = StorageFormat {
            connections: cache.clone(),
        };

        let content = serde_json::to_string_pretty(&storage)
            .map_err(|e| AppError::Storage(format!("Failed to serialize connection store: {}", e)))?;

        fs::write(&self.storage_path, content)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write connection store: {}", e)))?;

        // Credentials live in this file; owner read/write only on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&self.storage_path)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to get file metadata: {}", e)))?
                .permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.storage_path, perms)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to set file permissions: {}", e)))?;
        }

        Ok(())
    }

    /// Get the raw document for a provider
    pub async fn get(&self, provider: &str) -> Option<ConnectionDocument> {
        self.cache.read().await.get(provider).cloned()
    }

    /// Persist a pending authorization session for a provider
    ///
    /// Overwrites whatever document was there; the session is keyed by
    /// provider, so concurrent connect attempts last-write-win.
    pub async fn begin_auth(&self, provider: &str, session: PkceSession) -> AppResult<()> {
        self.cache
            .write()
            .await
            .insert(provider.to_string(), ConnectionDocument::PendingAuth(session));

        self.save().await
    }

    /// Consume the pending session for a provider after validating `state`
    ///
    /// Rejects when no session is pending, when the session has expired
    /// (expired sessions are deleted on read), or when the presented state
    /// does not match. Only a matching, unexpired session is returned, and it
    /// is removed from the store in the same step.
    pub async fn take_session(&self, provider: &str, state: &str) -> AppResult<PkceSession> {
        let mut cache = self.cache.write().await;

        let session = match cache.get(provider) {
            Some(ConnectionDocument::PendingAuth(session)) => session.clone(),
            _ => {
                return Err(AppError::InvalidParams(format!(
                    "No pending authorization for provider '{}'",
                    provider
                )));
            }
        };

        if session.is_expired(Utc::now()) {
            cache.remove(provider);
            drop(cache);
            self.save().await?;
            return Err(AppError::InvalidParams(format!(
                "Authorization attempt for provider '{}' has expired",
                provider
            )));
        }

        if session.state != state {
            return Err(AppError::InvalidParams(format!(
                "State mismatch for provider '{}'",
                provider
            )));
        }

        cache.remove(provider);
        drop(cache);
        self.save().await?;

        debug!("Consumed pending session for provider: {}", provider);

        Ok(session)
    }

    /// Store credentials for a provider
    pub async fn store_credentials(
        &self,
        provider: &str,
        credentials: ProviderCredentials,
    ) -> AppResult<()> {
        self.cache.write().await.insert(
            provider.to_string(),
            ConnectionDocument::Connected(credentials),
        );

        self.save().await
    }

    /// Get credentials for a provider
    ///
    /// A pending-auth document is not a connection; only a `Connected`
    /// document yields credentials.
    pub async fn credentials(&self, provider: &str) -> Option<ProviderCredentials> {
        match self.cache.read().await.get(provider) {
            Some(ConnectionDocument::Connected(credentials)) => Some(credentials.clone()),
            _ => None,
        }
    }

    /// Delete the document for a provider
    ///
    /// Deleting a non-existent document is not an error.
    pub async fn delete(&self, provider: &str) -> AppResult<()> {
        self.cache.write().await.remove(provider);
        self.save().await
    }
}
