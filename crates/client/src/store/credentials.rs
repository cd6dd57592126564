//! Typed access to the endpoint and session keys.

use salesdesk_core::{Role, UserId};
use secrecy::{ExposeSecret, SecretString};

use super::{KeyValueStore, StoreError, keys};
use crate::config::EndpointConfig;

/// Snapshot of the persisted session keys.
#[derive(Debug, Default)]
pub struct StoredSession {
    pub token: Option<SecretString>,
    pub user_id: Option<UserId>,
    pub role: Option<Role>,
}

impl StoredSession {
    /// A token is the only thing that makes a session active.
    #[must_use]
    pub const fn has_token(&self) -> bool {
        self.token.is_some()
    }
}

/// Credential store over any [`KeyValueStore`] backend.
///
/// Endpoint keys and session keys are independent: [`clear_session`]
/// never touches the host or port, and changing the endpoint never
/// touches the session.
///
/// [`clear_session`]: CredentialStore::clear_session
#[derive(Debug)]
pub struct CredentialStore<K> {
    backend: K,
}

impl<K: KeyValueStore> CredentialStore<K> {
    pub const fn new(backend: K) -> Self {
        Self { backend }
    }

    /// The underlying backend.
    pub const fn backend(&self) -> &K {
        &self.backend
    }

    async fn get_trimmed(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .backend
            .get(key)
            .await?
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty()))
    }

    // =========================================================================
    // Endpoint
    // =========================================================================

    /// Stored host, if one was ever set.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub async fn host(&self) -> Result<Option<String>, StoreError> {
        self.get_trimmed(keys::SERVER_HOST).await
    }

    /// Stored port as text, if one was ever set.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub async fn port(&self) -> Result<Option<String>, StoreError> {
        self.get_trimmed(keys::SERVER_PORT).await
    }

    /// Effective endpoint, defaulting to `127.0.0.1:8080`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub async fn endpoint(&self) -> Result<EndpointConfig, StoreError> {
        let host = self.host().await?;
        let port = self.port().await?;
        Ok(EndpointConfig::from_stored(host.as_deref(), port.as_deref()))
    }

    /// Persist a validated endpoint. The session is left as it is.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    pub async fn set_endpoint(&self, endpoint: &EndpointConfig) -> Result<(), StoreError> {
        self.backend.set(keys::SERVER_HOST, endpoint.host()).await?;
        self.backend
            .set(keys::SERVER_PORT, &endpoint.port().to_string())
            .await
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub async fn token(&self) -> Result<Option<SecretString>, StoreError> {
        Ok(self.get_trimmed(keys::AUTH_TOKEN).await?.map(SecretString::from))
    }

    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    pub async fn set_token(&self, token: &SecretString) -> Result<(), StoreError> {
        self.backend
            .set(keys::AUTH_TOKEN, token.expose_secret())
            .await
    }

    /// Cached user id. A value that no longer parses reads as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub async fn user_id(&self) -> Result<Option<UserId>, StoreError> {
        Ok(self
            .get_trimmed(keys::USER_ID)
            .await?
            .and_then(|v| v.parse().ok()))
    }

    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    pub async fn set_user_id(&self, id: UserId) -> Result<(), StoreError> {
        self.backend.set(keys::USER_ID, &id.to_string()).await
    }

    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub async fn role(&self) -> Result<Option<Role>, StoreError> {
        Ok(self.get_trimmed(keys::USER_ROLE).await?.map(|v| Role::parse(&v)))
    }

    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    pub async fn set_role(&self, role: &Role) -> Result<(), StoreError> {
        self.backend.set(keys::USER_ROLE, role.as_str()).await
    }

    /// Read all session keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub async fn session(&self) -> Result<StoredSession, StoreError> {
        Ok(StoredSession {
            token: self.token().await?,
            user_id: self.user_id().await?,
            role: self.role().await?,
        })
    }

    /// Remove the token, user id and role. Host and port are kept.
    ///
    /// Every key is attempted even if an earlier removal fails; the first
    /// failure is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if any key could not be removed.
    pub async fn clear_session(&self) -> Result<(), StoreError> {
        let mut first_error = None;
        for key in keys::SESSION {
            if let Err(e) = self.backend.remove(key).await {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
