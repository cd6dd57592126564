//! Client state shared by every front-end.
//!
//! Built once at process start and passed to whatever consumes it. All
//! clients share one credential store and one transport.

use std::sync::Arc;

use salesdesk_core::{Capability, Role};
use tracing::info;

use crate::config::{ClientConfig, EndpointConfig};
use crate::error::ClientError;
use crate::http::{HttpClient, ReqwestTransport, Transport};
use crate::resources::{ChatClient, ProductsClient, SalesClient, UsersClient};
use crate::session::SessionManager;
use crate::store::{CredentialStore, FileStore, KeyValueStore};

/// Production state: file-backed store over `reqwest`.
pub type DefaultAppState = AppState<FileStore, ReqwestTransport>;

/// Session manager and resource clients over one store and transport.
pub struct AppState<K, T> {
    inner: Arc<AppStateInner<K, T>>,
}

struct AppStateInner<K, T> {
    http: HttpClient<K, T>,
    session: SessionManager<K, T>,
    products: ProductsClient<K, T>,
    sales: SalesClient<K, T>,
    users: UsersClient<K, T>,
    chat: ChatClient<K, T>,
}

impl<K, T> Clone for AppState<K, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl DefaultAppState {
    /// Build production state from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::new(FileStore::new(&config.state_file), transport))
    }
}

impl<K: KeyValueStore, T: Transport> AppState<K, T> {
    pub fn new(store: K, transport: T) -> Self {
        let http = HttpClient::new(CredentialStore::new(store), transport);
        Self {
            inner: Arc::new(AppStateInner {
                session: SessionManager::new(http.clone()),
                products: ProductsClient::new(http.clone()),
                sales: SalesClient::new(http.clone()),
                users: UsersClient::new(http.clone()),
                chat: ChatClient::new(http.clone()),
                http,
            }),
        }
    }

    pub fn http(&self) -> &HttpClient<K, T> {
        &self.inner.http
    }

    pub fn store(&self) -> &CredentialStore<K> {
        self.inner.http.store()
    }

    pub fn session(&self) -> &SessionManager<K, T> {
        &self.inner.session
    }

    pub fn products(&self) -> &ProductsClient<K, T> {
        &self.inner.products
    }

    pub fn sales(&self) -> &SalesClient<K, T> {
        &self.inner.sales
    }

    pub fn users(&self) -> &UsersClient<K, T> {
        &self.inner.users
    }

    pub fn chat(&self) -> &ChatClient<K, T> {
        &self.inner.chat
    }

    /// Effective server address.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn endpoint(&self) -> Result<EndpointConfig, ClientError> {
        Ok(self.store().endpoint().await?)
    }

    /// Validate and persist a new server address.
    ///
    /// Any stored session is kept and will be sent to the new server.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::LocalValidation`] for an invalid host or port,
    /// or a storage error.
    pub async fn update_endpoint(&self, host: &str, port: &str) -> Result<EndpointConfig, ClientError> {
        let endpoint = EndpointConfig::parse(host, port)?;
        self.store().set_endpoint(&endpoint).await?;
        info!(endpoint = %endpoint, "Server endpoint updated");
        Ok(endpoint)
    }

    /// Whether the current role grants `capability`. Without a session the
    /// caller is treated as a guest.
    ///
    /// # Errors
    ///
    /// Returns an error if the role cannot be recovered.
    pub async fn can(&self, capability: Capability) -> Result<bool, ClientError> {
        let role = self.session().current_role().await?.unwrap_or(Role::Guest);
        Ok(role.can(capability))
    }
}

impl<K, T> std::fmt::Debug for AppState<K, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
