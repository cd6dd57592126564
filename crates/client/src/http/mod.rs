//! HTTP request layer.
//!
//! Resolves paths against the stored endpoint, attaches JSON and bearer
//! headers, and hands the request to a [`Transport`].

mod parse;
mod query;
mod transport;

pub use parse::parse_error;
pub use query::QueryParams;
pub use transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport, TransportError};

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::ClientError;
use crate::store::{CredentialStore, KeyValueStore};

/// Status code plus body, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status_code: u16,
    pub body: String,
}

impl ApiResponse {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status_code, 200..=299)
    }

    /// Human-readable message for an error response.
    #[must_use]
    pub fn error_message(&self) -> String {
        parse_error(self.status_code, &self.body)
    }

    /// Decode the body. An empty body decodes as `null`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Decode`] if the body is not JSON.
    pub fn json(&self) -> Result<Value, ClientError> {
        if self.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&self.body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Pass success responses through; map anything else with the status table.
    ///
    /// # Errors
    ///
    /// Returns the mapped [`ClientError`] for a non-success status.
    pub fn into_success(self) -> Result<Self, ClientError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ClientError::from_response(&self))
        }
    }
}

impl From<HttpResponse> for ApiResponse {
    fn from(response: HttpResponse) -> Self {
        Self {
            status_code: response.status,
            body: response.body,
        }
    }
}

/// HTTP client bound to a credential store and a transport.
///
/// Cheap to clone; clones share the store and transport.
pub struct HttpClient<K, T> {
    inner: Arc<HttpClientInner<K, T>>,
}

struct HttpClientInner<K, T> {
    store: CredentialStore<K>,
    transport: T,
}

impl<K, T> Clone for HttpClient<K, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: KeyValueStore, T: Transport> HttpClient<K, T> {
    pub fn new(store: CredentialStore<K>, transport: T) -> Self {
        Self {
            inner: Arc::new(HttpClientInner { store, transport }),
        }
    }

    /// The credential store requests are resolved against.
    pub fn store(&self) -> &CredentialStore<K> {
        &self.inner.store
    }

    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    /// Send one request.
    ///
    /// The URL is the stored origin followed by `path` (which already carries
    /// any query string). With `include_auth` the stored token is attached
    /// when there is one; without a token the request still goes out and the
    /// server decides.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Network`] when no response arrives and
    /// [`ClientError::Storage`] when the store cannot be read. Every HTTP
    /// status, including errors, is returned as an [`ApiResponse`].
    #[instrument(skip(self, body), fields(status = tracing::field::Empty))]
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        include_auth: bool,
    ) -> Result<ApiResponse, ClientError> {
        let endpoint = self.inner.store.endpoint().await?;
        let url = format!("{}{path}", endpoint.origin());

        let bearer = if include_auth {
            self.inner.store.token().await?
        } else {
            None
        };
        if include_auth && bearer.is_none() {
            debug!("No stored token, sending unauthenticated");
        }

        let request = HttpRequest::new(method, url)
            .with_body(body.cloned())
            .with_bearer(bearer);

        let response = self.inner.transport.send(request).await.map_err(|e| {
            debug!(error = %e, "Request failed");
            ClientError::from(e)
        })?;

        tracing::Span::current().record("status", response.status);
        debug!(status = response.status, "Response received");

        Ok(response.into())
    }

    /// Authenticated request that must succeed, returning the decoded body.
    ///
    /// # Errors
    ///
    /// Returns the mapped status error, a transport error, or a decode error.
    pub async fn send_json(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ClientError> {
        self.request(method, path, body, true)
            .await?
            .into_success()?
            .json()
    }
}

impl<K, T> std::fmt::Debug for HttpClient<K, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use secrecy::SecretString;
    use serde_json::json;

    use super::*;
    use crate::config::EndpointConfig;
    use crate::testing::memory_client;

    #[tokio::test]
    async fn test_url_uses_stored_endpoint() {
        let (http, transport) = memory_client();
        http.store()
            .set_endpoint(&EndpointConfig::parse("10.0.0.9", "9090").unwrap())
            .await
            .unwrap();
        transport.push_json(200, &json!({}));

        http.request(Method::Get, "/v1/products?page=2", None, true).await.unwrap();

        let sent = transport.requests();
        assert_eq!(sent[0].url, "http://10.0.0.9:9090/v1/products?page=2");
    }

    #[tokio::test]
    async fn test_bearer_only_when_present_and_requested() {
        let (http, transport) = memory_client();
        transport.push_json(200, &json!({}));
        transport.push_json(200, &json!({}));
        transport.push_json(200, &json!({}));

        http.request(Method::Get, "/a", None, true).await.unwrap();
        http.store().set_token(&SecretString::from("tok1")).await.unwrap();
        http.request(Method::Get, "/b", None, true).await.unwrap();
        http.request(Method::Post, "/c", Some(&json!({"x": 1})), false).await.unwrap();

        let sent = transport.requests();
        assert_eq!(sent[0].authorization, None);
        assert_eq!(sent[1].authorization.as_deref(), Some("Bearer tok1"));
        assert_eq!(sent[2].authorization, None);
        assert_eq!(sent[2].body, Some(json!({"x": 1})));
        assert!(sent.iter().all(|r| r.content_type == "application/json"));
    }

    #[tokio::test]
    async fn test_error_statuses_are_returned_not_raised() {
        let (http, transport) = memory_client();
        transport.push_json(422, &json!({"error": {"name": "must be provided"}}));

        let response = http.request(Method::Post, "/v1/products", None, true).await.unwrap();
        assert!(!response.is_success());
        assert_eq!(response.error_message(), "must be provided");
        assert!(matches!(
            response.into_success(),
            Err(ClientError::ValidationFailed(m)) if m == "must be provided"
        ));
    }

    #[tokio::test]
    async fn test_transport_failure_is_network_error() {
        let (http, transport) = memory_client();
        transport.push_failure(TransportError::Unreachable("connection refused".into()));

        let err = http.request(Method::Get, "/v1/users/profile", None, true).await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_empty_body_decodes_as_null() {
        let response = ApiResponse { status_code: 204, body: String::new() };
        assert_eq!(response.json().unwrap(), Value::Null);

        let response = ApiResponse { status_code: 200, body: "nope".into() };
        assert!(matches!(response.json(), Err(ClientError::Decode(_))));
    }
}
