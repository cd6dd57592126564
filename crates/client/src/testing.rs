//! Test doubles: a scripted transport and wire fixtures.
//!
//! Available to this crate's tests and, with the `testing` feature, to
//! other crates.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::{Value, json};

use crate::http::{HttpClient, HttpRequest, HttpResponse, Method, Transport, TransportError};
use crate::store::{CredentialStore, MemoryStore};

/// What the fake transport saw for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    /// Path plus query string.
    pub path: String,
    pub body: Option<Value>,
    pub content_type: String,
    pub authorization: Option<String>,
}

type Scripted = Result<HttpResponse, TransportError>;

/// Transport that replays queued responses in order and records requests.
///
/// When the queue is empty every request fails as unreachable.
#[derive(Debug, Clone, Default)]
pub struct FakeTransport {
    inner: Arc<FakeTransportInner>,
}

#[derive(Debug, Default)]
struct FakeTransportInner {
    responses: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl FakeTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_json(&self, status: u16, body: &Value) {
        self.push_text(status, &body.to_string());
    }

    pub fn push_text(&self, status: u16, body: &str) {
        lock(&self.inner.responses).push_back(Ok(HttpResponse {
            status,
            body: body.to_owned(),
        }));
    }

    pub fn push_failure(&self, error: TransportError) {
        lock(&self.inner.responses).push_back(Err(error));
    }

    /// Every request sent so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.inner.requests).clone()
    }

    #[must_use]
    pub fn request_count(&self) -> usize {
        lock(&self.inner.requests).len()
    }
}

impl Transport for FakeTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let recorded = RecordedRequest {
            method: request.method,
            url: request.url.clone(),
            path: request.path_and_query().to_owned(),
            body: request.body.clone(),
            content_type: request.header("Content-Type").unwrap_or_default(),
            authorization: request.header("Authorization"),
        };
        let label = format!("{} {}", recorded.method, recorded.path);
        lock(&self.inner.requests).push(recorded);

        lock(&self.inner.responses)
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Unreachable(format!("no scripted response for {label}"))))
    }
}

/// An HTTP client over an empty in-memory store and a fresh fake transport.
#[must_use]
pub fn memory_client() -> (HttpClient<MemoryStore, FakeTransport>, FakeTransport) {
    let transport = FakeTransport::new();
    let http = HttpClient::new(CredentialStore::new(MemoryStore::new()), transport.clone());
    (http, transport)
}

// =============================================================================
// Wire fixtures
// =============================================================================

/// A snake_case user record.
#[must_use]
pub fn user_json(id: i64, role: &str) -> Value {
    json!({
        "id": id,
        "first_name": "Ada",
        "last_name": "Lovelace",
        "email": format!("user{id}@shop.example"),
        "role": role,
        "is_active": true,
        "created_at": "2024-01-15T09:30:00Z"
    })
}

/// A capitalized-field product record.
#[must_use]
pub fn product_json(id: i64, name: &str) -> Value {
    json!({
        "ID": id,
        "Name": name,
        "Description": "Whole bean, 1kg",
        "Price": 12.5,
        "Stock": 40,
        "CreatedAt": "2024-02-01T08:00:00Z"
    })
}

/// A snake_case sale record.
#[must_use]
pub fn sale_json(id: i64, user_id: i64, product_id: i64) -> Value {
    json!({
        "id": id,
        "user_id": user_id,
        "product_id": product_id,
        "quantity": 2,
        "total_price": "25.00",
        "sale_date": "2024-03-10T14:00:00Z",
        "created_at": "2024-03-10T14:00:05Z",
        "updated_at": "2024-03-11T10:00:00Z"
    })
}
