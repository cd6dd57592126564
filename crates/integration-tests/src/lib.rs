//! Integration tests for the SalesDesk client.
//!
//! Each test spins up an in-process stub of the backend on an ephemeral
//! port and drives the real client stack against it: `reqwest` transport,
//! file-backed credential store, session manager and resource clients.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p salesdesk-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `session_flow` - Login, logout, profile and registration round trips
//! - `resources` - Products, sales, users and chat against the stub
//! - `connectivity` - Unreachable servers and endpoint changes

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Once};
use std::time::Duration;

use salesdesk_client::{ClientConfig, ClientError, DefaultAppState};
use secrecy::SecretString;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub mod stub;

pub use stub::{LoggedRequest, PASSWORD, Stub, StubData};

/// Seeded admin account.
pub const ADMIN_EMAIL: &str = "admin@shop.example";
/// Seeded cashier account.
pub const CASHIER_EMAIL: &str = "cashier@shop.example";
/// Seeded account that has not been activated.
pub const INACTIVE_EMAIL: &str = "new@shop.example";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

static TRACING: Once = Once::new();
static SCRATCH_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Install a test-friendly subscriber once per process.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// A running stub backend.
pub struct StubBackend {
    addr: SocketAddr,
    stub: Stub,
    server: JoinHandle<()>,
}

impl StubBackend {
    /// Serve `data` on `127.0.0.1` at an ephemeral port.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn spawn(data: StubData) -> std::io::Result<Self> {
        init_tracing();
        let stub: Stub = Arc::new(Mutex::new(data));
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let app = stub::router(Arc::clone(&stub));
        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Stub backend stopped");
            }
        });
        tracing::debug!(%addr, "Stub backend listening");

        Ok(Self { addr, stub, server })
    }

    /// The default seed: three accounts and 45 products.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn seeded() -> std::io::Result<Self> {
        Self::spawn(StubData::seeded(45)).await
    }

    #[must_use]
    pub const fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Lock the stub's data to inspect it or set a response override.
    pub fn data(&self) -> MutexGuard<'_, StubData> {
        stub::lock(&self.stub)
    }

    /// Requests received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<LoggedRequest> {
        self.data().log.clone()
    }

    /// Production client state over a fresh state file, pointed at this stub.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built or the endpoint cannot
    /// be stored.
    pub async fn client(&self) -> Result<DefaultAppState, ClientError> {
        self.client_at(scratch_state_file()).await
    }

    /// Like [`Self::client`], but over an existing state file.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built or the endpoint cannot
    /// be stored.
    pub async fn client_at(&self, state_file: PathBuf) -> Result<DefaultAppState, ClientError> {
        let config = ClientConfig {
            state_file,
            timeout: REQUEST_TIMEOUT,
        };
        let state = DefaultAppState::from_config(&config)?;
        state
            .update_endpoint("127.0.0.1", &self.port().to_string())
            .await?;
        Ok(state)
    }
}

impl Drop for StubBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// A state file path no other test uses.
#[must_use]
pub fn scratch_state_file() -> PathBuf {
    let n = SCRATCH_COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir()
        .join(format!("salesdesk-it-{}", std::process::id()))
        .join(format!("state-{n}.json"))
}

/// A local port with nothing listening on it.
///
/// # Errors
///
/// Returns an error if no local port can be bound.
pub async fn closed_port() -> std::io::Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    drop(listener);
    Ok(port)
}

/// The shared seeded password as a secret.
#[must_use]
pub fn password() -> SecretString {
    SecretString::from(PASSWORD)
}
