//! SalesDesk client - session management and typed REST clients.
//!
//! # Architecture
//!
//! ```text
//! AppState
//!   ├── SessionManager ─┐
//!   ├── ProductsClient  │
//!   ├── SalesClient     ├── HttpClient ── Transport (reqwest | fake)
//!   ├── UsersClient     │        │
//!   └── ChatClient ─────┘        └── CredentialStore ── KeyValueStore (file | memory)
//! ```
//!
//! Construct one [`AppState`] at start-up and hand it to the front-end.
//! Nothing in this crate is global.
//!
//! # Modules
//!
//! - [`config`] - Endpoint validation and environment configuration
//! - [`store`] - Persistent credential store
//! - [`http`] - Request building, transport and error-body parsing
//! - [`session`] - Login, logout, registration and profile
//! - [`resources`] - Products, sales, users and chat
//! - [`error`] - The [`ClientError`] taxonomy

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod http;
pub mod resources;
pub mod session;
pub mod state;
pub mod store;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::{ClientConfig, ConfigError, EndpointConfig, EndpointError};
pub use error::ClientError;
pub use http::{HttpClient, Method, QueryParams, ReqwestTransport, Transport, TransportError};
pub use resources::{ChatClient, FormOptions, ProductsClient, SaleEditContext, SalesClient, UsersClient};
pub use session::{LoginOutcome, Registration, SessionManager, SessionPhase};
pub use state::{AppState, DefaultAppState};
pub use store::{CredentialStore, FileStore, KeyValueStore, MemoryStore, StoreError};
