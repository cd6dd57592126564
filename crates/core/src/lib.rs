//! SalesDesk Core - Shared types library.
//!
//! This crate provides the types used across the SalesDesk client components:
//! - `client` - Session management and typed REST resource clients
//! - `cli` - Command-line front-end over the client
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no storage. This keeps it lightweight and usable from any front-end.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails and roles
//! - [`permissions`] - Role to capability predicates
//! - [`wire`] - Dual-naming JSON schema used by every record
//! - [`models`] - Products, sales, users and assistant replies
//! - [`pagination`] - Pages and server metadata
//! - [`filters`] - List filters that emit only active query parameters

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod filters;
pub mod models;
pub mod pagination;
pub mod permissions;
pub mod types;
pub mod wire;

pub use filters::{ProductFilter, SaleFilter, UserFilter};
pub use models::*;
pub use pagination::{Metadata, Page, PageRequest};
pub use permissions::Capability;
pub use types::*;
pub use wire::{WireError, WireNaming, WireRecord};
