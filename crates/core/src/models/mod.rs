//! Domain records exchanged with the backend.
//!
//! Records are plain values. Each has a [`WireRecord`](crate::wire::WireRecord)
//! implementation with an explicit field table, a creation payload, and an
//! update set whose `diff` keeps only the fields that actually change.

pub mod chat;
pub mod product;
pub mod sale;
pub mod user;

pub use chat::ChatReply;
pub use product::{NewProduct, Product, ProductUpdate};
pub use sale::{NewSale, Sale, SaleUpdate};
pub use user::{User, UserUpdate};

/// `desired` if it differs from `current`.
fn changed<T: PartialEq + Clone>(current: &T, desired: Option<&T>) -> Option<T> {
    desired.filter(|d| *d != current).cloned()
}

/// Like [`changed`] for optional fields: setting a value that is already
/// present is not a change.
fn changed_opt<T: PartialEq + Clone>(current: Option<&T>, desired: Option<&T>) -> Option<T> {
    desired.filter(|d| Some(*d) != current).cloned()
}
