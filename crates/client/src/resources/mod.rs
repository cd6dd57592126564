//! Typed clients for the backend's resource collections.
//!
//! Every call is authenticated and follows one status table (see
//! [`ClientError::from_status`]). Responses use envelopes keyed by the
//! resource name: `{"products": [...], "metadata": {...}}` for lists and
//! `{"product": {...}}` for single records.

mod chat;
mod products;
mod sales;
mod users;

pub use chat::ChatClient;
pub use products::ProductsClient;
pub use sales::{FormOptions, SaleEditContext, SalesClient};
pub use users::UsersClient;

use std::fmt::Display;

use salesdesk_core::{Metadata, Page, WireRecord};
use serde_json::Value;
use tracing::debug;

use crate::error::ClientError;
use crate::http::{HttpClient, Method, QueryParams, Transport};
use crate::store::KeyValueStore;

/// Decode a list envelope. A missing or `null` list is an empty page.
///
/// # Errors
///
/// Returns [`ClientError::Decode`] if the list is present but not an array,
/// or any item fails to decode.
pub(crate) fn decode_list<R: WireRecord>(body: &Value, key: &str) -> Result<Page<R>, ClientError> {
    let items = match body.get(key) {
        None | Some(Value::Null) => {
            debug!(key, "Response has no list, treating as empty");
            return Ok(Page::empty());
        }
        Some(Value::Array(items)) => items
            .iter()
            .map(R::from_wire)
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(ClientError::Decode(format!("`{key}` is not a list"))),
    };

    Ok(Page {
        items,
        metadata: Metadata::from_value(body.get("metadata")),
    })
}

/// Decode a single-record envelope.
///
/// # Errors
///
/// Returns [`ClientError::Decode`] if the key is missing or the record is malformed.
pub(crate) fn decode_one<R: WireRecord>(body: &Value, key: &str) -> Result<R, ClientError> {
    let record = body
        .get(key)
        .filter(|v| !v.is_null())
        .ok_or_else(|| ClientError::Decode(format!("response has no `{key}`")))?;
    Ok(R::from_wire(record)?)
}

/// Path and envelope names for one collection.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Collection {
    pub path: &'static str,
    pub plural: &'static str,
    pub singular: &'static str,
}

impl Collection {
    fn item_path(self, id: impl Display) -> String {
        format!("{}/{id}", self.path)
    }

    pub async fn list<R, K, T>(
        self,
        http: &HttpClient<K, T>,
        params: &QueryParams,
    ) -> Result<Page<R>, ClientError>
    where
        R: WireRecord,
        K: KeyValueStore,
        T: Transport,
    {
        let body = http
            .send_json(Method::Get, &params.apply(self.path), None)
            .await?;
        decode_list(&body, self.plural)
    }

    pub async fn get<R, K, T>(self, http: &HttpClient<K, T>, id: impl Display) -> Result<R, ClientError>
    where
        R: WireRecord,
        K: KeyValueStore,
        T: Transport,
    {
        let body = http.send_json(Method::Get, &self.item_path(id), None).await?;
        decode_one(&body, self.singular)
    }

    pub async fn create<R, K, T>(self, http: &HttpClient<K, T>, payload: &Value) -> Result<R, ClientError>
    where
        R: WireRecord,
        K: KeyValueStore,
        T: Transport,
    {
        let body = http.send_json(Method::Post, self.path, Some(payload)).await?;
        decode_one(&body, self.singular)
    }

    pub async fn update<R, K, T>(
        self,
        http: &HttpClient<K, T>,
        id: impl Display,
        payload: &Value,
    ) -> Result<R, ClientError>
    where
        R: WireRecord,
        K: KeyValueStore,
        T: Transport,
    {
        let body = http
            .send_json(Method::Put, &self.item_path(id), Some(payload))
            .await?;
        decode_one(&body, self.singular)
    }

    pub async fn delete<K, T>(self, http: &HttpClient<K, T>, id: impl Display) -> Result<(), ClientError>
    where
        K: KeyValueStore,
        T: Transport,
    {
        http.request(Method::Delete, &self.item_path(id), None, true)
            .await?
            .into_success()?;
        Ok(())
    }
}
