//! Assistant chat. Free text goes to the server; the reply comes back as is.

use salesdesk_core::ChatReply;
use serde_json::json;
use tracing::instrument;

use super::decode_one;
use crate::error::ClientError;
use crate::http::{HttpClient, Method, Transport};
use crate::store::KeyValueStore;

const CHATBOT_PATH: &str = "/v1/chatbot";

/// Client for `/v1/chatbot`.
pub struct ChatClient<K, T> {
    http: HttpClient<K, T>,
}

impl<K, T> Clone for ChatClient<K, T> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
        }
    }
}

impl<K: KeyValueStore, T: Transport> ChatClient<K, T> {
    #[must_use]
    pub const fn new(http: HttpClient<K, T>) -> Self {
        Self { http }
    }

    /// Send one message and return the assistant's reply.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::LocalValidation`] for a blank message, or the
    /// mapped status, transport or decode error.
    #[instrument(skip(self, message), fields(len = message.len()))]
    pub async fn send(&self, message: &str) -> Result<ChatReply, ClientError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ClientError::LocalValidation(
                "message must not be empty".to_string(),
            ));
        }

        let body = self
            .http
            .send_json(Method::Post, CHATBOT_PATH, Some(&json!({ "message": message })))
            .await?;
        decode_one(&body, "chatbot")
    }
}
