//! Unified error handling for the client.
//!
//! Every failure a caller sees is a [`ClientError`] whose `Display` is the
//! message to show the user. Messages that came from the server are carried
//! verbatim and never wrapped in a generic phrase.

use salesdesk_core::{EmailError, WireError};
use thiserror::Error;

use crate::config::EndpointError;
use crate::http::{ApiResponse, TransportError};
use crate::store::StoreError;

/// Client-level error type.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server could not be reached.
    #[error("{0}")]
    Network(#[from] TransportError),

    /// 401 on an authenticated call. The session is no longer valid.
    #[error("{0}")]
    AuthenticationRequired(String),

    /// 403: the server refused the action for this role.
    #[error("{0}")]
    PermissionDenied(String),

    /// 404.
    #[error("{0}")]
    NotFound(String),

    /// 422 with the server's validation message.
    #[error("{0}")]
    ValidationFailed(String),

    /// Any other non-success status.
    #[error("{message}")]
    ServerError {
        /// HTTP status code.
        status: u16,
        /// Server message, or a fallback naming the status.
        message: String,
    },

    /// The account exists but has not been activated yet.
    #[error("{0}")]
    ActivationRequired(String),

    /// Client-side input check failed; nothing was sent.
    #[error("{0}")]
    LocalValidation(String),

    /// Reading or writing the credential store failed.
    #[error("local storage error: {0}")]
    Storage(#[from] StoreError),

    /// A success response did not have the expected shape.
    #[error("unexpected response from server: {0}")]
    Decode(String),
}

impl ClientError {
    /// Map a non-success response to an error using the uniform status table.
    #[must_use]
    pub fn from_response(response: &ApiResponse) -> Self {
        Self::from_status(response.status_code, response.error_message())
    }

    /// Map a status code and server message to an error.
    #[must_use]
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => Self::AuthenticationRequired(message),
            403 => Self::PermissionDenied(message),
            404 => Self::NotFound(message),
            422 => Self::ValidationFailed(message),
            _ => Self::ServerError { status, message },
        }
    }

    /// HTTP status behind this error, when it came from a response.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::AuthenticationRequired(_) => Some(401),
            Self::PermissionDenied(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::ValidationFailed(_) => Some(422),
            Self::ServerError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether a retry affordance makes sense (transport or 5xx failures).
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::ServerError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<WireError> for ClientError {
    fn from(err: WireError) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<EmailError> for ClientError {
    fn from(err: EmailError) -> Self {
        Self::LocalValidation(err.to_string())
    }
}

impl From<EndpointError> for ClientError {
    fn from(err: EndpointError) -> Self {
        Self::LocalValidation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_table() {
        let cases = [
            (401, 401),
            (403, 403),
            (404, 404),
            (422, 422),
            (500, 500),
            (409, 409),
        ];
        for (input, expected) in cases {
            let err = ClientError::from_status(input, "msg".to_string());
            assert_eq!(err.status(), Some(expected));
        }
        assert!(matches!(
            ClientError::from_status(409, "conflict".to_string()),
            ClientError::ServerError { status: 409, .. }
        ));
        assert!(matches!(
            ClientError::from_status(422, "bad".to_string()),
            ClientError::ValidationFailed(_)
        ));
    }

    #[test]
    fn test_server_messages_display_verbatim() {
        let err = ClientError::from_status(422, "name must be provided".to_string());
        assert_eq!(err.to_string(), "name must be provided");

        let err = ClientError::from_status(500, "the server encountered a problem".to_string());
        assert_eq!(err.to_string(), "the server encountered a problem");
    }

    #[test]
    fn test_retryable() {
        assert!(ClientError::Network(TransportError::Timeout).is_retryable());
        assert!(ClientError::from_status(503, "down".to_string()).is_retryable());
        assert!(!ClientError::from_status(404, "gone".to_string()).is_retryable());
        assert!(!ClientError::LocalValidation("x".to_string()).is_retryable());
    }

    #[test]
    fn test_email_error_is_local_validation() {
        let err: ClientError = EmailError::MissingAtSymbol.into();
        assert!(matches!(err, ClientError::LocalValidation(_)));
        assert_eq!(err.to_string(), "email must contain an @ symbol");
    }
}
