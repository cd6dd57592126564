//! Session lifecycle: login, logout, registration, activation and profile.
//!
//! The stored token is the only source of truth for "is a session active".
//! The cached user id and role are copies of server state and are always
//! re-derivable with a profile fetch.
//!
//! ```text
//! LoggedOut --login--> Authenticating --ok--> LoggedIn
//!                            |                    |
//!                            +--any failure--> LoggedOut (session purged)
//! LoggedIn --profile 401--> Invalid (session purged)
//! ```

use std::sync::Arc;

use salesdesk_core::{Email, Role, User, UserUpdate, WireRecord};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::error::ClientError;
use crate::http::{ApiResponse, HttpClient, Method, Transport};
use crate::resources::decode_one;
use crate::store::{CredentialStore, KeyValueStore};

const TOKENS_PATH: &str = "/v1/tokens/authentication";
const PROFILE_PATH: &str = "/v1/users/profile";
const USERS_PATH: &str = "/v1/users";
const ACTIVATE_PATH: &str = "/v1/users/activate";

const ACTIVATION_MARKER: &str = "must be activated";

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No session, or the last attempt failed.
    LoggedOut,
    /// A login is in flight.
    Authenticating,
    /// Token held and the server accepted it on the last profile fetch.
    LoggedIn,
    /// The server rejected the stored token; local state has been purged.
    Invalid,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: SecretString,
    pub user: User,
}

/// Sign-up form.
#[derive(Debug)]
pub struct Registration {
    pub email: String,
    pub password: SecretString,
    pub first_name: String,
    pub last_name: String,
}

/// Owns the session state machine on top of an [`HttpClient`].
pub struct SessionManager<K, T> {
    http: HttpClient<K, T>,
    phase: Arc<watch::Sender<SessionPhase>>,
}

impl<K, T> Clone for SessionManager<K, T> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            phase: Arc::clone(&self.phase),
        }
    }
}

impl<K: KeyValueStore, T: Transport> SessionManager<K, T> {
    #[must_use]
    pub fn new(http: HttpClient<K, T>) -> Self {
        let (phase, _) = watch::channel(SessionPhase::LoggedOut);
        Self {
            http,
            phase: Arc::new(phase),
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        *self.phase.borrow()
    }

    fn set_phase(&self, phase: SessionPhase) {
        let previous = self.phase.send_replace(phase);
        if previous != phase {
            debug!(?previous, current = ?phase, "Session phase changed");
        }
    }

    fn store(&self) -> &CredentialStore<K> {
        self.http.store()
    }

    /// Remove every session key. Storage failures are logged, not returned.
    async fn purge(&self) {
        if let Err(e) = self.store().clear_session().await {
            warn!(error = %e, "Failed to clear stored session");
        }
    }

    // =========================================================================
    // Login / logout
    // =========================================================================

    /// Exchange credentials for a token, then load and cache the profile.
    ///
    /// The session is all-or-nothing: if any step after the credentials are
    /// sent fails, every session key is removed before the error returns.
    ///
    /// # Errors
    ///
    /// - [`ClientError::LocalValidation`] for a malformed email or empty password
    ///   (nothing is sent and the stored session is untouched)
    /// - [`ClientError::ActivationRequired`] when the account is not activated
    /// - Any mapped server, transport or storage error
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginOutcome, ClientError> {
        let email = Email::parse(email)?;
        if password.expose_secret().is_empty() {
            return Err(ClientError::LocalValidation(
                "password must be provided".to_string(),
            ));
        }

        self.set_phase(SessionPhase::Authenticating);

        match self.authenticate(&email, password).await {
            Ok(outcome) => {
                self.set_phase(SessionPhase::LoggedIn);
                info!(user_id = %outcome.user.id, role = %outcome.user.role, "Logged in");
                Ok(outcome)
            }
            Err(e) => {
                self.purge().await;
                self.set_phase(SessionPhase::LoggedOut);
                warn!(error = %e, "Login failed");
                Err(e)
            }
        }
    }

    async fn authenticate(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<LoginOutcome, ClientError> {
        let body = json!({
            "email": email.as_str(),
            "password": password.expose_secret(),
        });
        let response = self
            .http
            .request(Method::Post, TOKENS_PATH, Some(&body), false)
            .await?;
        if !response.is_success() {
            return Err(session_error(&response));
        }

        let token = extract_token(&response.json()?)?;
        // Persisted before the profile fetch so that call can authenticate.
        self.store().set_token(&token).await?;

        let user = self.fetch_profile().await?;
        self.cache_user(&user).await?;

        Ok(LoginOutcome { token, user })
    }

    /// Revoke the token server-side (best effort) and purge local state.
    ///
    /// Never fails: network and server errors are logged and ignored, and the
    /// local purge always happens.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        match self.store().token().await {
            Ok(Some(_)) => {
                match self
                    .http
                    .request(Method::Delete, TOKENS_PATH, None, true)
                    .await
                {
                    Ok(response) if response.is_success() => debug!("Token revoked"),
                    Ok(response) => warn!(
                        status = response.status_code,
                        message = %response.error_message(),
                        "Token revocation rejected"
                    ),
                    Err(e) => warn!(error = %e, "Token revocation failed"),
                }
            }
            Ok(None) => debug!("No token to revoke"),
            Err(e) => warn!(error = %e, "Could not read stored token"),
        }

        self.purge().await;
        self.set_phase(SessionPhase::LoggedOut);
        info!("Logged out");
    }

    // =========================================================================
    // Profile
    // =========================================================================

    async fn fetch_profile(&self) -> Result<User, ClientError> {
        let response = self
            .http
            .request(Method::Get, PROFILE_PATH, None, true)
            .await?;
        if !response.is_success() {
            return Err(session_error(&response));
        }
        decode_one(&response.json()?, "user")
    }

    async fn cache_user(&self, user: &User) -> Result<(), ClientError> {
        self.store().set_user_id(user.id).await?;
        self.store().set_role(&user.role).await?;
        Ok(())
    }

    /// Fetch the signed-in user's profile.
    ///
    /// This is the only way a stale token is detected: a 401 purges the
    /// session and moves the phase to [`SessionPhase::Invalid`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AuthenticationRequired`] on 401, or the mapped
    /// error for any other failure.
    #[instrument(skip(self))]
    pub async fn get_current_user(&self) -> Result<User, ClientError> {
        match self.fetch_profile().await {
            Ok(user) => {
                self.set_phase(SessionPhase::LoggedIn);
                Ok(user)
            }
            Err(e @ ClientError::AuthenticationRequired(_)) => {
                self.purge().await;
                self.set_phase(SessionPhase::Invalid);
                info!("Stored session rejected by server");
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Whether a session is active, as confirmed by the server.
    ///
    /// False without a stored token. Errors are never propagated.
    #[instrument(skip(self))]
    pub async fn is_logged_in(&self) -> bool {
        match self.store().token().await {
            Ok(Some(_)) => match self.get_current_user().await {
                Ok(_) => true,
                Err(e) => {
                    debug!(error = %e, "Session check failed");
                    false
                }
            },
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, "Could not read stored token");
                false
            }
        }
    }

    /// Re-fetch the profile and overwrite the cached user id and role.
    ///
    /// # Errors
    ///
    /// Same as [`SessionManager::get_current_user`], plus storage errors.
    #[instrument(skip(self))]
    pub async fn refresh_user_data(&self) -> Result<User, ClientError> {
        let user = self.get_current_user().await?;
        self.cache_user(&user).await?;
        Ok(user)
    }

    /// Cached role, recovered from the server when a token is held but the
    /// role cache is empty. `None` when there is no session.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or the recovery fetch fails.
    pub async fn current_role(&self) -> Result<Option<Role>, ClientError> {
        let session = self.store().session().await?;
        if session.role.is_some() {
            return Ok(session.role);
        }
        if !session.has_token() {
            return Ok(None);
        }
        debug!("Token without cached role, refreshing profile");
        Ok(Some(self.refresh_user_data().await?.role))
    }

    /// Update the signed-in user's own profile with only the changed fields.
    ///
    /// An update with nothing to change returns `current` without a request.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::LocalValidation`] for a malformed email, or the
    /// mapped server error.
    #[instrument(skip(self, current, update), fields(user_id = %current.id))]
    pub async fn update_profile(
        &self,
        current: &User,
        update: &UserUpdate,
    ) -> Result<User, ClientError> {
        let diff = current.diff(update);
        if diff.is_empty() {
            debug!("Profile unchanged, skipping update");
            return Ok(current.clone());
        }
        if let Some(email) = &diff.email {
            Email::parse(email)?;
        }

        let path = format!("{PROFILE_PATH}/{}", current.id);
        let response = self
            .http
            .request(Method::Put, &path, Some(&diff.to_wire()), true)
            .await?;
        if !response.is_success() {
            return Err(session_error(&response));
        }

        let user: User = decode_one(&response.json()?, "user")?;
        self.cache_user(&user).await?;
        Ok(user)
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Create an account. No session state is touched.
    ///
    /// Returns the created user when the server echoes it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::LocalValidation`] for blank fields or a
    /// malformed email, otherwise the server's message verbatim.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> Result<Option<User>, ClientError> {
        let email = Email::parse(&registration.email)?;
        if registration.password.expose_secret().is_empty() {
            return Err(ClientError::LocalValidation(
                "password must be provided".to_string(),
            ));
        }
        for (field, value) in [
            ("first name", &registration.first_name),
            ("last name", &registration.last_name),
        ] {
            if value.trim().is_empty() {
                return Err(ClientError::LocalValidation(format!(
                    "{field} must be provided"
                )));
            }
        }

        let body = json!({
            "email": email.as_str(),
            "password": registration.password.expose_secret(),
            "first_name": registration.first_name.trim(),
            "last_name": registration.last_name.trim(),
        });
        let response = self
            .http
            .request(Method::Post, USERS_PATH, Some(&body), false)
            .await?
            .into_success()?;

        info!("Registration accepted");
        optional_user(&response)
    }

    /// Activate an account with the token from the activation email.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::LocalValidation`] for a blank token, otherwise
    /// the server's message verbatim.
    #[instrument(skip(self, token))]
    pub async fn activate(&self, token: &str) -> Result<Option<User>, ClientError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ClientError::LocalValidation(
                "activation token must be provided".to_string(),
            ));
        }

        let response = self
            .http
            .request(Method::Put, ACTIVATE_PATH, Some(&json!({ "token": token })), false)
            .await?
            .into_success()?;

        info!("Account activated");
        optional_user(&response)
    }
}

impl<K, T> std::fmt::Debug for SessionManager<K, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("phase", &*self.phase.borrow())
            .finish_non_exhaustive()
    }
}

/// Error mapping for session calls, which add the activation case.
fn session_error(response: &ApiResponse) -> ClientError {
    let message = response.error_message();
    if response.status_code != 401 && is_activation_message(&message) {
        ClientError::ActivationRequired(message)
    } else {
        ClientError::from_status(response.status_code, message)
    }
}

fn is_activation_message(message: &str) -> bool {
    message.to_lowercase().contains(ACTIVATION_MARKER)
}

/// Token from `{authentication_token: "..."}` or
/// `{authentication_token: {token, expiry}}`.
fn extract_token(body: &Value) -> Result<SecretString, ClientError> {
    let raw = match body.get("authentication_token") {
        Some(Value::String(token)) => Some(token.as_str()),
        Some(Value::Object(fields)) => fields.get("token").and_then(Value::as_str),
        _ => None,
    };
    raw.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(SecretString::from)
        .ok_or_else(|| ClientError::Decode("response has no authentication_token".to_string()))
}

fn optional_user(response: &ApiResponse) -> Result<Option<User>, ClientError> {
    match response.json()?.get("user") {
        Some(user) if !user.is_null() => Ok(Some(User::from_wire(user)?)),
        _ => Ok(None),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use salesdesk_core::UserId;
    use serde_json::json;

    use super::*;
    use crate::config::EndpointConfig;
    use crate::http::TransportError;
    use crate::store::{MemoryStore, keys};
    use crate::testing::{FakeTransport, memory_client, user_json};

    fn manager() -> (SessionManager<MemoryStore, FakeTransport>, FakeTransport) {
        let (http, transport) = memory_client();
        (SessionManager::new(http), transport)
    }

    fn password() -> SecretString {
        SecretString::from("pa55word")
    }

    async fn seed_session(session: &SessionManager<MemoryStore, FakeTransport>) {
        let store = session.store();
        store.set_token(&SecretString::from("tok1")).await.unwrap();
        store.set_user_id(UserId::new(7)).await.unwrap();
        store.set_role(&Role::Cashier).await.unwrap();
    }

    #[tokio::test]
    async fn test_login_persists_token_and_profile() {
        let (session, transport) = manager();
        transport.push_json(201, &json!({"authentication_token": "tok1"}));
        transport.push_json(200, &json!({"user": user_json(7, "cashier")}));

        let outcome = session.login("a@b.com", &password()).await.unwrap();

        assert_eq!(outcome.token.expose_secret(), "tok1");
        assert_eq!(outcome.user.id, UserId::new(7));
        let stored = session.store().session().await.unwrap();
        assert_eq!(stored.token.unwrap().expose_secret(), "tok1");
        assert_eq!(stored.role, Some(Role::Cashier));
        assert_eq!(stored.user_id, Some(UserId::new(7)));
        assert_eq!(session.phase(), SessionPhase::LoggedIn);

        let sent = transport.requests();
        assert_eq!(sent[0].path, "/v1/tokens/authentication");
        assert_eq!(sent[0].authorization, None);
        assert_eq!(sent[0].body, Some(json!({"email": "a@b.com", "password": "pa55word"})));
        assert_eq!(sent[1].path, "/v1/users/profile");
        assert_eq!(sent[1].authorization.as_deref(), Some("Bearer tok1"));
    }

    #[tokio::test]
    async fn test_login_accepts_token_object() {
        let (session, transport) = manager();
        transport.push_json(
            201,
            &json!({"authentication_token": {"token": "tok2", "expiry": "2030-01-01T00:00:00Z"}}),
        );
        transport.push_json(200, &json!({"user": user_json(3, "admin")}));

        let outcome = session.login("a@b.com", &password()).await.unwrap();
        assert_eq!(outcome.token.expose_secret(), "tok2");
    }

    #[tokio::test]
    async fn test_login_profile_401_purges_everything() {
        let (session, transport) = manager();
        seed_session(&session).await;
        transport.push_json(201, &json!({"authentication_token": "tok1"}));
        transport.push_json(401, &json!({"error": "invalid or missing authentication token"}));

        let err = session.login("a@b.com", &password()).await.unwrap_err();

        assert!(matches!(err, ClientError::AuthenticationRequired(_)));
        let stored = session.store().session().await.unwrap();
        assert!(stored.token.is_none());
        assert!(stored.user_id.is_none());
        assert!(stored.role.is_none());
        assert_eq!(session.phase(), SessionPhase::LoggedOut);
    }

    #[tokio::test]
    async fn test_login_network_failure_purges() {
        let (session, transport) = manager();
        transport.push_json(201, &json!({"authentication_token": "tok1"}));
        transport.push_failure(TransportError::Timeout);

        let err = session.login("a@b.com", &password()).await.unwrap_err();
        assert!(matches!(err, ClientError::Network(TransportError::Timeout)));
        assert!(session.store().token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_rejected_credentials() {
        let (session, transport) = manager();
        transport.push_json(401, &json!({"error": "invalid authentication credentials"}));

        let err = session.login("a@b.com", &password()).await.unwrap_err();
        assert_eq!(err.to_string(), "invalid authentication credentials");
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_login_missing_token_is_decode_error() {
        let (session, transport) = manager();
        transport.push_json(201, &json!({"something_else": true}));

        let err = session.login("a@b.com", &password()).await.unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[tokio::test]
    async fn test_login_activation_required() {
        let (session, transport) = manager();
        transport.push_json(201, &json!({"authentication_token": "tok1"}));
        transport.push_json(
            403,
            &json!({"error": "Your user account Must Be Activated to access this resource"}),
        );

        let err = session.login("a@b.com", &password()).await.unwrap_err();
        assert!(matches!(err, ClientError::ActivationRequired(_)));
        assert!(session.store().token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_local_validation_sends_nothing() {
        let (session, transport) = manager();
        seed_session(&session).await;

        let err = session.login("not-an-email", &password()).await.unwrap_err();
        assert!(matches!(err, ClientError::LocalValidation(_)));
        let err = session
            .login("a@b.com", &SecretString::from(""))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::LocalValidation(_)));

        assert_eq!(transport.request_count(), 0);
        assert!(session.store().token().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_get_current_user_401_invalidates() {
        let (session, transport) = manager();
        seed_session(&session).await;
        transport.push_json(401, &json!({"error": "invalid or missing authentication token"}));

        let err = session.get_current_user().await.unwrap_err();
        assert!(matches!(err, ClientError::AuthenticationRequired(_)));
        assert_eq!(session.phase(), SessionPhase::Invalid);
        assert!(session.store().session().await.unwrap().token.is_none());
    }

    #[tokio::test]
    async fn test_get_current_user_other_error_keeps_session() {
        let (session, transport) = manager();
        seed_session(&session).await;
        transport.push_json(500, &json!({"error": "the server encountered a problem"}));

        let err = session.get_current_user().await.unwrap_err();
        assert!(matches!(err, ClientError::ServerError { status: 500, .. }));
        assert_eq!(err.to_string(), "the server encountered a problem");
        assert!(session.store().token().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_is_logged_in() {
        let (session, transport) = manager();
        assert!(!session.is_logged_in().await);
        assert_eq!(transport.request_count(), 0);

        seed_session(&session).await;
        transport.push_json(200, &json!({"user": user_json(7, "cashier")}));
        assert!(session.is_logged_in().await);
        assert_eq!(session.phase(), SessionPhase::LoggedIn);

        transport.push_failure(TransportError::Unreachable("refused".into()));
        assert!(!session.is_logged_in().await);
    }

    #[tokio::test]
    async fn test_logout_always_purges() {
        let (session, transport) = manager();
        seed_session(&session).await;
        transport.push_failure(TransportError::Unreachable("refused".into()));

        session.logout().await;

        assert!(session.store().session().await.unwrap().token.is_none());
        assert_eq!(session.phase(), SessionPhase::LoggedOut);
        let sent = transport.requests();
        assert_eq!(sent[0].method, Method::Delete);
        assert_eq!(sent[0].authorization.as_deref(), Some("Bearer tok1"));
    }

    #[tokio::test]
    async fn test_logout_keeps_endpoint() {
        let (session, transport) = manager();
        let endpoint = EndpointConfig::parse("192.168.0.4", "8000").unwrap();
        session.store().set_endpoint(&endpoint).await.unwrap();
        seed_session(&session).await;
        transport.push_json(500, &json!({}));

        session.logout().await;

        let snapshot = session.store().backend().snapshot().await;
        assert_eq!(snapshot.get(keys::SERVER_HOST).map(String::as_str), Some("192.168.0.4"));
        assert!(!snapshot.contains_key(keys::AUTH_TOKEN));
    }

    #[tokio::test]
    async fn test_logout_without_token_sends_nothing() {
        let (session, transport) = manager();
        session.logout().await;
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_current_role_recovers_from_token() {
        let (session, transport) = manager();
        assert_eq!(session.current_role().await.unwrap(), None);

        session
            .store()
            .set_token(&SecretString::from("tok1"))
            .await
            .unwrap();
        transport.push_json(200, &json!({"user": user_json(9, "admin")}));

        assert_eq!(session.current_role().await.unwrap(), Some(Role::Admin));
        assert_eq!(session.store().user_id().await.unwrap(), Some(UserId::new(9)));

        // Served from cache now.
        assert_eq!(session.current_role().await.unwrap(), Some(Role::Admin));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_refresh_overwrites_cached_role() {
        let (session, transport) = manager();
        seed_session(&session).await;
        transport.push_json(200, &json!({"user": user_json(7, "admin")}));

        session.refresh_user_data().await.unwrap();
        assert_eq!(session.store().role().await.unwrap(), Some(Role::Admin));
    }

    #[tokio::test]
    async fn test_update_profile_sends_only_changes() {
        let (session, transport) = manager();
        seed_session(&session).await;
        let current = User::from_wire(&user_json(7, "cashier")).unwrap();

        let unchanged = UserUpdate {
            first_name: Some(current.first_name.clone()),
            ..UserUpdate::default()
        };
        let same = session.update_profile(&current, &unchanged).await.unwrap();
        assert_eq!(same, current);
        assert_eq!(transport.request_count(), 0);

        let mut returned = user_json(7, "cashier");
        returned["last_name"] = json!("Byron");
        transport.push_json(200, &json!({"user": returned}));
        let update = UserUpdate {
            first_name: Some(current.first_name.clone()),
            last_name: Some("Byron".to_string()),
            ..UserUpdate::default()
        };
        let updated = session.update_profile(&current, &update).await.unwrap();

        assert_eq!(updated.last_name, "Byron");
        let sent = transport.requests();
        assert_eq!(sent[0].method, Method::Put);
        assert_eq!(sent[0].path, "/v1/users/profile/7");
        assert_eq!(sent[0].body, Some(json!({"last_name": "Byron"})));
    }

    #[tokio::test]
    async fn test_register_relays_server_message() {
        let (session, transport) = manager();
        transport.push_json(422, &json!({"error": {"email": "a user with this email address already exists"}}));

        let registration = Registration {
            email: "a@b.com".to_string(),
            password: password(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        };
        let err = session.register(&registration).await.unwrap_err();

        assert!(matches!(err, ClientError::ValidationFailed(_)));
        assert_eq!(err.to_string(), "a user with this email address already exists");
        assert_eq!(transport.requests()[0].authorization, None);
        assert!(session.store().session().await.unwrap().token.is_none());
    }

    #[tokio::test]
    async fn test_register_returns_created_user() {
        let (session, transport) = manager();
        let mut created = user_json(12, "guest");
        created["is_active"] = json!(false);
        transport.push_json(202, &json!({"user": created}));

        let registration = Registration {
            email: " new@shop.example ".to_string(),
            password: password(),
            first_name: "New".to_string(),
            last_name: "User".to_string(),
        };
        let user = session.register(&registration).await.unwrap().unwrap();
        assert!(!user.is_active);
        assert_eq!(transport.requests()[0].body.as_ref().unwrap()["email"], "new@shop.example");
    }

    #[tokio::test]
    async fn test_register_requires_names() {
        let (session, transport) = manager();
        let registration = Registration {
            email: "a@b.com".to_string(),
            password: password(),
            first_name: " ".to_string(),
            last_name: "Lovelace".to_string(),
        };
        let err = session.register(&registration).await.unwrap_err();
        assert_eq!(err.to_string(), "first name must be provided");
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_activate() {
        let (session, transport) = manager();
        assert!(matches!(
            session.activate("  ").await,
            Err(ClientError::LocalValidation(_))
        ));

        transport.push_json(422, &json!({"error": {"token": "invalid or expired activation token"}}));
        let err = session.activate("ABCDEF").await.unwrap_err();
        assert_eq!(err.to_string(), "invalid or expired activation token");

        transport.push_json(200, &json!({"user": user_json(4, "guest")}));
        let user = session.activate("ABCDEF").await.unwrap();
        assert_eq!(user.map(|u| u.id), Some(UserId::new(4)));
        assert_eq!(
            transport.requests()[1].body,
            Some(json!({"token": "ABCDEF"}))
        );
    }

    #[test]
    fn test_activation_marker_is_case_insensitive() {
        assert!(is_activation_message("your user account MUST BE ACTIVATED"));
        assert!(!is_activation_message("account disabled"));
    }
}
