//! User administration.

use salesdesk_core::{Email, Page, PageRequest, Role, User, UserFilter, UserId, UserUpdate};
use tracing::{debug, instrument};

use super::Collection;
use crate::error::ClientError;
use crate::http::{HttpClient, QueryParams, Transport};
use crate::store::KeyValueStore;

const USERS: Collection = Collection {
    path: "/v1/user",
    plural: "users",
    singular: "user",
};

/// Client for `/v1/user`.
pub struct UsersClient<K, T> {
    http: HttpClient<K, T>,
}

impl<K, T> Clone for UsersClient<K, T> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
        }
    }
}

impl<K: KeyValueStore, T: Transport> UsersClient<K, T> {
    #[must_use]
    pub const fn new(http: HttpClient<K, T>) -> Self {
        Self { http }
    }

    /// # Errors
    ///
    /// Returns the mapped status, transport or decode error.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: &UserFilter,
        page: &PageRequest,
    ) -> Result<Page<User>, ClientError> {
        let params = QueryParams::new().with(filter.pairs()).with(page.pairs());
        USERS.list(&self.http, &params).await
    }

    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] for an unknown id, or another mapped error.
    #[instrument(skip(self))]
    pub async fn get(&self, id: UserId) -> Result<User, ClientError> {
        USERS.get(&self.http, id).await
    }

    /// Send only the fields of `update` that differ from `current`.
    ///
    /// When the signed-in user changes their own role or active flag, the
    /// cached role is replaced with the one the server returned.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::LocalValidation`] for a malformed email, or
    /// the mapped server error.
    #[instrument(skip(self, current, update), fields(id = %current.id))]
    pub async fn update(&self, current: &User, update: &UserUpdate) -> Result<User, ClientError> {
        let diff = current.diff(update);
        if diff.is_empty() {
            debug!("User unchanged, skipping update");
            return Ok(current.clone());
        }
        if let Some(email) = &diff.email {
            Email::parse(email)?;
        }
        let user: User = USERS.update(&self.http, current.id, &diff.to_wire()).await?;

        if diff.touches_access() && self.http.store().user_id().await? == Some(user.id) {
            debug!(role = %user.role, "Own access changed, updating cached role");
            self.http.store().set_role(&user.role).await?;
        }
        Ok(user)
    }

    /// Activate or deactivate an account.
    ///
    /// # Errors
    ///
    /// Same as [`UsersClient::update`].
    pub async fn set_active(&self, user: &User, active: bool) -> Result<User, ClientError> {
        let update = UserUpdate {
            is_active: Some(active),
            ..UserUpdate::default()
        };
        self.update(user, &update).await
    }

    /// Change an account's role.
    ///
    /// # Errors
    ///
    /// Same as [`UsersClient::update`].
    pub async fn set_role(&self, user: &User, role: Role) -> Result<User, ClientError> {
        let update = UserUpdate {
            role: Some(role),
            ..UserUpdate::default()
        };
        self.update(user, &update).await
    }

    /// # Errors
    ///
    /// Returns the mapped status or transport error.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: UserId) -> Result<(), ClientError> {
        USERS.delete(&self.http, id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use salesdesk_core::WireRecord;
    use serde_json::json;

    use super::*;
    use crate::store::MemoryStore;
    use crate::testing::{FakeTransport, memory_client, user_json};

    fn client() -> (UsersClient<MemoryStore, FakeTransport>, FakeTransport) {
        let (http, transport) = memory_client();
        (UsersClient::new(http), transport)
    }

    #[tokio::test]
    async fn test_list_filters() {
        let (users, transport) = client();
        transport.push_json(200, &json!({"users": [user_json(2, "cashier")], "metadata": {}}));

        let filter = UserFilter {
            email: Some("shop.example".to_string()),
            is_active: Some(true),
            ..UserFilter::default()
        };
        let page = users.list(&filter, &PageRequest::default()).await.unwrap();

        assert_eq!(page.items[0].role, Role::Cashier);
        assert_eq!(transport.requests()[0].path, "/v1/user?email=shop.example&is_active=true");
    }

    #[tokio::test]
    async fn test_set_role_sends_only_role() {
        let (users, transport) = client();
        let user = User::from_wire(&user_json(2, "cashier")).unwrap();
        transport.push_json(200, &json!({"user": user_json(2, "admin")}));

        let updated = users.set_role(&user, Role::Admin).await.unwrap();

        assert_eq!(updated.role, Role::Admin);
        let sent = &transport.requests()[0];
        assert_eq!(sent.path, "/v1/user/2");
        assert_eq!(sent.body, Some(json!({"role": "admin"})));
    }

    #[tokio::test]
    async fn test_own_role_change_updates_cached_role() {
        let (users, transport) = client();
        let me = User::from_wire(&user_json(1, "admin")).unwrap();
        users.http.store().set_user_id(me.id).await.unwrap();
        users.http.store().set_role(&Role::Admin).await.unwrap();
        transport.push_json(200, &json!({"user": user_json(1, "cashier")}));

        users.set_role(&me, Role::Cashier).await.unwrap();
        assert_eq!(users.http.store().role().await.unwrap(), Some(Role::Cashier));
    }

    #[tokio::test]
    async fn test_other_users_changes_leave_cached_role() {
        let (users, transport) = client();
        users.http.store().set_user_id(UserId::new(1)).await.unwrap();
        users.http.store().set_role(&Role::Admin).await.unwrap();
        let other = User::from_wire(&user_json(2, "cashier")).unwrap();
        transport.push_json(200, &json!({"user": user_json(2, "guest")}));

        users.set_role(&other, Role::Guest).await.unwrap();
        assert_eq!(users.http.store().role().await.unwrap(), Some(Role::Admin));

        // Name changes never touch the cache, even for the signed-in user.
        let me = User::from_wire(&user_json(1, "cashier")).unwrap();
        transport.push_json(200, &json!({"user": user_json(1, "cashier")}));
        let update = UserUpdate {
            first_name: Some("Grace".to_string()),
            ..UserUpdate::default()
        };
        users.update(&me, &update).await.unwrap();
        assert_eq!(users.http.store().role().await.unwrap(), Some(Role::Admin));
    }

    #[tokio::test]
    async fn test_set_active_noop_when_unchanged() {
        let (users, transport) = client();
        let user = User::from_wire(&user_json(2, "cashier")).unwrap();
        assert!(user.is_active);

        users.set_active(&user, true).await.unwrap();
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_update_rejects_bad_email_locally() {
        let (users, transport) = client();
        let user = User::from_wire(&user_json(2, "cashier")).unwrap();
        let update = UserUpdate {
            email: Some("nope".to_string()),
            ..UserUpdate::default()
        };
        assert!(matches!(
            users.update(&user, &update).await,
            Err(ClientError::LocalValidation(_))
        ));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_forbidden() {
        let (users, transport) = client();
        transport.push_json(403, &json!({"error": "your user account doesn't have the necessary permissions to access this resource"}));

        let err = users.delete(UserId::new(2)).await.unwrap_err();
        assert!(matches!(err, ClientError::PermissionDenied(_)));
        assert!(err.to_string().starts_with("your user account"));
    }
}
