//! User accounts as seen by the client.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::changed;
use crate::types::{Role, UserId};
use crate::wire::{WireError, WireNaming, WireReader, WireRecord, WireWriter, timestamp_value};

/// Wire field table for users.
pub mod fields {
    use crate::wire::Field;

    pub const ID: Field = Field::new("id", "ID");
    pub const FIRST_NAME: Field = Field::new("first_name", "FirstName");
    pub const LAST_NAME: Field = Field::new("last_name", "LastName");
    pub const EMAIL: Field = Field::new("email", "Email");
    pub const ROLE: Field = Field::new("role", "Role");
    pub const IS_ACTIVE: Field = Field::new("is_active", "IsActive");
    pub const CREATED_AT: Field = Field::new("created_at", "CreatedAt");
    pub const UPDATED_AT: Field = Field::new("updated_at", "UpdatedAt");
}

/// A user account.
///
/// The email is kept as the server sent it; it is not re-validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// "First Last", trimmed when either part is empty.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }

    /// Keep only the fields of `update` that differ from this user.
    #[must_use]
    pub fn diff(&self, update: &UserUpdate) -> UserUpdate {
        UserUpdate {
            first_name: changed(&self.first_name, update.first_name.as_ref()),
            last_name: changed(&self.last_name, update.last_name.as_ref()),
            email: changed(&self.email, update.email.as_ref()),
            role: changed(&self.role, update.role.as_ref()),
            is_active: changed(&self.is_active, update.is_active.as_ref()),
        }
    }
}

impl WireRecord for User {
    fn from_wire(value: &Value) -> Result<Self, WireError> {
        let r = WireReader::new("user", value)?;
        Ok(Self {
            id: r.required_id(fields::ID)?,
            first_name: r.required_string(fields::FIRST_NAME)?,
            last_name: r.required_string(fields::LAST_NAME)?,
            email: r.required_string(fields::EMAIL)?,
            role: Role::parse(&r.required_string(fields::ROLE)?),
            is_active: r.required_bool(fields::IS_ACTIVE)?,
            created_at: r.required_timestamp(fields::CREATED_AT)?,
            updated_at: r.optional_timestamp(fields::UPDATED_AT)?,
        })
    }

    fn to_wire(&self, naming: WireNaming) -> Value {
        WireWriter::new(naming)
            .put(fields::ID, self.id.as_i64())
            .put(fields::FIRST_NAME, self.first_name.clone())
            .put(fields::LAST_NAME, self.last_name.clone())
            .put(fields::EMAIL, self.email.clone())
            .put(fields::ROLE, self.role.as_str())
            .put(fields::IS_ACTIVE, self.is_active)
            .put(fields::CREATED_AT, timestamp_value(self.created_at))
            .put_opt(fields::UPDATED_AT, self.updated_at.map(timestamp_value))
            .finish()
    }
}

/// Partial user update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

impl UserUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.role.is_none()
            && self.is_active.is_none()
    }

    /// Whether applying this update changes a role or active flag.
    #[must_use]
    pub const fn touches_access(&self) -> bool {
        self.role.is_some() || self.is_active.is_some()
    }

    #[must_use]
    pub fn to_wire(&self) -> Value {
        WireWriter::new(WireNaming::SnakeCase)
            .put_opt(fields::FIRST_NAME, self.first_name.clone())
            .put_opt(fields::LAST_NAME, self.last_name.clone())
            .put_opt(fields::EMAIL, self.email.clone())
            .put_opt(fields::ROLE, self.role.as_ref().map(Role::to_string))
            .put_opt(fields::IS_ACTIVE, self.is_active)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample() -> User {
        User {
            id: UserId::new(7),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@shop.example".to_string(),
            role: Role::Cashier,
            is_active: true,
            created_at: "2024-01-10T09:00:00Z".parse().unwrap(),
            updated_at: Some("2024-02-10T09:00:00Z".parse().unwrap()),
        }
    }

    #[test]
    fn test_round_trip_both_namings() {
        let user = sample();
        for naming in [WireNaming::SnakeCase, WireNaming::Capitalized] {
            let wire = user.to_wire(naming);
            assert_eq!(User::from_wire(&wire).unwrap(), user, "{naming:?}");
        }
    }

    #[test]
    fn test_unknown_role_survives_round_trip() {
        let user = User {
            role: Role::parse("auditor"),
            ..sample()
        };
        let wire = user.to_wire(WireNaming::SnakeCase);
        assert_eq!(wire["role"], json!("auditor"));
        assert_eq!(User::from_wire(&wire).unwrap().role, user.role);
    }

    #[test]
    fn test_decodes_mixed_naming_payload() {
        let wire = json!({
            "ID": 7,
            "first_name": "Ada",
            "LastName": "Lovelace",
            "email": "ada@shop.example",
            "Role": "ADMIN",
            "is_active": "true",
            "created_at": "2024-01-10T09:00:00Z"
        });
        let user = User::from_wire(&wire).unwrap();
        assert_eq!(user.role, Role::Admin);
        assert!(user.is_active);
        assert_eq!(user.full_name(), "Ada Lovelace");
    }

    #[test]
    fn test_diff_and_access_flag() {
        let user = sample();
        let update = UserUpdate {
            role: Some(Role::Admin),
            is_active: Some(true),
            ..UserUpdate::default()
        };
        let diff = user.diff(&update);
        assert!(diff.touches_access());
        assert_eq!(diff.to_wire(), json!({"role": "admin"}));

        let noop = UserUpdate {
            first_name: Some("Ada".to_string()),
            ..UserUpdate::default()
        };
        assert!(user.diff(&noop).is_empty());
    }
}
