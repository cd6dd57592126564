//! User roles as reported by the backend.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Role of a user account with different permission levels.
///
/// The set is closed on the server side, but the client must tolerate any
/// string it receives. Unrecognized values are kept verbatim and evaluate as
/// the least privileged role.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    /// Full access, including user administration and destructive edits.
    Admin,
    /// Day-to-day store operation: recording sales, adding products.
    Cashier,
    /// Read-only catalog access.
    Guest,
    /// A role string this client does not know about.
    Unrecognized(String),
}

impl Role {
    /// Parse a role string, case-insensitively. Never fails.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Self::Admin,
            "cashier" => Self::Cashier,
            "guest" => Self::Guest,
            _ => Self::Unrecognized(s.to_owned()),
        }
    }

    /// Wire representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "admin",
            Self::Cashier => "cashier",
            Self::Guest => "guest",
            Self::Unrecognized(raw) => raw,
        }
    }

    /// Whether this role is one of the three known roles.
    #[must_use]
    pub const fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Role::parse("ADMIN"), Role::Admin);
        assert_eq!(Role::parse("Cashier"), Role::Cashier);
        assert_eq!(Role::parse(" guest "), Role::Guest);
    }

    #[test]
    fn test_unknown_role_is_kept_verbatim() {
        let role = Role::parse("Manager");
        assert_eq!(role, Role::Unrecognized("Manager".to_string()));
        assert_eq!(role.as_str(), "Manager");
        assert!(!role.is_recognized());
    }

    #[test]
    fn test_serde_uses_plain_strings() {
        assert_eq!(serde_json::to_string(&Role::Cashier).unwrap(), "\"cashier\"");
        let role: Role = serde_json::from_str("\"Admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }
}
