//! Role-based capability checks.
//!
//! The server enforces authorization; these predicates only decide which
//! actions a front-end offers. Every capability reduces to one of two
//! primitives, [`is_admin`] and [`is_cashier_or_above`], except viewing the
//! product catalog which every role may do.
//!
//! All functions are case-insensitive on the role string. Unknown roles,
//! including the empty string, fail every admin and cashier check.

use crate::types::Role;

/// A user-visible action gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ViewProducts,
    CreateProducts,
    EditProducts,
    DeleteProducts,
    ViewSales,
    CreateSales,
    EditSales,
    DeleteSales,
    ViewReports,
    ViewUsers,
    DeleteUsers,
    EditUserRoles,
    ToggleUserStatus,
}

/// Minimum privilege tier required by a capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Any role, recognized or not.
    Open,
    /// `cashier` or `admin`.
    CashierOrAbove,
    /// `admin` only.
    AdminOnly,
}

impl Capability {
    /// Every capability, in declaration order.
    pub const ALL: [Self; 13] = [
        Self::ViewProducts,
        Self::CreateProducts,
        Self::EditProducts,
        Self::DeleteProducts,
        Self::ViewSales,
        Self::CreateSales,
        Self::EditSales,
        Self::DeleteSales,
        Self::ViewReports,
        Self::ViewUsers,
        Self::DeleteUsers,
        Self::EditUserRoles,
        Self::ToggleUserStatus,
    ];

    /// The tier this capability requires.
    #[must_use]
    pub const fn tier(self) -> Tier {
        match self {
            Self::ViewProducts => Tier::Open,
            Self::CreateProducts
            | Self::ViewSales
            | Self::CreateSales
            | Self::ViewReports
            | Self::ViewUsers => Tier::CashierOrAbove,
            Self::EditProducts
            | Self::DeleteProducts
            | Self::EditSales
            | Self::DeleteSales
            | Self::DeleteUsers
            | Self::EditUserRoles
            | Self::ToggleUserStatus => Tier::AdminOnly,
        }
    }
}

impl Role {
    /// Whether this role has full administrative privileges.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Whether this role is `cashier` or `admin`.
    #[must_use]
    pub const fn is_cashier_or_above(&self) -> bool {
        matches!(self, Self::Admin | Self::Cashier)
    }

    /// Whether this role may perform `capability`.
    #[must_use]
    pub const fn can(&self, capability: Capability) -> bool {
        match capability.tier() {
            Tier::Open => true,
            Tier::CashierOrAbove => self.is_cashier_or_above(),
            Tier::AdminOnly => self.is_admin(),
        }
    }
}

/// Whether `role` may perform `capability`.
#[must_use]
pub fn can(role: &str, capability: Capability) -> bool {
    Role::parse(role).can(capability)
}

#[must_use]
pub fn is_admin(role: &str) -> bool {
    Role::parse(role).is_admin()
}

#[must_use]
pub fn is_cashier_or_above(role: &str) -> bool {
    Role::parse(role).is_cashier_or_above()
}

#[must_use]
pub fn can_view_products(role: &str) -> bool {
    can(role, Capability::ViewProducts)
}

#[must_use]
pub fn can_create_products(role: &str) -> bool {
    can(role, Capability::CreateProducts)
}

#[must_use]
pub fn can_edit_products(role: &str) -> bool {
    can(role, Capability::EditProducts)
}

#[must_use]
pub fn can_delete_products(role: &str) -> bool {
    can(role, Capability::DeleteProducts)
}

#[must_use]
pub fn can_view_sales(role: &str) -> bool {
    can(role, Capability::ViewSales)
}

#[must_use]
pub fn can_create_sales(role: &str) -> bool {
    can(role, Capability::CreateSales)
}

#[must_use]
pub fn can_edit_sales(role: &str) -> bool {
    can(role, Capability::EditSales)
}

#[must_use]
pub fn can_delete_sales(role: &str) -> bool {
    can(role, Capability::DeleteSales)
}

#[must_use]
pub fn can_view_reports(role: &str) -> bool {
    can(role, Capability::ViewReports)
}

#[must_use]
pub fn can_view_users(role: &str) -> bool {
    can(role, Capability::ViewUsers)
}

#[must_use]
pub fn can_delete_users(role: &str) -> bool {
    can(role, Capability::DeleteUsers)
}

#[must_use]
pub fn can_edit_user_roles(role: &str) -> bool {
    can(role, Capability::EditUserRoles)
}

#[must_use]
pub fn can_toggle_user_status(role: &str) -> bool {
    can(role, Capability::ToggleUserStatus)
}

/// Alias of [`can_edit_sales`].
#[deprecated(note = "use can_edit_sales or can_delete_sales")]
#[must_use]
pub fn can_manage_sales(role: &str) -> bool {
    can_edit_sales(role)
}

/// Alias of [`can_delete_users`].
#[deprecated(note = "use can_delete_users, can_edit_user_roles or can_toggle_user_status")]
#[must_use]
pub fn can_manage_users(role: &str) -> bool {
    can_delete_users(role)
}

/// Alias of [`can_edit_products`].
#[deprecated(note = "use can_edit_products or can_delete_products")]
#[must_use]
pub fn can_manage_products(role: &str) -> bool {
    can_edit_products(role)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NON_PRIVILEGED: &[&str] = &["guest", "GUEST", "", "manager", "root", " ", "admin2"];

    #[test]
    fn test_admin_has_every_capability() {
        for role in ["admin", "Admin", "ADMIN"] {
            for capability in Capability::ALL {
                assert!(can(role, capability), "{role} should {capability:?}");
            }
        }
    }

    #[test]
    fn test_cashier_has_exactly_cashier_tier() {
        for capability in Capability::ALL {
            let expected = capability.tier() != Tier::AdminOnly;
            assert_eq!(can("cashier", capability), expected, "{capability:?}");
        }
        assert!(is_cashier_or_above("Cashier"));
        assert!(!is_admin("cashier"));
    }

    #[test]
    fn test_non_privileged_roles_only_view_products() {
        for role in NON_PRIVILEGED {
            assert!(!is_admin(role), "{role:?}");
            assert!(!is_cashier_or_above(role), "{role:?}");
            for capability in Capability::ALL {
                assert_eq!(
                    can(role, capability),
                    capability == Capability::ViewProducts,
                    "{role:?} / {capability:?}"
                );
            }
        }
    }

    #[test]
    fn test_named_predicates_match_tiers() {
        assert!(can_view_products("guest"));
        assert!(can_create_sales("cashier"));
        assert!(can_create_products("cashier"));
        assert!(can_view_reports("cashier"));
        assert!(can_view_users("cashier"));
        assert!(!can_edit_sales("cashier"));
        assert!(!can_delete_sales("cashier"));
        assert!(!can_edit_products("cashier"));
        assert!(!can_delete_products("cashier"));
        assert!(!can_delete_users("cashier"));
        assert!(!can_edit_user_roles("cashier"));
        assert!(!can_toggle_user_status("cashier"));
        assert!(can_toggle_user_status("admin"));
        assert!(!can_view_sales("guest"));
    }

    #[test]
    #[allow(deprecated)]
    fn test_coarse_aliases_follow_granular_rules() {
        for role in ["admin", "cashier", "guest", "", "unknown"] {
            assert_eq!(can_manage_sales(role), can_edit_sales(role));
            assert_eq!(can_manage_users(role), can_delete_users(role));
            assert_eq!(can_manage_products(role), can_edit_products(role));
        }
    }
}
