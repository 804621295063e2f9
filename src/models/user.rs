//! User profile model and role predicates.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::Activity;

/// Role of a user, the single source of truth for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Regular participant
    User,
    /// Administers one company
    CompanyAdmin,
    /// Cross-tenant administrator
    SystemAdmin,
}

/// User profile stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Identity provider user id (also used as document ID)
    pub id: String,
    /// Email address
    pub email: String,
    /// Display name
    pub full_name: String,
    /// Owning company; `None` only transiently during signup
    pub company_id: Option<String>,
    /// Role within the system
    pub user_role: UserRole,
    /// When the profile was created (RFC3339)
    pub created_at: String,
}

impl User {
    /// Whether the user can administer their company.
    pub fn is_company_admin(&self) -> bool {
        matches!(
            self.user_role,
            UserRole::CompanyAdmin | UserRole::SystemAdmin
        )
    }

    /// Whether the user has cross-tenant privileges.
    pub fn is_system_admin(&self) -> bool {
        self.user_role == UserRole::SystemAdmin
    }

    /// Whether the user may edit or deactivate the given activity.
    ///
    /// Global activities (no owning company) are only modifiable by a system
    /// admin; company activities only by admins of that same company.
    pub fn can_modify_activity(&self, activity: &Activity) -> bool {
        if self.is_system_admin() {
            return true;
        }
        if !self.is_company_admin() {
            return false;
        }
        match (&activity.company_id, &self.company_id) {
            (Some(owner), Some(own)) => owner == own,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScoringTiers;

    fn make_user(role: UserRole, company_id: Option<&str>) -> User {
        User {
            id: "user-1".to_string(),
            email: "user@example.com".to_string(),
            full_name: "Test User".to_string(),
            company_id: company_id.map(String::from),
            user_role: role,
            created_at: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    fn make_activity(company_id: Option<&str>) -> Activity {
        Activity {
            id: "act-1".to_string(),
            name: "Running".to_string(),
            description: String::new(),
            unit: "km".to_string(),
            scoring_tiers: ScoringTiers { tiers: vec![] },
            company_id: company_id.map(String::from),
            is_active: true,
            created_at: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_role_predicates() {
        assert!(!make_user(UserRole::User, Some("c1")).is_company_admin());
        assert!(make_user(UserRole::CompanyAdmin, Some("c1")).is_company_admin());
        assert!(make_user(UserRole::SystemAdmin, None).is_company_admin());

        assert!(!make_user(UserRole::CompanyAdmin, Some("c1")).is_system_admin());
        assert!(make_user(UserRole::SystemAdmin, None).is_system_admin());
    }

    #[test]
    fn test_company_admin_cannot_modify_global_activity() {
        let admin = make_user(UserRole::CompanyAdmin, Some("c1"));
        let global = make_activity(None);
        assert!(!admin.can_modify_activity(&global));
    }

    #[test]
    fn test_company_admin_modifies_own_company_only() {
        let admin = make_user(UserRole::CompanyAdmin, Some("c1"));
        assert!(admin.can_modify_activity(&make_activity(Some("c1"))));
        assert!(!admin.can_modify_activity(&make_activity(Some("c2"))));
    }

    #[test]
    fn test_regular_user_modifies_nothing() {
        let user = make_user(UserRole::User, Some("c1"));
        assert!(!user.can_modify_activity(&make_activity(Some("c1"))));
        assert!(!user.can_modify_activity(&make_activity(None)));
    }

    #[test]
    fn test_system_admin_modifies_everything() {
        let sysadmin = make_user(UserRole::SystemAdmin, None);
        assert!(sysadmin.can_modify_activity(&make_activity(None)));
        assert!(sysadmin.can_modify_activity(&make_activity(Some("c1"))));
    }

    #[test]
    fn test_role_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&UserRole::CompanyAdmin).unwrap(),
            "\"company_admin\""
        );
        let parsed: UserRole = serde_json::from_str("\"system_admin\"").unwrap();
        assert_eq!(parsed, UserRole::SystemAdmin);
    }
}
