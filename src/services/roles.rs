// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Role transitions with last-admin protection.
//!
//! Two entry points: company admins move members between `user` and
//! `company_admin` inside their own company; system admins may apply any
//! transition. Both refuse to leave a company (or the whole system) without
//! an admin.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{User, UserRole};

/// Role management service.
#[derive(Clone)]
pub struct RoleService {
    db: FirestoreDb,
}

impl RoleService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Whether one of the company's admins may step down.
    ///
    /// False when the company would be left without any admin.
    pub async fn can_demote_admin(&self, company_id: &str) -> Result<bool> {
        Ok(self.count_company_admins(company_id).await? > 1)
    }

    /// Promote or demote within one company (`user` ⇄ `company_admin`).
    ///
    /// Company admins cannot touch system admins, grant the system role, or
    /// reach outside their own company.
    pub async fn change_company_role(
        &self,
        actor: &User,
        target_user_id: &str,
        new_role: UserRole,
    ) -> Result<User> {
        if !actor.is_company_admin() {
            return Err(AppError::Forbidden("company admin role required".to_string()));
        }
        if new_role == UserRole::SystemAdmin {
            return Err(AppError::Forbidden(
                "only a system admin can grant the system role".to_string(),
            ));
        }

        let mut target = self.require_user(target_user_id).await?;

        if target.is_system_admin() {
            return Err(AppError::Forbidden(
                "cannot change a system admin's role".to_string(),
            ));
        }

        let company_id = match (&actor.company_id, &target.company_id) {
            (Some(a), Some(t)) if a == t => a.clone(),
            _ => {
                return Err(AppError::Forbidden(
                    "target belongs to another company".to_string(),
                ))
            }
        };

        if target.user_role == new_role {
            return Ok(target);
        }

        if target.user_role == UserRole::CompanyAdmin
            && new_role == UserRole::User
            && !self.can_demote_admin(&company_id).await?
        {
            return Err(AppError::Conflict(
                "cannot demote the last admin of a company".to_string(),
            ));
        }

        target.user_role = new_role;
        self.db.upsert_user(&target).await?;

        tracing::info!(
            actor_id = %actor.id,
            target_id = %target.id,
            role = ?target.user_role,
            "Company role changed"
        );
        Ok(target)
    }

    /// Apply any transition in the role machine (system admin action).
    ///
    /// Demoting the last remaining system admin is refused, as is stripping
    /// a company's only admin.
    pub async fn change_role(
        &self,
        actor: &User,
        target_user_id: &str,
        new_role: UserRole,
    ) -> Result<User> {
        if !actor.is_system_admin() {
            return Err(AppError::Forbidden("system admin role required".to_string()));
        }

        let mut target = self.require_user(target_user_id).await?;

        if target.user_role == new_role {
            return Ok(target);
        }

        if new_role == UserRole::CompanyAdmin && target.company_id.is_none() {
            return Err(AppError::validation(
                "role",
                "a user without a company cannot be a company admin",
            ));
        }

        if target.is_system_admin() && self.count_system_admins().await? <= 1 {
            return Err(AppError::Conflict(
                "cannot demote the last system admin".to_string(),
            ));
        }

        if new_role == UserRole::User && target.is_company_admin() {
            if let Some(company_id) = &target.company_id {
                if !self.can_demote_admin(company_id).await? {
                    return Err(AppError::Conflict(
                        "cannot demote the last admin of a company".to_string(),
                    ));
                }
            }
        }

        target.user_role = new_role;
        self.db.upsert_user(&target).await?;

        tracing::info!(
            actor_id = %actor.id,
            target_id = %target.id,
            role = ?target.user_role,
            "Role changed by system admin"
        );
        Ok(target)
    }

    async fn require_user(&self, user_id: &str) -> Result<User> {
        self.db
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }

    async fn count_company_admins(&self, company_id: &str) -> Result<usize> {
        let users = self.db.list_users_for_company(company_id).await?;
        Ok(users.iter().filter(|u| u.is_company_admin()).count())
    }

    async fn count_system_admins(&self) -> Result<usize> {
        let users = self.db.list_users().await?;
        Ok(users.iter().filter(|u| u.is_system_admin()).count())
    }
}
