// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Signup orchestration: identity account, profile row and tenancy.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{Company, User, UserRole};
use crate::services::{CompanyService, IdentityClient};
use crate::time_utils::format_utc_rfc3339;

/// Outcome of a completed signup.
#[derive(Debug, Clone)]
pub struct SignupOutcome {
    pub user: User,
    pub company: Company,
    /// Session token when the provider issued one right away
    pub access_token: Option<String>,
}

/// Registration orchestration service.
#[derive(Clone)]
pub struct RegistrationService {
    db: FirestoreDb,
    identity: IdentityClient,
    companies: CompanyService,
}

impl RegistrationService {
    pub fn new(db: FirestoreDb, identity: IdentityClient, companies: CompanyService) -> Self {
        Self {
            db,
            identity,
            companies,
        }
    }

    /// Join an existing company by invite code.
    pub async fn sign_up_with_code(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
        company_code: &str,
    ) -> Result<SignupOutcome> {
        // Resolve the company first so a bad code never creates an orphan
        // identity account.
        let company = self.companies.find_by_code(company_code).await?;

        let (identity_user, access_token) = self.identity.sign_up(email, password).await?;
        let user = self
            .create_profile(
                &identity_user.id,
                email,
                full_name,
                &company.id,
                UserRole::User,
            )
            .await?;

        tracing::info!(user_id = %user.id, company_id = %company.id, "User joined company");
        Ok(SignupOutcome {
            user,
            company,
            access_token,
        })
    }

    /// Found a new company and become its first admin.
    pub async fn sign_up_with_company(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
        company_name: &str,
    ) -> Result<SignupOutcome> {
        let (identity_user, access_token) = self.identity.sign_up(email, password).await?;
        let company = self.companies.create_company(company_name).await?;
        let user = self
            .create_profile(
                &identity_user.id,
                email,
                full_name,
                &company.id,
                UserRole::CompanyAdmin,
            )
            .await?;

        tracing::info!(user_id = %user.id, company_id = %company.id, "Company founded");
        Ok(SignupOutcome {
            user,
            company,
            access_token,
        })
    }

    /// System admin flow: create a company together with its first admin
    /// account, pre-confirmed via the provider's admin API.
    pub async fn create_company_with_admin(
        &self,
        company_name: &str,
        admin_email: &str,
        admin_password: &str,
        admin_full_name: &str,
    ) -> Result<(Company, User)> {
        let identity_user = self
            .identity
            .admin_create_user(admin_email, admin_password)
            .await?;
        let company = self.companies.create_company(company_name).await?;
        let user = self
            .create_profile(
                &identity_user.id,
                admin_email,
                admin_full_name,
                &company.id,
                UserRole::CompanyAdmin,
            )
            .await?;

        tracing::info!(
            user_id = %user.id,
            company_id = %company.id,
            "Company created with first admin"
        );
        Ok((company, user))
    }

    async fn create_profile(
        &self,
        user_id: &str,
        email: &str,
        full_name: &str,
        company_id: &str,
        role: UserRole,
    ) -> Result<User> {
        if self.db.get_user(user_id).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Profile for user {} already exists",
                user_id
            )));
        }

        let user = User {
            id: user_id.to_string(),
            email: email.to_string(),
            full_name: full_name.trim().to_string(),
            company_id: Some(company_id.to_string()),
            user_role: role,
            created_at: format_utc_rfc3339(chrono::Utc::now()),
        };
        self.db.insert_user(&user).await?;
        Ok(user)
    }
}
