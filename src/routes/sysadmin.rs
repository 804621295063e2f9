// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! System admin routes (cross-tenant).
//!
//! Gated by `require_system_admin` in routes/mod.rs.

use crate::error::Result;
use crate::middleware::auth::CurrentUser;
use crate::models::{Activity, UserRole};
use crate::routes::api::{ActivityPayload, ActivityResponse, CompanyResponse, UserResponse};
use crate::time_utils::{current_month_key, format_utc_rfc3339};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/sysadmin/companies",
            get(list_companies).post(create_company),
        )
        .route(
            "/api/sysadmin/companies/{id}/regenerate-code",
            post(regenerate_company_code),
        )
        .route("/api/sysadmin/users", get(list_all_users))
        .route("/api/sysadmin/users/{id}/role", put(change_any_role))
        .route("/api/sysadmin/activities", post(create_global_activity))
        .route("/api/sysadmin/stats", get(system_stats))
}

// ─── Companies ───────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CompaniesResponse {
    pub companies: Vec<CompanyResponse>,
}

/// List every company.
async fn list_companies(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(_admin)): Extension<CurrentUser>,
) -> Result<Json<CompaniesResponse>> {
    let companies = state.db.list_companies().await?;

    Ok(Json(CompaniesResponse {
        companies: companies.iter().map(CompanyResponse::from).collect(),
    }))
}

#[derive(Deserialize, Validate)]
pub struct CreateCompanyRequest {
    #[validate(length(min = 2, message = "must be at least 2 characters"))]
    pub company_name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub admin_email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub admin_password: String,
    #[validate(length(min = 2, message = "must be at least 2 characters"))]
    pub admin_full_name: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CreateCompanyResponse {
    pub company: CompanyResponse,
    pub admin: UserResponse,
}

/// Create a company together with its first admin account.
async fn create_company(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
    Json(payload): Json<CreateCompanyRequest>,
) -> Result<Json<CreateCompanyResponse>> {
    payload.validate()?;

    let (company, first_admin) = state
        .registration
        .create_company_with_admin(
            &payload.company_name,
            &payload.admin_email,
            &payload.admin_password,
            &payload.admin_full_name,
        )
        .await?;

    tracing::info!(
        actor_id = %admin.id,
        company_id = %company.id,
        "Company provisioned by system admin"
    );

    Ok(Json(CreateCompanyResponse {
        company: CompanyResponse::from(&company),
        admin: UserResponse::from(&first_admin),
    }))
}

/// Rotate a company's invite code.
async fn regenerate_company_code(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
    Path(company_id): Path<String>,
) -> Result<Json<CompanyResponse>> {
    let company = state.companies.regenerate_code(&company_id).await?;

    tracing::info!(actor_id = %admin.id, company_id = %company.id, "Invite code rotated");
    Ok(Json(CompanyResponse::from(&company)))
}

// ─── Users ───────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AllUsersResponse {
    pub users: Vec<UserResponse>,
}

/// List every user across companies.
async fn list_all_users(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(_admin)): Extension<CurrentUser>,
) -> Result<Json<AllUsersResponse>> {
    let mut users = state.db.list_users().await?;
    users.sort_by(|a, b| a.email.cmp(&b.email));

    Ok(Json(AllUsersResponse {
        users: users.iter().map(UserResponse::from).collect(),
    }))
}

#[derive(Deserialize)]
pub struct AnyRoleChangeRequest {
    pub role: UserRole,
}

/// Apply any role transition, guarded against removing the last admin.
async fn change_any_role(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
    Path(user_id): Path<String>,
    Json(payload): Json<AnyRoleChangeRequest>,
) -> Result<Json<UserResponse>> {
    let updated = state.roles.change_role(&admin, &user_id, payload.role).await?;

    Ok(Json(UserResponse::from(&updated)))
}

// ─── Global Activities ───────────────────────────────────────

/// Create a global activity template, offered to every company.
async fn create_global_activity(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
    Json(payload): Json<ActivityPayload>,
) -> Result<Json<ActivityResponse>> {
    payload.check()?;

    let activity = Activity {
        id: uuid::Uuid::new_v4().to_string(),
        name: payload.name.trim().to_string(),
        description: payload.description.trim().to_string(),
        unit: payload.unit.trim().to_string(),
        scoring_tiers: payload.scoring_tiers,
        company_id: None,
        is_active: true,
        created_at: format_utc_rfc3339(chrono::Utc::now()),
    };
    state.db.upsert_activity(&activity).await?;

    tracing::info!(
        actor_id = %admin.id,
        activity_id = %activity.id,
        "Global activity created"
    );
    Ok(Json(ActivityResponse::from(&activity)))
}

// ─── Stats ───────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SystemStatsResponse {
    pub year_month: String,
    pub companies: u32,
    pub users: u32,
    pub entries: u32,
    /// Competitions running in the current month
    pub active_competitions: u32,
}

/// System-wide counters for the operations view.
async fn system_stats(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(_admin)): Extension<CurrentUser>,
) -> Result<Json<SystemStatsResponse>> {
    let year_month = current_month_key();

    let companies = state.db.list_companies().await?.len() as u32;
    let users = state.db.list_users().await?.len() as u32;
    let entries = state.db.count_entries().await? as u32;
    let active_competitions = state
        .db
        .list_competitions_for_month(&year_month)
        .await?
        .len() as u32;

    Ok(Json(SystemStatsResponse {
        year_month,
        companies,
        users,
        entries,
        active_competitions,
    }))
}
