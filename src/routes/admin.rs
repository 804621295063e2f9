// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Company admin routes.
//!
//! Everything here is gated by `require_company_admin` in routes/mod.rs, so
//! handlers receive the loaded profile as a [`CurrentUser`] extension.

use crate::error::Result;
use crate::middleware::auth::CurrentUser;
use crate::models::UserRole;
use crate::routes::api::{require_company, CompetitionResponse, UserResponse};
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

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/users", get(list_members))
        .route("/api/admin/users/{id}/role", put(change_member_role))
        .route("/api/admin/competitions/next", post(start_next_competition))
        .route("/api/admin/stats", get(company_stats))
}

// ─── Members ─────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MembersResponse {
    pub users: Vec<UserResponse>,
}

/// List the members of the admin's company, sorted by name.
async fn list_members(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
) -> Result<Json<MembersResponse>> {
    let company_id = require_company(&admin)?;

    let mut users = state.db.list_users_for_company(company_id).await?;
    users.sort_by(|a, b| a.full_name.cmp(&b.full_name));

    Ok(Json(MembersResponse {
        users: users.iter().map(UserResponse::from).collect(),
    }))
}

#[derive(Deserialize)]
pub struct RoleChangeRequest {
    pub role: UserRole,
}

/// Promote or demote a member of the admin's own company.
async fn change_member_role(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
    Path(user_id): Path<String>,
    Json(payload): Json<RoleChangeRequest>,
) -> Result<Json<UserResponse>> {
    let updated = state
        .roles
        .change_company_role(&admin, &user_id, payload.role)
        .await?;

    Ok(Json(UserResponse::from(&updated)))
}

// ─── Competitions ────────────────────────────────────────────

/// Open next month's competition ahead of time.
async fn start_next_competition(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
) -> Result<Json<CompetitionResponse>> {
    let company_id = require_company(&admin)?;

    let competition = state.competitions.start_next_month(company_id).await?;

    tracing::info!(
        admin_id = %admin.id,
        competition_id = %competition.id,
        "Next month's competition opened"
    );
    Ok(Json(CompetitionResponse::from(&competition)))
}

// ─── Stats ───────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CompanyStatsResponse {
    pub year_month: String,
    pub member_count: u32,
    pub active_count: u32,
    /// Share of members with at least one entry this month, 0..=1
    pub participation_rate: f64,
    pub total_entries: u32,
    pub total_points: u32,
}

/// Participation stats for the current month.
async fn company_stats(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
) -> Result<Json<CompanyStatsResponse>> {
    let company_id = require_company(&admin)?;

    let competition = state.competitions.current(company_id).await?;
    let stats = state
        .leaderboard
        .company_stats(company_id, &competition.id)
        .await?;

    Ok(Json(CompanyStatsResponse {
        year_month: competition.year_month,
        member_count: stats.member_count as u32,
        active_count: stats.active_count as u32,
        participation_rate: stats.participation_rate,
        total_entries: stats.total_entries,
        total_points: stats.total_points,
    }))
}
