// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::{load_current_user, AuthUser};
use crate::models::{Activity, Company, MonthlyCompetition, ScoringTiers, User, UserEntry, UserRole};
use crate::services::LeaderboardRow;
use crate::time_utils::{current_month_key, format_utc_rfc3339};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/activities", get(list_activities).post(create_activity))
        .route(
            "/api/activities/{id}",
            put(update_activity).delete(delete_activity),
        )
        .route("/api/activities/{id}/copy", post(copy_activity))
        .route(
            "/api/entries",
            get(list_entries).post(register_entry).put(set_entry_total),
        )
        .route("/api/leaderboard", get(get_leaderboard))
        .route("/api/competitions", get(list_competitions))
}

// ─── Shared Response Shapes ──────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub company_id: Option<String>,
    pub user_role: UserRole,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            company_id: user.company_id.clone(),
            user_role: user.user_role,
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CompanyResponse {
    pub id: String,
    pub name: String,
    pub company_code: String,
    pub created_at: String,
}

impl From<&Company> for CompanyResponse {
    fn from(company: &Company) -> Self {
        Self {
            id: company.id.clone(),
            name: company.name.clone(),
            company_code: company.company_code.clone(),
            created_at: company.created_at.clone(),
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub unit: String,
    pub scoring_tiers: ScoringTiers,
    pub company_id: Option<String>,
    pub is_active: bool,
    pub created_at: String,
}

impl From<&Activity> for ActivityResponse {
    fn from(activity: &Activity) -> Self {
        Self {
            id: activity.id.clone(),
            name: activity.name.clone(),
            description: activity.description.clone(),
            unit: activity.unit.clone(),
            scoring_tiers: activity.scoring_tiers.clone(),
            company_id: activity.company_id.clone(),
            is_active: activity.is_active,
            created_at: activity.created_at.clone(),
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct EntryResponse {
    pub id: String,
    pub activity_id: String,
    pub competition_id: String,
    pub value: f64,
    pub points: u32,
    pub updated_at: String,
}

impl From<&UserEntry> for EntryResponse {
    fn from(entry: &UserEntry) -> Self {
        Self {
            id: entry.id.clone(),
            activity_id: entry.activity_id.clone(),
            competition_id: entry.competition_id.clone(),
            value: entry.value,
            points: entry.points,
            updated_at: entry.updated_at.clone(),
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CompetitionResponse {
    pub id: String,
    pub year_month: String,
    pub is_active: bool,
    pub created_at: String,
}

impl From<&MonthlyCompetition> for CompetitionResponse {
    fn from(competition: &MonthlyCompetition) -> Self {
        Self {
            id: competition.id.clone(),
            year_month: competition.year_month.clone(),
            is_active: competition.is_active,
            created_at: competition.created_at.clone(),
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MessageResponse {
    pub message: String,
}

/// Company id of the caller; accounts without one (system admins created out
/// of band) cannot use the member-facing endpoints.
pub(crate) fn require_company(user: &User) -> Result<&str> {
    user.company_id
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("no company attached to this account".to_string()))
}

// ─── User Profile ────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MeResponse {
    pub user: UserResponse,
    pub company: Option<CompanyResponse>,
}

/// Get current user profile with their company.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<MeResponse>> {
    let user = load_current_user(&state, &auth.user_id).await?;

    let company = match &user.company_id {
        Some(company_id) => state.db.get_company(company_id).await?,
        None => None,
    };

    Ok(Json(MeResponse {
        user: UserResponse::from(&user),
        company: company.as_ref().map(CompanyResponse::from),
    }))
}

// ─── Activities ──────────────────────────────────────────────

#[derive(Deserialize)]
struct ActivitiesQuery {
    /// Include retired definitions (admin screens)
    #[serde(default)]
    include_retired: bool,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivitiesResponse {
    pub activities: Vec<ActivityResponse>,
}

/// Activity payload shared by create and update.
#[derive(Clone, Deserialize, Validate)]
pub struct ActivityPayload {
    #[validate(length(min = 2, message = "must be at least 2 characters"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub unit: String,
    pub scoring_tiers: ScoringTiers,
}

impl ActivityPayload {
    pub(crate) fn check(&self) -> Result<()> {
        self.validate()?;
        self.scoring_tiers
            .validate()
            .map_err(|msg| AppError::validation("scoring_tiers", msg))
    }
}

/// List the activities visible to the caller's company: global templates
/// plus the company's own definitions.
async fn list_activities(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<ActivitiesQuery>,
) -> Result<Json<ActivitiesResponse>> {
    let user = load_current_user(&state, &auth.user_id).await?;

    tracing::debug!(
        user_id = %user.id,
        include_retired = params.include_retired,
        "Fetching activity catalog"
    );

    let all = state.db.list_activities().await?;
    let activities = all
        .iter()
        .filter(|a| visible_to_company(a, user.company_id.as_deref()))
        .filter(|a| params.include_retired || a.is_active)
        .map(ActivityResponse::from)
        .collect();

    Ok(Json(ActivitiesResponse { activities }))
}

/// Create an activity for the caller's company (company admin).
async fn create_activity(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<ActivityPayload>,
) -> Result<Json<ActivityResponse>> {
    payload.check()?;

    let user = load_current_user(&state, &auth.user_id).await?;
    if !user.is_company_admin() {
        return Err(AppError::Forbidden(
            "company admin role required".to_string(),
        ));
    }
    let company_id = require_company(&user)?;

    let activity = Activity {
        id: uuid::Uuid::new_v4().to_string(),
        name: payload.name.trim().to_string(),
        description: payload.description.trim().to_string(),
        unit: payload.unit.trim().to_string(),
        scoring_tiers: payload.scoring_tiers,
        company_id: Some(company_id.to_string()),
        is_active: true,
        created_at: format_utc_rfc3339(chrono::Utc::now()),
    };
    state.db.upsert_activity(&activity).await?;

    tracing::info!(activity_id = %activity.id, company_id, "Activity created");
    Ok(Json(ActivityResponse::from(&activity)))
}

/// Update an activity definition. Future scores use the new tiers; stored
/// entries keep the points they were given.
async fn update_activity(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(activity_id): Path<String>,
    Json(payload): Json<ActivityPayload>,
) -> Result<Json<ActivityResponse>> {
    payload.check()?;

    let user = load_current_user(&state, &auth.user_id).await?;
    let mut activity = require_activity(&state, &activity_id).await?;

    if !user.can_modify_activity(&activity) {
        return Err(AppError::Forbidden(
            "not allowed to modify this activity".to_string(),
        ));
    }

    activity.name = payload.name.trim().to_string();
    activity.description = payload.description.trim().to_string();
    activity.unit = payload.unit.trim().to_string();
    activity.scoring_tiers = payload.scoring_tiers;
    state.db.upsert_activity(&activity).await?;

    tracing::info!(activity_id = %activity.id, user_id = %user.id, "Activity updated");
    Ok(Json(ActivityResponse::from(&activity)))
}

/// Retire an activity (soft delete). Entries that reference it survive;
/// the definition just stops being offered.
async fn delete_activity(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(activity_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let user = load_current_user(&state, &auth.user_id).await?;
    let mut activity = require_activity(&state, &activity_id).await?;

    if !user.can_modify_activity(&activity) {
        return Err(AppError::Forbidden(
            "not allowed to modify this activity".to_string(),
        ));
    }

    if activity.is_active {
        activity.is_active = false;
        state.db.upsert_activity(&activity).await?;
        tracing::info!(activity_id = %activity.id, user_id = %user.id, "Activity retired");
    }

    Ok(Json(MessageResponse {
        message: "activity retired".to_string(),
    }))
}

/// Copy a global template into the caller's company so it can be customized
/// (company admin).
async fn copy_activity(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(activity_id): Path<String>,
) -> Result<Json<ActivityResponse>> {
    let user = load_current_user(&state, &auth.user_id).await?;
    if !user.is_company_admin() {
        return Err(AppError::Forbidden(
            "company admin role required".to_string(),
        ));
    }
    let company_id = require_company(&user)?;

    let source = require_activity(&state, &activity_id).await?;
    if source.company_id.is_some() {
        return Err(AppError::BadRequest(
            "only global activities can be copied".to_string(),
        ));
    }
    if !source.is_active {
        return Err(AppError::BadRequest(
            "retired activities cannot be copied".to_string(),
        ));
    }

    let copy = Activity {
        id: uuid::Uuid::new_v4().to_string(),
        company_id: Some(company_id.to_string()),
        created_at: format_utc_rfc3339(chrono::Utc::now()),
        ..source
    };
    state.db.upsert_activity(&copy).await?;

    tracing::info!(
        source_id = %activity_id,
        activity_id = %copy.id,
        company_id,
        "Global activity copied"
    );
    Ok(Json(ActivityResponse::from(&copy)))
}

// ─── Entries ─────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct RegisterEntryRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub activity_id: String,
    pub amount: f64,
}

#[derive(Deserialize, Validate)]
pub struct SetEntryTotalRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub activity_id: String,
    pub total: f64,
}

#[derive(Deserialize)]
struct MonthQuery {
    /// Month key like `2025-08`; defaults to the current month
    #[serde(default)]
    month: Option<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct EntriesResponse {
    pub year_month: String,
    pub entries: Vec<EntryResponse>,
}

/// Add an amount to the caller's monthly total for an activity.
async fn register_entry(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<RegisterEntryRequest>,
) -> Result<Json<EntryResponse>> {
    payload.validate()?;

    let user = load_current_user(&state, &auth.user_id).await?;
    let company_id = require_company(&user)?;

    let entry = state
        .entries
        .register(&user.id, company_id, &payload.activity_id, payload.amount)
        .await?;

    Ok(Json(EntryResponse::from(&entry)))
}

/// Overwrite the caller's monthly total for an activity (corrections).
async fn set_entry_total(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<SetEntryTotalRequest>,
) -> Result<Json<EntryResponse>> {
    payload.validate()?;

    let user = load_current_user(&state, &auth.user_id).await?;
    let company_id = require_company(&user)?;

    let entry = state
        .entries
        .set_total(&user.id, company_id, &payload.activity_id, payload.total)
        .await?;

    Ok(Json(EntryResponse::from(&entry)))
}

/// The caller's entries for one month (current month by default).
async fn list_entries(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<MonthQuery>,
) -> Result<Json<EntriesResponse>> {
    let user = load_current_user(&state, &auth.user_id).await?;
    let company_id = require_company(&user)?;
    let year_month = params.month.unwrap_or_else(current_month_key);

    tracing::debug!(user_id = %user.id, year_month = %year_month, "Fetching entries");

    let entries = state
        .entries
        .list_for_month(&user.id, company_id, &year_month)
        .await?;

    Ok(Json(EntriesResponse {
        year_month,
        entries: entries.iter().map(EntryResponse::from).collect(),
    }))
}

// ─── Leaderboard ─────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LeaderboardRowResponse {
    pub user_id: String,
    pub full_name: String,
    pub total_points: u32,
    pub entries_count: u32,
    pub rank: u32,
}

impl From<&LeaderboardRow> for LeaderboardRowResponse {
    fn from(row: &LeaderboardRow) -> Self {
        Self {
            user_id: row.user_id.clone(),
            full_name: row.full_name.clone(),
            total_points: row.total_points,
            entries_count: row.entries_count,
            rank: row.rank,
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LeaderboardResponse {
    pub competition_id: String,
    pub year_month: String,
    pub rows: Vec<LeaderboardRowResponse>,
}

/// The company leaderboard for one month (current month by default).
async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<MonthQuery>,
) -> Result<Json<LeaderboardResponse>> {
    let user = load_current_user(&state, &auth.user_id).await?;
    let company_id = require_company(&user)?;
    let year_month = params.month.unwrap_or_else(current_month_key);

    tracing::debug!(
        user_id = %user.id,
        company_id,
        year_month = %year_month,
        "Fetching leaderboard"
    );

    let competition = state.competitions.get_or_create(company_id, &year_month).await?;
    let rows = state.leaderboard.for_competition(&competition.id).await?;

    Ok(Json(LeaderboardResponse {
        competition_id: competition.id,
        year_month: competition.year_month,
        rows: rows.iter().map(LeaderboardRowResponse::from).collect(),
    }))
}

// ─── Competitions ────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CompetitionsResponse {
    pub competitions: Vec<CompetitionResponse>,
}

/// The company's competitions, newest month first.
async fn list_competitions(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<CompetitionsResponse>> {
    let user = load_current_user(&state, &auth.user_id).await?;
    let company_id = require_company(&user)?;

    let competitions = state.competitions.list_for_company(company_id).await?;

    Ok(Json(CompetitionsResponse {
        competitions: competitions.iter().map(CompetitionResponse::from).collect(),
    }))
}

// ─── Helpers ─────────────────────────────────────────────────

async fn require_activity(state: &AppState, activity_id: &str) -> Result<Activity> {
    state
        .db
        .get_activity(activity_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Activity {} not found", activity_id)))
}

/// Whether an activity shows up in a company's catalog.
fn visible_to_company(activity: &Activity, company_id: Option<&str>) -> bool {
    match (&activity.company_id, company_id) {
        (None, _) => true,
        (Some(owner), Some(own)) => owner == own,
        (Some(_), None) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Tier;

    fn make_activity(company_id: Option<&str>) -> Activity {
        Activity {
            id: "act-1".to_string(),
            name: "Walking".to_string(),
            description: String::new(),
            unit: "steps".to_string(),
            scoring_tiers: ScoringTiers {
                tiers: vec![Tier {
                    min: 0.0,
                    max: None,
                    points: 1,
                }],
            },
            company_id: company_id.map(|s| s.to_string()),
            is_active: true,
            created_at: "2025-08-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_global_activities_are_visible_everywhere() {
        let global = make_activity(None);
        assert!(visible_to_company(&global, Some("co-1")));
        assert!(visible_to_company(&global, None));
    }

    #[test]
    fn test_company_activities_are_visible_only_at_home() {
        let scoped = make_activity(Some("co-1"));
        assert!(visible_to_company(&scoped, Some("co-1")));
        assert!(!visible_to_company(&scoped, Some("co-2")));
        assert!(!visible_to_company(&scoped, None));
    }

    #[test]
    fn test_activity_payload_rejects_bad_tiers() {
        let payload = ActivityPayload {
            name: "Walking".to_string(),
            description: String::new(),
            unit: "steps".to_string(),
            scoring_tiers: ScoringTiers { tiers: vec![] },
        };
        assert!(payload.check().is_err());
    }

    #[test]
    fn test_activity_payload_accepts_valid_tiers() {
        let payload = ActivityPayload {
            name: "Walking".to_string(),
            description: "Daily steps".to_string(),
            unit: "steps".to_string(),
            scoring_tiers: ScoringTiers {
                tiers: vec![
                    Tier {
                        min: 0.0,
                        max: Some(50.0),
                        points: 1,
                    },
                    Tier {
                        min: 50.0,
                        max: None,
                        points: 2,
                    },
                ],
            },
        };
        assert!(payload.check().is_ok());
    }
}
