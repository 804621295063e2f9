// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Entry registration: tier scoring plus idempotent natural-key writes.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{Activity, UserEntry};
use crate::services::CompetitionService;
use crate::time_utils::format_utc_rfc3339;

/// Entry registration service.
#[derive(Clone)]
pub struct EntryService {
    db: FirestoreDb,
    competitions: CompetitionService,
}

impl EntryService {
    pub fn new(db: FirestoreDb, competitions: CompetitionService) -> Self {
        Self { db, competitions }
    }

    /// Add an amount to the user's running total for the current month.
    ///
    /// The stored value is always the cumulative monthly total; this reads
    /// the current total, adds the delta, and writes back. Two concurrent
    /// additions to the same entry are last-writer-wins.
    pub async fn register(
        &self,
        user_id: &str,
        company_id: &str,
        activity_id: &str,
        amount: f64,
    ) -> Result<UserEntry> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(AppError::validation(
                "amount",
                "must be a non-negative number",
            ));
        }

        let activity = self.require_activity(activity_id).await?;
        check_registrable(&activity, company_id)?;

        let competition = self.competitions.current(company_id).await?;
        let doc_id = UserEntry::document_id(user_id, activity_id, &competition.id);
        let current_total = self
            .db
            .get_entry(&doc_id)
            .await?
            .map(|entry| entry.value)
            .unwrap_or(0.0);

        self.write_total(&activity, user_id, &competition.id, current_total + amount)
            .await
    }

    /// Overwrite the user's running total for the current month.
    pub async fn set_total(
        &self,
        user_id: &str,
        company_id: &str,
        activity_id: &str,
        total: f64,
    ) -> Result<UserEntry> {
        if !total.is_finite() || total < 0.0 {
            return Err(AppError::validation(
                "total",
                "must be a non-negative number",
            ));
        }

        let activity = self.require_activity(activity_id).await?;
        check_registrable(&activity, company_id)?;

        let competition = self.competitions.current(company_id).await?;
        self.write_total(&activity, user_id, &competition.id, total)
            .await
    }

    /// Write the entry for a natural key, recomputing points from the
    /// activity's tiers.
    ///
    /// Fails closed when the activity is missing: no write happens. The
    /// natural-key document ID guarantees repeated calls update one row
    /// instead of inserting duplicates.
    pub async fn upsert(
        &self,
        user_id: &str,
        activity_id: &str,
        competition_id: &str,
        total_value: f64,
    ) -> Result<UserEntry> {
        let activity = self.require_activity(activity_id).await?;
        self.write_total(&activity, user_id, competition_id, total_value)
            .await
    }

    /// The user's entries for one month of their company's competition.
    pub async fn list_for_month(
        &self,
        user_id: &str,
        company_id: &str,
        year_month: &str,
    ) -> Result<Vec<UserEntry>> {
        let competition = self
            .competitions
            .get_or_create(company_id, year_month)
            .await?;
        self.db
            .list_entries_for_user(user_id, &competition.id)
            .await
    }

    async fn require_activity(&self, activity_id: &str) -> Result<Activity> {
        self.db
            .get_activity(activity_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Activity {} not found", activity_id)))
    }

    async fn write_total(
        &self,
        activity: &Activity,
        user_id: &str,
        competition_id: &str,
        total_value: f64,
    ) -> Result<UserEntry> {
        let points = activity.scoring_tiers.compute_points(total_value);
        let now = format_utc_rfc3339(chrono::Utc::now());
        let doc_id = UserEntry::document_id(user_id, &activity.id, competition_id);

        let entry = match self.db.get_entry(&doc_id).await? {
            Some(existing) => UserEntry {
                value: total_value,
                points,
                updated_at: now,
                ..existing
            },
            None => UserEntry {
                id: doc_id,
                user_id: user_id.to_string(),
                activity_id: activity.id.clone(),
                competition_id: competition_id.to_string(),
                value: total_value,
                points,
                created_at: now.clone(),
                updated_at: now,
            },
        };

        self.db.upsert_entry(&entry).await?;

        tracing::debug!(
            user_id,
            activity_id = %activity.id,
            competition_id,
            value = entry.value,
            points = entry.points,
            "Entry written"
        );

        Ok(entry)
    }
}

/// Whether a company's members may register against this activity.
fn check_registrable(activity: &Activity, company_id: &str) -> Result<()> {
    if !activity.is_active {
        return Err(AppError::BadRequest(format!(
            "Activity {} is retired",
            activity.id
        )));
    }
    match &activity.company_id {
        None => Ok(()),
        Some(owner) if owner == company_id => Ok(()),
        Some(_) => Err(AppError::Forbidden(
            "activity belongs to another company".to_string(),
        )),
    }
}
