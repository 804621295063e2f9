// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Monthly competition resolution.
//!
//! Competitions are created lazily the first time anything touches a
//! `(company, month)` pair; nobody schedules them ahead of time.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::MonthlyCompetition;
use crate::time_utils::{current_month_key, format_utc_rfc3339, next_month_key, parse_month_key};

/// How many past competitions a company listing returns.
const COMPETITION_LIST_LIMIT: u32 = 12;

/// Competition resolver service.
#[derive(Clone)]
pub struct CompetitionService {
    db: FirestoreDb,
}

impl CompetitionService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Return the competition for a company and month, creating it on first
    /// access.
    ///
    /// The insert is create-only on the natural-key document ID, so when two
    /// callers race the loser's insert fails and it re-reads the winner's
    /// row. Exactly one competition exists per `(company, month)`.
    pub async fn get_or_create(
        &self,
        company_id: &str,
        year_month: &str,
    ) -> Result<MonthlyCompetition> {
        if parse_month_key(year_month).is_none() {
            return Err(AppError::BadRequest(format!(
                "Invalid month key: {}",
                year_month
            )));
        }

        let doc_id = MonthlyCompetition::document_id(company_id, year_month);

        if let Some(existing) = self.db.get_competition(&doc_id).await? {
            return Ok(existing);
        }

        let competition = MonthlyCompetition {
            id: doc_id.clone(),
            company_id: company_id.to_string(),
            year_month: year_month.to_string(),
            is_active: true,
            created_at: format_utc_rfc3339(chrono::Utc::now()),
        };

        match self.db.insert_competition(&competition).await {
            Ok(()) => {
                tracing::info!(company_id, year_month, "Competition created");
                Ok(competition)
            }
            Err(insert_err) => {
                // The insert only fails for an existing document when we lost
                // a create race; reuse the winner's row in that case.
                if let Some(existing) = self.db.get_competition(&doc_id).await? {
                    tracing::debug!(company_id, year_month, "Competition created concurrently");
                    return Ok(existing);
                }
                Err(insert_err)
            }
        }
    }

    /// Competition for the current calendar month.
    pub async fn current(&self, company_id: &str) -> Result<MonthlyCompetition> {
        self.get_or_create(company_id, &current_month_key()).await
    }

    /// Open next month's competition ahead of time (admin action).
    pub async fn start_next_month(&self, company_id: &str) -> Result<MonthlyCompetition> {
        let next = next_month_key(&current_month_key()).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("current month key failed to parse"))
        })?;
        self.get_or_create(company_id, &next).await
    }

    /// A company's competitions, newest month first.
    pub async fn list_for_company(&self, company_id: &str) -> Result<Vec<MonthlyCompetition>> {
        self.db
            .list_competitions_for_company(company_id, COMPETITION_LIST_LIMIT)
            .await
    }
}
