// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Leaderboard assembly and participation stats.

use crate::db::FirestoreDb;
use crate::error::Result;
use crate::models::leaderboard::{rank_entries, RankedTotal};

/// One leaderboard row with the display name joined in.
#[derive(Debug, Clone)]
pub struct LeaderboardRow {
    pub user_id: String,
    pub full_name: String,
    pub total_points: u32,
    pub entries_count: u32,
    pub rank: u32,
}

/// Participation summary for one company's competition.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyStats {
    pub member_count: usize,
    pub active_count: usize,
    pub participation_rate: f64,
    pub total_entries: u32,
    pub total_points: u32,
}

/// Leaderboard service.
#[derive(Clone)]
pub struct LeaderboardService {
    db: FirestoreDb,
}

impl LeaderboardService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Full leaderboard for a competition: aggregate the entries, then join
    /// display names in one batched read.
    pub async fn for_competition(&self, competition_id: &str) -> Result<Vec<LeaderboardRow>> {
        let entries = self.db.list_entries_for_competition(competition_id).await?;
        let ranked = rank_entries(&entries);

        let user_ids: Vec<String> = ranked.iter().map(|r| r.user_id.clone()).collect();
        let users = self.db.get_users_by_ids(&user_ids).await?;

        let rows = ranked
            .into_iter()
            .map(|row| {
                // Profiles can lag behind entries (deleted accounts); keep
                // the row rather than dropping their points.
                let full_name = users
                    .get(&row.user_id)
                    .map(|user| user.full_name.clone())
                    .unwrap_or_else(|| "Unknown user".to_string());
                LeaderboardRow {
                    user_id: row.user_id,
                    full_name,
                    total_points: row.total_points,
                    entries_count: row.entries_count,
                    rank: row.rank,
                }
            })
            .collect();

        tracing::debug!(competition_id, "Leaderboard assembled");
        Ok(rows)
    }

    /// Participation stats for one company's competition.
    pub async fn company_stats(
        &self,
        company_id: &str,
        competition_id: &str,
    ) -> Result<CompanyStats> {
        let members = self.db.list_users_for_company(company_id).await?;
        let entries = self.db.list_entries_for_competition(competition_id).await?;
        let ranked = rank_entries(&entries);

        Ok(build_company_stats(members.len(), &ranked))
    }
}

/// Derive participation numbers from ranked totals.
fn build_company_stats(member_count: usize, ranked: &[RankedTotal]) -> CompanyStats {
    let active_count = ranked.len();
    let participation_rate = if member_count == 0 {
        0.0
    } else {
        active_count as f64 / member_count as f64
    };

    CompanyStats {
        member_count,
        active_count,
        participation_rate,
        total_entries: ranked.iter().map(|r| r.entries_count).sum(),
        total_points: ranked.iter().map(|r| r.total_points).sum(),
    }
}
