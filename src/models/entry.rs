// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User entry model: one cumulative value per user, activity and competition.

use serde::{Deserialize, Serialize};

/// A user's cumulative reported value for one activity within one competition.
///
/// The document ID is `{user_id}_{activity_id}_{competition_id}`: the natural
/// key is structural, so repeated writes can only ever touch one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEntry {
    /// Natural-key document ID
    pub id: String,
    pub user_id: String,
    pub activity_id: String,
    pub competition_id: String,
    /// Cumulative monthly total (not a delta)
    pub value: f64,
    /// Derived from the activity's tiers at the time of the last write
    pub points: u32,
    /// When the entry was first created (RFC3339)
    pub created_at: String,
    /// When the entry was last written (RFC3339)
    pub updated_at: String,
}

impl UserEntry {
    /// Natural-key document ID for a user, activity and competition.
    pub fn document_id(user_id: &str, activity_id: &str, competition_id: &str) -> String {
        format!("{}_{}_{}", user_id, activity_id, competition_id)
    }
}
