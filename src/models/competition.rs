// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Monthly competition model.

use serde::{Deserialize, Serialize};

/// A company's competition for one calendar month.
///
/// The document ID is `{company_id}_{year_month}`, so at most one competition
/// can ever exist per company and month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyCompetition {
    /// Natural-key document ID
    pub id: String,
    /// Owning company
    pub company_id: String,
    /// Month key in `YYYY-MM` form
    pub year_month: String,
    /// Competitions are never closed; the flag exists for parity with
    /// historical data
    pub is_active: bool,
    /// When the competition row was created (RFC3339)
    pub created_at: String,
}

impl MonthlyCompetition {
    /// Natural-key document ID for a company and month.
    pub fn document_id(company_id: &str, year_month: &str) -> String {
        format!("{}_{}", company_id, year_month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_combines_company_and_month() {
        assert_eq!(
            MonthlyCompetition::document_id("acme", "2025-08"),
            "acme_2025-08"
        );
    }
}
