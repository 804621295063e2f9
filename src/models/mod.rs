// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod company;
pub mod competition;
pub mod entry;
pub mod leaderboard;
pub mod user;

pub use activity::{Activity, ScoringTiers, Tier};
pub use company::Company;
pub use competition::MonthlyCompetition;
pub use entry::UserEntry;
pub use leaderboard::RankedTotal;
pub use user::{User, UserRole};
