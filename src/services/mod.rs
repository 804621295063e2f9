// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod companies;
pub mod competitions;
pub mod entries;
pub mod identity;
pub mod leaderboard;
pub mod registration;
pub mod roles;

pub use companies::CompanyService;
pub use competitions::CompetitionService;
pub use entries::EntryService;
pub use identity::{IdentityClient, IdentitySession, IdentityUser};
pub use leaderboard::{CompanyStats, LeaderboardRow, LeaderboardService};
pub use registration::{RegistrationService, SignupOutcome};
pub use roles::RoleService;
