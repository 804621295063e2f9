// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Paceboard: company activity competitions with tiered scoring
//!
//! This crate provides the backend API for companies running monthly
//! competitions: members report cumulative activity values, tier tables
//! turn the values into points, and a leaderboard ranks each company.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{
    CompanyService, CompetitionService, EntryService, IdentityClient, LeaderboardService,
    RegistrationService, RoleService,
};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub identity: IdentityClient,
    pub companies: CompanyService,
    pub registration: RegistrationService,
    pub competitions: CompetitionService,
    pub entries: EntryService,
    pub leaderboard: LeaderboardService,
    pub roles: RoleService,
}
