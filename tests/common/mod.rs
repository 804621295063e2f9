// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use paceboard::config::Config;
use paceboard::db::FirestoreDb;
use paceboard::routes::create_router;
use paceboard::services::{
    CompanyService, CompetitionService, EntryService, IdentityClient, LeaderboardService,
    RegistrationService, RoleService,
};
use paceboard::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = test_db_offline();

    let identity = IdentityClient::new(
        config.identity_base_url.clone(),
        config.identity_service_key.clone(),
    );
    let companies = CompanyService::new(db.clone());
    let registration = RegistrationService::new(db.clone(), identity.clone(), companies.clone());
    let competitions = CompetitionService::new(db.clone());
    let entries = EntryService::new(db.clone(), competitions.clone());
    let leaderboard = LeaderboardService::new(db.clone());
    let roles = RoleService::new(db.clone());

    let state = Arc::new(AppState {
        config,
        db,
        identity,
        companies,
        registration,
        competitions,
        entries,
        leaderboard,
        roles,
    });

    (create_router(state.clone()), state)
}

/// Create a test JWT accepted by the auth middleware.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8]) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use paceboard::middleware::auth::Claims;

    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp: now + 3600,
        iat: now,
        email: None,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )
    .unwrap()
}

/// Unique suffix for test isolation against a shared emulator.
#[allow(dead_code)]
pub fn unique_suffix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    format!(
        "{}",
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    )
}
