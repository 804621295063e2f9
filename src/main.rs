// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Paceboard API Server
//!
//! Multi-tenant backend for company activity competitions: members report
//! cumulative monthly activity values, tier tables award points, and a
//! monthly leaderboard ranks each company.

use paceboard::{
    config::Config,
    db::FirestoreDb,
    services::{
        CompanyService, CompetitionService, EntryService, IdentityClient, LeaderboardService,
        RegistrationService, RoleService,
    },
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Paceboard API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.firestore_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Identity provider client (sessions and account management)
    let identity = IdentityClient::new(
        config.identity_base_url.clone(),
        config.identity_service_key.clone(),
    );
    tracing::info!(base_url = %config.identity_base_url, "Identity client initialized");

    // Wire up the service layer
    let companies = CompanyService::new(db.clone());
    let registration = RegistrationService::new(db.clone(), identity.clone(), companies.clone());
    let competitions = CompetitionService::new(db.clone());
    let entries = EntryService::new(db.clone(), competitions.clone());
    let leaderboard = LeaderboardService::new(db.clone());
    let roles = RoleService::new(db.clone());

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        identity,
        companies,
        registration,
        competitions,
        entries,
        leaderboard,
        roles,
    });

    // Build router
    let app = paceboard::routes::create_router(state);

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Resolve on SIGTERM or ctrl-c so in-flight requests can finish.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("paceboard=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
