// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT authentication middleware.

use crate::error::AppError;
use crate::models::User;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Session cookie carrying the identity provider's access token.
pub const SESSION_COOKIE: &str = "paceboard_token";

/// JWT claims as issued by the identity provider.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (identity provider user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: usize,
    /// Email at token issue time
    #[serde(default)]
    pub email: Option<String>,
}

/// Authenticated caller extracted from a validated JWT.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

/// Profile row loaded by the admin middlewares.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Middleware that requires valid JWT authentication.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Try cookie first, then header
    let token = if let Some(cookie) = jar.get(SESSION_COOKIE) {
        cookie.value().to_string()
    } else {
        let auth_header = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        match auth_header {
            Some(h) if h.starts_with("Bearer ") => h[7..].to_string(),
            _ => return Err(AppError::Unauthorized),
        }
    };

    let key = DecodingKey::from_secret(&state.config.identity_jwt_secret);
    let mut validation = Validation::new(Algorithm::HS256);
    // The provider sets an `aud` claim; we pin signature and expiry, not the
    // audience.
    validation.validate_aud = false;

    let token_data =
        decode::<Claims>(&token, &key, &validation).map_err(|_| AppError::InvalidToken)?;

    let auth_user = AuthUser {
        user_id: token_data.claims.sub,
    };
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Middleware that requires a company admin (or system admin) profile.
///
/// Loads the profile row and stashes it as a [`CurrentUser`] extension so
/// admin handlers skip the second read.
pub async fn require_company_admin(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or(AppError::Unauthorized)?;

    let user = load_current_user(&state, &auth.user_id).await?;
    if !user.is_company_admin() {
        return Err(AppError::Forbidden(
            "company admin role required".to_string(),
        ));
    }

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// Middleware that requires a system admin profile.
pub async fn require_system_admin(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or(AppError::Unauthorized)?;

    let user = load_current_user(&state, &auth.user_id).await?;
    if !user.is_system_admin() {
        return Err(AppError::Forbidden("system admin role required".to_string()));
    }

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// Resolve the profile row behind a validated token.
///
/// A token without a profile row means registration never completed; the
/// caller is treated as unauthenticated.
pub async fn load_current_user(state: &AppState, user_id: &str) -> Result<User, AppError> {
    state
        .db
        .get_user(user_id)
        .await?
        .ok_or(AppError::RegistrationIncomplete)
}
