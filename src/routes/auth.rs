// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Password authentication routes backed by the identity provider.

use axum::{extract::State, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::SESSION_COOKIE;
use crate::routes::api::{CompanyResponse, MessageResponse, UserResponse};
use crate::AppState;

/// Session lifetime when the provider doesn't send one.
const DEFAULT_SESSION_SECS: u64 = 3600;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/reset-password", post(reset_password))
}

/// Signup payload. Exactly one of `company_code` (join an existing company)
/// or `company_name` (found a new one) must be present.
#[derive(Clone, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 2, message = "must be at least 2 characters"))]
    pub full_name: String,
    #[serde(default)]
    pub company_code: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub password: String,
}

#[derive(Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SignupResponse {
    pub user: UserResponse,
    pub company: CompanyResponse,
    /// True when the provider issued a session right away and the cookie is
    /// already set; false means the user must confirm their email first.
    pub signed_in: bool,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub company: Option<CompanyResponse>,
}

/// Register a new account, joining or founding a company.
async fn signup(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(payload): Json<SignupRequest>,
) -> Result<(CookieJar, Json<SignupResponse>)> {
    payload.validate()?;

    // Blank strings from the frontend count as absent
    let company_code = normalize_option(payload.company_code.as_deref());
    let company_name = normalize_option(payload.company_name.as_deref());

    let outcome = match (company_code, company_name) {
        (Some(code), None) => {
            state
                .registration
                .sign_up_with_code(&payload.email, &payload.password, &payload.full_name, code)
                .await?
        }
        (None, Some(name)) => {
            state
                .registration
                .sign_up_with_company(&payload.email, &payload.password, &payload.full_name, name)
                .await?
        }
        _ => {
            return Err(AppError::validation(
                "company_code",
                "provide exactly one of company_code or company_name",
            ))
        }
    };

    let signed_in = outcome.access_token.is_some();
    let jar = match &outcome.access_token {
        Some(token) => jar.add(session_cookie(
            token,
            DEFAULT_SESSION_SECS,
            &state.config.frontend_url,
        )),
        None => jar,
    };

    Ok((
        jar,
        Json(SignupResponse {
            user: UserResponse::from(&outcome.user),
            company: CompanyResponse::from(&outcome.company),
            signed_in,
        }),
    ))
}

/// Sign in and set the session cookie.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    payload.validate()?;

    let session = state
        .identity
        .sign_in(&payload.email, &payload.password)
        .await?;

    let user = state.db.get_user(&session.user.id).await?.ok_or_else(|| {
        tracing::warn!(user_id = %session.user.id, "Login without a profile row");
        AppError::RegistrationIncomplete
    })?;

    let company = match &user.company_id {
        Some(company_id) => state.db.get_company(company_id).await?,
        None => None,
    };

    let jar = jar.add(session_cookie(
        &session.access_token,
        session.expires_in.unwrap_or(DEFAULT_SESSION_SECS),
        &state.config.frontend_url,
    ));

    tracing::info!(user_id = %user.id, "User signed in");

    Ok((
        jar,
        Json(LoginResponse {
            user: UserResponse::from(&user),
            company: company.as_ref().map(CompanyResponse::from),
        }),
    ))
}

/// Sign out: revoke the remote session if possible, clear the cookie always.
async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>)> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        // Remote revocation is best-effort; the local session ends either way
        if let Err(e) = state.identity.sign_out(cookie.value()).await {
            tracing::warn!(error = %e, "Identity sign-out failed");
        }
    }

    let mut removal = Cookie::from(SESSION_COOKIE);
    removal.set_path("/");
    let jar = jar.remove(removal);

    Ok((
        jar,
        Json(MessageResponse {
            message: "signed out".to_string(),
        }),
    ))
}

/// Request a password recovery mail.
///
/// Responds 200 whether or not the address has an account, so the endpoint
/// can't be used to enumerate users.
async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>> {
    payload.validate()?;

    if let Err(e) = state.identity.reset_password(&payload.email).await {
        tracing::warn!(error = %e, "Password recovery request failed");
    }

    Ok(Json(MessageResponse {
        message: "If the address has an account, a recovery mail is on its way".to_string(),
    }))
}

/// Build the session cookie around an access token.
fn session_cookie(token: &str, expires_in: u64, frontend_url: &str) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token.to_string());
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(wants_secure_cookies(frontend_url));
    cookie.set_max_age(time::Duration::seconds(expires_in as i64));
    cookie
}

/// Cookies are marked Secure only when the frontend is served over https
/// (local dev runs plain http).
fn wants_secure_cookies(frontend_url: &str) -> bool {
    frontend_url.starts_with("https://")
}

fn normalize_option(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
