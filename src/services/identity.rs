// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity provider client (GoTrue-compatible REST API).
//!
//! Handles:
//! - Account creation (self-signup and service-key admin creation)
//! - Password-grant sign-in
//! - Best-effort sign-out
//! - Password recovery mail

use crate::error::AppError;
use serde::Deserialize;

/// Identity provider API client.
#[derive(Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    base_url: String,
    service_key: Option<String>,
}

impl IdentityClient {
    /// Create a client against the provider's base URL (no trailing slash).
    pub fn new(base_url: String, service_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            service_key,
        }
    }

    /// Register a new account.
    ///
    /// Returns the created identity user plus an access token when the
    /// provider issues a session right away (email confirmation disabled).
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(IdentityUser, Option<String>), AppError> {
        let url = format!("{}/signup", self.base_url);
        let body = serde_json::json!({ "email": email, "password": password });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Identity(e.to_string()))?;

        let status = response.status().as_u16();
        if status == 400 || status == 422 {
            let text = response.text().await.unwrap_or_default();
            if text.contains("already registered") || text.contains("already been registered") {
                return Err(AppError::validation(
                    "email",
                    "an account with this email already exists",
                ));
            }
            return Err(AppError::Identity(format!("signup rejected: {}", text)));
        }

        let payload: SignUpResponse = self.check_response_json(response).await?;
        payload.into_parts()
    }

    /// Sign in with the password grant.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<IdentitySession, AppError> {
        let url = format!("{}/token?grant_type=password", self.base_url);
        let body = serde_json::json!({ "email": email, "password": password });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Identity(e.to_string()))?;

        // Wrong credentials come back as 400 from the provider
        let status = response.status().as_u16();
        if status == 400 || status == 401 {
            return Err(AppError::Unauthorized);
        }

        self.check_response_json(response).await
    }

    /// Revoke the session behind an access token.
    ///
    /// Callers treat a failure here as non-fatal and clear the local session
    /// regardless; this is the one tolerated failure in the system.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), AppError> {
        let url = format!("{}/logout", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Identity(e.to_string()))?;

        self.check_response(response).await
    }

    /// Trigger a password recovery mail.
    pub async fn reset_password(&self, email: &str) -> Result<(), AppError> {
        let url = format!("{}/recover", self.base_url);
        let body = serde_json::json!({ "email": email });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Identity(e.to_string()))?;

        self.check_response(response).await
    }

    /// Create a pre-confirmed account with the service-role key (used when a
    /// system admin founds a company together with its first admin).
    pub async fn admin_create_user(
        &self,
        email: &str,
        password: &str,
    ) -> Result<IdentityUser, AppError> {
        let service_key = self.service_key.as_deref().ok_or_else(|| {
            AppError::Identity("admin user creation requires IDENTITY_SERVICE_KEY".to_string())
        })?;

        let url = format!("{}/admin/users", self.base_url);
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "email_confirm": true,
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(service_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Identity(e.to_string()))?;

        if response.status().as_u16() == 422 {
            let text = response.text().await.unwrap_or_default();
            if text.contains("already registered") || text.contains("already been registered") {
                return Err(AppError::validation(
                    "email",
                    "an account with this email already exists",
                ));
            }
            return Err(AppError::Identity(format!("user creation rejected: {}", text)));
        }

        self.check_response_json(response).await
    }

    /// Check response status and return error if not successful.
    async fn check_response(&self, response: reqwest::Response) -> Result<(), AppError> {
        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Identity(format!("HTTP {}: {}", status, body)))
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Identity(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Identity(format!("JSON parse error: {}", e)))
    }
}

/// Identity provider's view of an account.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Set once the address is confirmed
    #[serde(default)]
    pub email_confirmed_at: Option<String>,
}

/// Password-grant session.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentitySession {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: IdentityUser,
}

/// Signup response: a full session when confirmations are disabled, a bare
/// user object otherwise.
#[derive(Debug, Deserialize)]
struct SignUpResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    user: Option<IdentityUser>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_confirmed_at: Option<String>,
}

impl SignUpResponse {
    fn into_parts(self) -> Result<(IdentityUser, Option<String>), AppError> {
        if let Some(user) = self.user {
            return Ok((user, self.access_token));
        }
        match self.id {
            Some(id) => Ok((
                IdentityUser {
                    id,
                    email: self.email,
                    email_confirmed_at: self.email_confirmed_at,
                },
                None,
            )),
            None => Err(AppError::Identity(
                "signup response carried no user id".to_string(),
            )),
        }
    }
}
