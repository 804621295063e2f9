// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT compatibility tests.
//!
//! The identity provider mints HS256 tokens; the auth middleware decodes them
//! into [`Claims`]. These tests pin the two sides together, catching shape or
//! algorithm drift early.

use jsonwebtoken::{decode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use paceboard::middleware::auth::Claims;

const SECRET: &[u8] = b"test_jwt_secret_32_bytes_minimum!";

fn now_secs() -> usize {
    chrono::Utc::now().timestamp() as usize
}

/// Decode a token exactly the way the middleware does.
fn middleware_decode(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_aud = false;
    decode::<Claims>(token, &DecodingKey::from_secret(SECRET), &validation)
        .map(|data| data.claims)
}

#[test]
fn test_jwt_roundtrip() {
    let claims = Claims {
        sub: "8c6f0b1e-user".to_string(),
        exp: now_secs() + 3600,
        iat: now_secs(),
        email: Some("someone@example.com".to_string()),
    };

    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET),
    )
    .unwrap();

    let decoded = middleware_decode(&token).expect("Failed to decode JWT");
    assert_eq!(decoded.sub, claims.sub);
    assert_eq!(decoded.email, claims.email);
    assert!(decoded.exp > decoded.iat);
}

#[test]
fn test_provider_token_shape_decodes() {
    // GoTrue access tokens carry aud, role and session fields we never
    // asked for. The middleware must tolerate all of them.
    let provider_claims = serde_json::json!({
        "sub": "3f9d2c70-a1b2-4c3d-9e8f-001122334455",
        "exp": now_secs() + 3600,
        "iat": now_secs(),
        "aud": "authenticated",
        "role": "authenticated",
        "email": "member@example.com",
        "session_id": "d34db33f",
    });

    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &provider_claims,
        &EncodingKey::from_secret(SECRET),
    )
    .unwrap();

    let decoded = middleware_decode(&token).expect("provider-shaped token should decode");
    assert_eq!(decoded.sub, "3f9d2c70-a1b2-4c3d-9e8f-001122334455");
    assert_eq!(decoded.email.as_deref(), Some("member@example.com"));
}

#[test]
fn test_audience_validation_must_stay_off() {
    // With default validation the aud claim makes decoding fail, which is
    // exactly why the middleware disables audience checks.
    let provider_claims = serde_json::json!({
        "sub": "user-1",
        "exp": now_secs() + 3600,
        "aud": "authenticated",
    });

    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &provider_claims,
        &EncodingKey::from_secret(SECRET),
    )
    .unwrap();

    let strict = Validation::new(Algorithm::HS256);
    let result = decode::<Claims>(&token, &DecodingKey::from_secret(SECRET), &strict);
    assert!(result.is_err(), "strict aud validation should reject");

    assert!(middleware_decode(&token).is_ok());
}

#[test]
fn test_minimal_claims_decode() {
    // Only sub and exp are mandatory; iat defaults, email is optional.
    let minimal = serde_json::json!({
        "sub": "user-1",
        "exp": now_secs() + 3600,
    });

    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &minimal,
        &EncodingKey::from_secret(SECRET),
    )
    .unwrap();

    let decoded = middleware_decode(&token).expect("minimal token should decode");
    assert_eq!(decoded.sub, "user-1");
    assert_eq!(decoded.iat, 0);
    assert_eq!(decoded.email, None);
}

#[test]
fn test_expired_token_fails_decode() {
    let claims = Claims {
        sub: "user-1".to_string(),
        exp: now_secs() - 3600,
        iat: now_secs() - 7200,
        email: None,
    };

    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET),
    )
    .unwrap();

    assert!(middleware_decode(&token).is_err());
}

#[test]
fn test_wrong_secret_fails_decode() {
    let claims = Claims {
        sub: "user-1".to_string(),
        exp: now_secs() + 3600,
        iat: now_secs(),
        email: None,
    };

    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"some-other-signing-secret-entirely"),
    )
    .unwrap();

    assert!(middleware_decode(&token).is_err());
}
