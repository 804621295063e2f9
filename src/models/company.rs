// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Company (tenant) model and invite-code helpers.

use serde::{Deserialize, Serialize};

/// Length of a company invite code.
pub const COMPANY_CODE_LEN: usize = 6;

/// Company record stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    /// Document ID
    pub id: String,
    /// Display name
    pub name: String,
    /// Six-character invite code, stored upper-case
    pub company_code: String,
    /// When the company was created (RFC3339)
    pub created_at: String,
}

/// Canonical stored/compared form of an invite code.
pub fn normalize_company_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Check a code against the generated shape: two letters, two digits,
/// one letter, one digit (e.g. "AB12C3"). Case-insensitive.
pub fn is_valid_company_code(code: &str) -> bool {
    let chars: Vec<char> = code.trim().chars().collect();
    if chars.len() != COMPANY_CODE_LEN {
        return false;
    }
    chars[0].is_ascii_alphabetic()
        && chars[1].is_ascii_alphabetic()
        && chars[2].is_ascii_digit()
        && chars[3].is_ascii_digit()
        && chars[4].is_ascii_alphabetic()
        && chars[5].is_ascii_digit()
}
