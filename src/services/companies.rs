// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Company management: invite codes, creation, template cloning.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::company::{is_valid_company_code, normalize_company_code};
use crate::models::{Activity, Company};
use crate::time_utils::format_utc_rfc3339;
use ring::rand::{SecureRandom, SystemRandom};

/// Attempts before giving up on finding an unused invite code.
const CODE_GENERATION_ATTEMPTS: usize = 10;

const CODE_LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const CODE_DIGITS: &[u8] = b"0123456789";

/// Company management service.
#[derive(Clone)]
pub struct CompanyService {
    db: FirestoreDb,
    rng: SystemRandom,
}

impl CompanyService {
    pub fn new(db: FirestoreDb) -> Self {
        Self {
            db,
            rng: SystemRandom::new(),
        }
    }

    /// Create a company with a fresh invite code, then clone the global
    /// activity templates into its namespace.
    pub async fn create_company(&self, name: &str) -> Result<Company> {
        let name = name.trim();
        if name.len() < 2 {
            return Err(AppError::validation(
                "company_name",
                "must be at least 2 characters",
            ));
        }

        let code = self.generate_unique_code().await?;
        let company = Company {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            company_code: code,
            created_at: format_utc_rfc3339(chrono::Utc::now()),
        };
        self.db.insert_company(&company).await?;

        let cloned = self.clone_global_activities(&company.id).await?;
        tracing::info!(company_id = %company.id, cloned, "Company created");

        Ok(company)
    }

    /// Copy every active global template into the company's namespace.
    ///
    /// Copies get fresh IDs so the company can edit or retire them without
    /// touching the templates.
    pub async fn clone_global_activities(&self, company_id: &str) -> Result<usize> {
        let all = self.db.list_activities().await?;
        let now = format_utc_rfc3339(chrono::Utc::now());

        let copies: Vec<Activity> = all
            .into_iter()
            .filter(|a| a.company_id.is_none() && a.is_active)
            .map(|template| Activity {
                id: uuid::Uuid::new_v4().to_string(),
                company_id: Some(company_id.to_string()),
                created_at: now.clone(),
                ..template
            })
            .collect();

        if !copies.is_empty() {
            self.db.batch_upsert_activities(&copies).await?;
        }
        Ok(copies.len())
    }

    /// Find a company by invite code (case-insensitive).
    pub async fn find_by_code(&self, code: &str) -> Result<Company> {
        if !is_valid_company_code(code) {
            return Err(AppError::validation(
                "company_code",
                "must be 6 characters like AB12C3",
            ));
        }

        let normalized = normalize_company_code(code);
        self.db
            .get_company_by_code(&normalized)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No company for code {}", normalized)))
    }

    /// Issue a fresh invite code, invalidating the old one.
    pub async fn regenerate_code(&self, company_id: &str) -> Result<Company> {
        let mut company = self
            .db
            .get_company(company_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Company {} not found", company_id)))?;

        company.company_code = self.generate_unique_code().await?;
        self.db.update_company(&company).await?;

        tracing::info!(company_id = %company.id, "Invite code regenerated");
        Ok(company)
    }

    /// Draw invite codes until one is unused in the store.
    async fn generate_unique_code(&self) -> Result<String> {
        for _ in 0..CODE_GENERATION_ATTEMPTS {
            let code = generate_code(&self.rng)?;
            if self.db.get_company_by_code(&code).await?.is_none() {
                return Ok(code);
            }
            tracing::debug!("Invite code collision, retrying");
        }

        Err(AppError::Internal(anyhow::anyhow!(
            "no unused invite code after {} attempts",
            CODE_GENERATION_ATTEMPTS
        )))
    }
}

/// Draw one 6-character invite code from the system RNG.
///
/// Shape: two letters, two digits, one letter, one digit.
fn generate_code(rng: &SystemRandom) -> Result<String> {
    let mut bytes = [0u8; 6];
    rng.fill(&mut bytes)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("system RNG unavailable")))?;

    let pick = |b: u8, set: &[u8]| set[(b as usize) % set.len()] as char;
    Ok([
        pick(bytes[0], CODE_LETTERS),
        pick(bytes[1], CODE_LETTERS),
        pick(bytes[2], CODE_DIGITS),
        pick(bytes[3], CODE_DIGITS),
        pick(bytes[4], CODE_LETTERS),
        pick(bytes[5], CODE_DIGITS),
    ]
    .iter()
    .collect())
}
