// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Companies (tenants and their invite codes)
//! - Users (profiles and roles)
//! - Activities (definitions with scoring tiers)
//! - Monthly competitions (one per company and month)
//! - User entries (one per user, activity and competition)

use std::collections::HashMap;

use crate::db::collections;
use crate::error::AppError;
use crate::models::{Activity, Company, MonthlyCompetition, User, UserEntry};
use futures_util::{stream, StreamExt};

const MAX_CONCURRENT_DB_OPS: usize = 50;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // Use ExternalJwtFunctionSource to provide a dummy token without needing async-trait
        // or a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Company Operations ──────────────────────────────────────

    /// Get a company by its document ID.
    pub async fn get_company(&self, company_id: &str) -> Result<Option<Company>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::COMPANIES)
            .obj()
            .one(company_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Look up a company by invite code.
    ///
    /// Codes are stored upper-case; callers must normalize before querying.
    pub async fn get_company_by_code(&self, code: &str) -> Result<Option<Company>, AppError> {
        let code = code.to_string();
        let matches: Vec<Company> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::COMPANIES)
            .filter(move |q| q.field("company_code").eq(code.clone()))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(matches.into_iter().next())
    }

    /// Create a company document (fails if the ID already exists).
    pub async fn insert_company(&self, company: &Company) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::COMPANIES)
            .document_id(&company.id)
            .object(company)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Overwrite a company document (code regeneration).
    pub async fn update_company(&self, company: &Company) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::COMPANIES)
            .document_id(&company.id)
            .object(company)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// List all companies (system admin views).
    pub async fn list_companies(&self) -> Result<Vec<Company>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::COMPANIES)
            .order_by([("name", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user profile by identity provider id.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a user profile (fails if the ID already exists).
    pub async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Overwrite a user profile (role changes, company assignment).
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// List all users of one company.
    pub async fn list_users_for_company(&self, company_id: &str) -> Result<Vec<User>, AppError> {
        let company_id = company_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.field("company_id").eq(company_id.clone()))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all users across companies (system admin views).
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Fetch several users by id, keyed by id.
    ///
    /// Uses concurrent reads with a limit to avoid overloading Firestore;
    /// ids without a profile document are silently absent from the result.
    pub async fn get_users_by_ids(
        &self,
        user_ids: &[String],
    ) -> Result<HashMap<String, User>, AppError> {
        let client = self.get_client()?;

        let users = stream::iter(user_ids.to_vec())
            .map(|user_id| async move {
                let user: Option<User> = client
                    .fluent()
                    .select()
                    .by_id_in(collections::USERS)
                    .obj()
                    .one(&user_id)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok::<_, AppError>(user)
            })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<Option<User>, AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<Option<User>>, AppError>>()?;

        Ok(users
            .into_iter()
            .flatten()
            .map(|user| (user.id.clone(), user))
            .collect())
    }

    // ─── Activity Operations ─────────────────────────────────────

    /// Get an activity definition by ID.
    pub async fn get_activity(&self, activity_id: &str) -> Result<Option<Activity>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::ACTIVITIES)
            .obj()
            .one(activity_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or overwrite an activity definition.
    pub async fn upsert_activity(&self, activity: &Activity) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::ACTIVITIES)
            .document_id(&activity.id)
            .object(activity)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// List every activity definition.
    ///
    /// Global and company-scoped definitions live in one collection; callers
    /// partition by `company_id`. The catalog is small (tens of rows), so one
    /// read is cheaper than maintaining a null-field index.
    pub async fn list_activities(&self) -> Result<Vec<Activity>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::ACTIVITIES)
            .order_by([("name", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store multiple activity definitions (template cloning on company
    /// creation).
    ///
    /// Uses concurrent writes with a limit to avoid overloading Firestore.
    pub async fn batch_upsert_activities(&self, records: &[Activity]) -> Result<(), AppError> {
        let client = self.get_client()?;

        stream::iter(records.to_vec())
            .map(|record| async move {
                let _: () = client
                    .fluent()
                    .update()
                    .in_col(collections::ACTIVITIES)
                    .document_id(&record.id)
                    .object(&record)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;

                Ok::<_, AppError>(())
            })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<(), AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<()>, AppError>>()?;

        Ok(())
    }

    // ─── Competition Operations ──────────────────────────────────

    /// Get a competition by its natural-key document ID.
    pub async fn get_competition(
        &self,
        competition_id: &str,
    ) -> Result<Option<MonthlyCompetition>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::COMPETITIONS)
            .obj()
            .one(competition_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a competition document.
    ///
    /// Insert is create-only: the write fails if the document already exists,
    /// which is what keeps `(company_id, year_month)` a singleton even when
    /// two resolvers race.
    pub async fn insert_competition(
        &self,
        competition: &MonthlyCompetition,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::COMPETITIONS)
            .document_id(&competition.id)
            .object(competition)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// List a company's competitions, newest month first.
    pub async fn list_competitions_for_company(
        &self,
        company_id: &str,
        limit: u32,
    ) -> Result<Vec<MonthlyCompetition>, AppError> {
        let company_id = company_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::COMPETITIONS)
            .filter(move |q| q.field("company_id").eq(company_id.clone()))
            .order_by([(
                "year_month",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all competitions for one month across companies (system stats).
    pub async fn list_competitions_for_month(
        &self,
        year_month: &str,
    ) -> Result<Vec<MonthlyCompetition>, AppError> {
        let year_month = year_month.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::COMPETITIONS)
            .filter(move |q| q.field("year_month").eq(year_month.clone()))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Entry Operations ────────────────────────────────────────

    /// Get an entry by its natural-key document ID.
    pub async fn get_entry(&self, entry_id: &str) -> Result<Option<UserEntry>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::ENTRIES)
            .obj()
            .one(entry_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or overwrite an entry.
    ///
    /// The document ID is the natural key, so a repeated write for the same
    /// `(user, activity, competition)` can only ever touch one document.
    pub async fn upsert_entry(&self, entry: &UserEntry) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::ENTRIES)
            .document_id(&entry.id)
            .object(entry)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// List all entries of one competition (leaderboard input).
    pub async fn list_entries_for_competition(
        &self,
        competition_id: &str,
    ) -> Result<Vec<UserEntry>, AppError> {
        let competition_id = competition_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::ENTRIES)
            .filter(move |q| q.field("competition_id").eq(competition_id.clone()))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List one user's entries within one competition.
    pub async fn list_entries_for_user(
        &self,
        user_id: &str,
        competition_id: &str,
    ) -> Result<Vec<UserEntry>, AppError> {
        let user_id = user_id.to_string();
        let competition_id = competition_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::ENTRIES)
            .filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id.clone()),
                    q.field("competition_id").eq(competition_id.clone()),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count every stored entry (system stats).
    pub async fn count_entries(&self) -> Result<usize, AppError> {
        let entries: Vec<UserEntry> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::ENTRIES)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(entries.len())
    }
}
