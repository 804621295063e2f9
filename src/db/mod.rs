//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const COMPANIES: &str = "companies";
    pub const USERS: &str = "users";
    pub const ACTIVITIES: &str = "activities";
    /// Monthly competitions (keyed by `{company_id}_{year_month}`)
    pub const COMPETITIONS: &str = "monthly_competitions";
    /// User entries (keyed by `{user_id}_{activity_id}_{competition_id}`)
    pub const ENTRIES: &str = "user_entries";
}
