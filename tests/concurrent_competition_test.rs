//! Concurrent competition creation test.
//!
//! Several requests can race to open the same company month. The create-only
//! insert plus re-read must leave exactly one competition row, with every
//! racer seeing the same document.
//!
//! Requires the Firestore emulator.

use paceboard::db::FirestoreDb;
use paceboard::services::CompetitionService;

mod common;

#[tokio::test]
async fn test_concurrent_get_or_create_single_competition() {
    if std::env::var("FIRESTORE_EMULATOR_HOST").is_err() {
        eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
        return;
    }

    let db = FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator");

    let company_id = format!("company-{}", common::unique_suffix());
    let year_month = "2026-09";

    const RACERS: usize = 8;

    let mut handles = Vec::with_capacity(RACERS);
    for _ in 0..RACERS {
        let competitions = CompetitionService::new(db.clone());
        let company_id = company_id.clone();
        handles.push(tokio::spawn(async move {
            competitions.get_or_create(&company_id, year_month).await
        }));
    }

    let mut ids = Vec::with_capacity(RACERS);
    for handle in handles {
        let competition = handle
            .await
            .expect("task panicked")
            .expect("get_or_create should survive the race");
        ids.push(competition.id);
    }

    // Every racer resolved to the same document.
    let first = &ids[0];
    assert!(
        ids.iter().all(|id| id == first),
        "All racers should see the same competition, got {:?}",
        ids
    );

    // And the store holds exactly one row for that month.
    let competitions = CompetitionService::new(db.clone());
    let listed = competitions.list_for_company(&company_id).await.unwrap();
    let for_month: Vec<_> = listed
        .iter()
        .filter(|c| c.year_month == year_month)
        .collect();
    assert_eq!(
        for_month.len(),
        1,
        "The race must not produce duplicate competitions"
    );
    assert_eq!(&for_month[0].id, first);

    println!(
        "✓ {} concurrent racers shared one competition: {}",
        RACERS, first
    );
}

#[tokio::test]
async fn test_concurrent_entry_upserts_converge() {
    if std::env::var("FIRESTORE_EMULATOR_HOST").is_err() {
        eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
        return;
    }

    use paceboard::models::{Activity, ScoringTiers, Tier};
    use paceboard::services::EntryService;

    let db = FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator");

    let suffix = common::unique_suffix();
    let user_id = format!("user-{}", suffix);
    let company_id = format!("company-{}", suffix);

    let activity = Activity {
        id: format!("activity-{}", suffix),
        name: "Walking".to_string(),
        description: String::new(),
        unit: "km".to_string(),
        scoring_tiers: ScoringTiers {
            tiers: vec![Tier {
                min: 0.0,
                max: None,
                points: 1,
            }],
        },
        company_id: None,
        is_active: true,
        created_at: chrono::Utc::now().to_rfc3339(),
    };
    db.upsert_activity(&activity).await.unwrap();

    let competitions = CompetitionService::new(db.clone());
    let competition = competitions
        .get_or_create(&company_id, "2026-09")
        .await
        .unwrap();

    // Concurrent overwrites of the same natural key: last writer wins, and
    // the row count stays at one.
    const WRITERS: usize = 6;
    let mut handles = Vec::with_capacity(WRITERS);
    for i in 0..WRITERS {
        let entries = EntryService::new(db.clone(), competitions.clone());
        let user_id = user_id.clone();
        let activity_id = activity.id.clone();
        let competition_id = competition.id.clone();
        handles.push(tokio::spawn(async move {
            entries
                .upsert(&user_id, &activity_id, &competition_id, (i + 1) as f64)
                .await
        }));
    }

    for handle in handles {
        handle
            .await
            .expect("task panicked")
            .expect("upsert should succeed under contention");
    }

    let rows = db
        .list_entries_for_user(&user_id, &competition.id)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1, "Contention must not duplicate entry rows");
    assert!(
        (1..=WRITERS as u64).contains(&(rows[0].value as u64)),
        "Final value should come from one of the writers, got {}",
        rows[0].value
    );

    println!("✓ {} concurrent writers converged on one row", WRITERS);
}
