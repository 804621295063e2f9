use criterion::{black_box, criterion_group, criterion_main, Criterion};
use paceboard::models::leaderboard::rank_entries;
use paceboard::models::UserEntry;

fn make_entries(users: usize, activities: usize) -> Vec<UserEntry> {
    let mut entries = Vec::with_capacity(users * activities);
    for user in 0..users {
        for activity in 0..activities {
            let user_id = format!("user-{:05}", user);
            let activity_id = format!("act-{:02}", activity);
            entries.push(UserEntry {
                id: format!("{}_{}_co_2025-08", user_id, activity_id),
                user_id: user_id.clone(),
                activity_id,
                competition_id: "co_2025-08".to_string(),
                value: ((user * 7 + activity * 13) % 200) as f64,
                points: ((user * 3 + activity) % 5) as u32,
                created_at: "2025-08-01T00:00:00+00:00".to_string(),
                updated_at: "2025-08-15T00:00:00+00:00".to_string(),
            });
        }
    }
    entries
}

fn benchmark_rank_entries(c: &mut Criterion) {
    let small_company = make_entries(50, 6);
    let large_company = make_entries(2_000, 10);

    // Everyone on the same score, so the tie-break does all the work
    let mut all_tied = make_entries(1_000, 4);
    for entry in &mut all_tied {
        entry.points = 3;
    }

    let mut group = c.benchmark_group("leaderboard_ranking");

    group.bench_function("small_company", |b| {
        b.iter(|| rank_entries(black_box(&small_company)))
    });

    group.bench_function("large_company", |b| {
        b.iter(|| rank_entries(black_box(&large_company)))
    });

    group.bench_function("all_tied", |b| {
        b.iter(|| rank_entries(black_box(&all_tied)))
    });

    group.finish();
}

criterion_group!(benches, benchmark_rank_entries);
criterion_main!(benches);
