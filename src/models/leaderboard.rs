//! Leaderboard aggregation over competition entries.
//!
//! Pure grouping and ranking; reading entries and joining display names
//! belongs to the service layer.

use std::collections::HashMap;

use crate::models::UserEntry;

/// One user's aggregated standing, before display names are joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedTotal {
    pub user_id: String,
    pub total_points: u32,
    pub entries_count: u32,
    /// 1-based position after sorting
    pub rank: u32,
}

/// Group entries by user, sum points, count entries, and rank.
///
/// Ordering: total points descending, then entries count descending, then
/// `user_id` ascending, so re-aggregating the same entries always yields the
/// same ranking. Users without entries never appear.
pub fn rank_entries(entries: &[UserEntry]) -> Vec<RankedTotal> {
    let mut totals: HashMap<&str, (u32, u32)> = HashMap::new();
    for entry in entries {
        let slot = totals.entry(entry.user_id.as_str()).or_insert((0, 0));
        slot.0 += entry.points;
        slot.1 += 1;
    }

    let mut ranked: Vec<RankedTotal> = totals
        .into_iter()
        .map(|(user_id, (total_points, entries_count))| RankedTotal {
            user_id: user_id.to_string(),
            total_points,
            entries_count,
            rank: 0,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.total_points
            .cmp(&a.total_points)
            .then(b.entries_count.cmp(&a.entries_count))
            .then(a.user_id.cmp(&b.user_id))
    });

    for (i, row) in ranked.iter_mut().enumerate() {
        row.rank = (i + 1) as u32;
    }

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_entry(user_id: &str, activity_id: &str, points: u32) -> UserEntry {
        UserEntry {
            id: UserEntry::document_id(user_id, activity_id, "comp-1"),
            user_id: user_id.to_string(),
            activity_id: activity_id.to_string(),
            competition_id: "comp-1".to_string(),
            value: 10.0,
            points,
            created_at: "2025-08-01T00:00:00Z".to_string(),
            updated_at: "2025-08-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_groups_sums_and_ranks() {
        let entries = vec![
            make_entry("user-a", "act-1", 10),
            make_entry("user-a", "act-2", 5),
            make_entry("user-b", "act-1", 20),
        ];

        let ranked = rank_entries(&entries);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].user_id, "user-b");
        assert_eq!(ranked[0].total_points, 20);
        assert_eq!(ranked[0].entries_count, 1);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].user_id, "user-a");
        assert_eq!(ranked[1].total_points, 15);
        assert_eq!(ranked[1].entries_count, 2);
        assert_eq!(ranked[1].rank, 2);
    }

    #[test]
    fn test_tie_broken_by_entries_count_then_user_id() {
        let entries = vec![
            make_entry("user-c", "act-1", 10),
            make_entry("user-a", "act-1", 4),
            make_entry("user-a", "act-2", 6),
            make_entry("user-b", "act-1", 10),
        ];

        let ranked = rank_entries(&entries);

        // All three have 10 points: user-a wins on entry count, then
        // user-b before user-c alphabetically.
        assert_eq!(ranked[0].user_id, "user-a");
        assert_eq!(ranked[1].user_id, "user-b");
        assert_eq!(ranked[2].user_id, "user-c");
        assert_eq!(
            ranked.iter().map(|r| r.rank).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_deterministic_across_input_order() {
        let mut entries = vec![
            make_entry("user-b", "act-1", 10),
            make_entry("user-a", "act-1", 10),
            make_entry("user-c", "act-1", 3),
        ];

        let first = rank_entries(&entries);
        entries.reverse();
        let second = rank_entries(&entries);

        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_entries_empty_leaderboard() {
        assert!(rank_entries(&[]).is_empty());
    }

    #[test]
    fn test_zero_point_entries_still_count() {
        // An entry below the first tier scores 0 points but still marks the
        // user as active this month.
        let entries = vec![make_entry("user-a", "act-1", 0)];
        let ranked = rank_entries(&entries);

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].total_points, 0);
        assert_eq!(ranked[0].entries_count, 1);
        assert_eq!(ranked[0].rank, 1);
    }
}
