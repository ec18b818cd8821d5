use std::cmp::Ordering;

use crate::dto::results::{RankedStanding, StandingRow};

/// The leaderboard's total order: descending total points, ties broken by
/// first-place count, then vote count, then ascending entry number. The
/// entry number is unique per event, so two standings never compare equal
/// and the resulting order does not depend on input order.
pub fn compare_standings(a: &StandingRow, b: &StandingRow) -> Ordering {
    b.total_points
        .cmp(&a.total_points)
        .then_with(|| b.first_place_count.cmp(&a.first_place_count))
        .then_with(|| b.vote_count.cmp(&a.vote_count))
        .then_with(|| a.entry_number.cmp(&b.entry_number))
}

/// Orders standings and assigns 1-based ranks within the requested view.
pub fn rank_standings(mut rows: Vec<StandingRow>) -> Vec<RankedStanding> {
    rows.sort_by(compare_standings);
    rows.into_iter()
        .enumerate()
        .map(|(index, standing)| RankedStanding {
            rank: index as i32 + 1,
            standing,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::*;

    fn standing(entry_number: i32, total: i64, first: i32, votes: i32) -> StandingRow {
        StandingRow {
            entry_id: Uuid::new_v4(),
            entry_number,
            title: format!("Entry {entry_number}"),
            division_id: None,
            division_name: None,
            division_type: None,
            category_id: None,
            total_points: Decimal::new(total, 0),
            vote_count: votes,
            first_place_count: first,
            second_place_count: 0,
            third_place_count: 0,
            average_rating: None,
        }
    }

    #[test]
    fn test_highest_total_ranks_first() {
        let ranked = rank_standings(vec![
            standing(3, 4, 0, 2),
            standing(5, 9, 3, 3),
            standing(8, 6, 1, 3),
        ]);

        assert_eq!(ranked[0].standing.entry_number, 5);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[0].standing.total_points, Decimal::new(9, 0));
        assert_eq!(ranked[2].standing.entry_number, 3);
        assert_eq!(ranked[2].rank, 3);
    }

    #[test]
    fn test_tie_broken_by_first_places_then_votes_then_entry_number() {
        // equal totals: more first places wins
        let ranked = rank_standings(vec![standing(2, 6, 1, 3), standing(1, 6, 2, 3)]);
        assert_eq!(ranked[0].standing.entry_number, 1);

        // equal totals and first places: more votes wins
        let ranked = rank_standings(vec![standing(2, 6, 1, 2), standing(1, 6, 1, 4)]);
        assert_eq!(ranked[0].standing.entry_number, 1);

        // fully tied on points: lower entry number wins
        let ranked = rank_standings(vec![standing(7, 6, 1, 3), standing(4, 6, 1, 3)]);
        assert_eq!(ranked[0].standing.entry_number, 4);
        assert_eq!(ranked[1].standing.entry_number, 7);
    }

    #[test]
    fn test_order_does_not_depend_on_input_order() {
        let rows = vec![
            standing(1, 6, 1, 3),
            standing(2, 6, 1, 3),
            standing(3, 9, 3, 3),
            standing(4, 2, 0, 1),
        ];
        let mut reversed = rows.clone();
        reversed.reverse();

        let forward: Vec<i32> = rank_standings(rows)
            .into_iter()
            .map(|r| r.standing.entry_number)
            .collect();
        let backward: Vec<i32> = rank_standings(reversed)
            .into_iter()
            .map(|r| r.standing.entry_number)
            .collect();

        assert_eq!(forward, backward);
        assert_eq!(forward, vec![3, 1, 2, 4]);
    }

    #[test]
    fn test_ranks_are_dense_and_one_based() {
        let ranked = rank_standings(vec![standing(1, 5, 0, 2), standing(2, 5, 0, 2)]);
        let ranks: Vec<i32> = ranked.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2]);
    }
}
