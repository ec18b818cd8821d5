use std::collections::HashSet;

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{SummaryKey, SummaryTotals, VoteFact};
use crate::repository::summary::SummaryRepository;

/// Folds the live vote facts of one summary key into its totals. Total
/// recomputation: the result replaces whatever is stored, so running it
/// twice over the same rows is a no-op and an interrupted run can simply
/// be repeated.
pub fn fold_votes(facts: &[VoteFact]) -> SummaryTotals {
    let mut totals = SummaryTotals {
        total_points: Decimal::ZERO,
        vote_count: 0,
        first_place_count: 0,
        second_place_count: 0,
        third_place_count: 0,
        average_rating: None,
    };

    let mut rating_sum = Decimal::ZERO;
    let mut rating_count = 0u32;

    for fact in facts {
        totals.total_points += fact.final_points;
        totals.vote_count += 1;
        match fact.place {
            Some(1) => totals.first_place_count += 1,
            Some(2) => totals.second_place_count += 1,
            Some(3) => totals.third_place_count += 1,
            _ => {}
        }
        if let Some(rating) = fact.rating {
            rating_sum += rating;
            rating_count += 1;
        }
    }

    if rating_count > 0 {
        totals.average_rating = Some((rating_sum / Decimal::from(rating_count)).round_dp(2));
    }

    totals
}

/// Recomputes the summaries for a set of keys from their live vote rows.
/// Keys are deduplicated; a key with no remaining live votes is refreshed
/// to zero totals rather than skipped.
pub async fn refresh_keys(pool: &PgPool, keys: &[SummaryKey]) -> Result<()> {
    let repo = SummaryRepository::new(pool);
    let mut seen: HashSet<SummaryKey> = HashSet::new();

    for key in keys {
        if !seen.insert(*key) {
            continue;
        }
        let facts = repo.live_vote_facts(key).await?;
        let totals = fold_votes(&facts);
        repo.upsert(key, &totals).await?;
    }

    Ok(())
}

/// Refreshes a set of keys and then the event's cached rankings in the
/// same aggregation pass, keeping the cached rank at most one cycle stale.
pub async fn refresh_keys_and_rank(pool: &PgPool, event_id: Uuid, keys: &[SummaryKey]) -> Result<()> {
    refresh_keys(pool, keys).await?;
    SummaryRepository::new(pool).refresh_rankings(event_id).await
}

/// Drops and re-derives every summary row of an event from the live vote
/// rows. Produces exactly what incremental refreshes would have: the
/// summaries are a cache, this is the cache's rebuild function.
pub async fn rebuild_event(pool: &PgPool, event_id: Uuid) -> Result<u64> {
    let repo = SummaryRepository::new(pool);

    repo.delete_for_event(event_id).await?;
    let keys = repo.keys_for_event(event_id).await?;
    refresh_keys(pool, &keys).await?;
    repo.refresh_rankings(event_id).await?;

    tracing::info!(%event_id, keys = keys.len(), "rebuilt vote summaries");
    Ok(keys.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fact(place: Option<i32>, final_points: i64) -> VoteFact {
        VoteFact {
            place,
            rating: None,
            final_points: Decimal::new(final_points, 0),
        }
    }

    fn rating_fact(rating: &str) -> VoteFact {
        VoteFact {
            place: None,
            rating: Some(rating.parse().unwrap()),
            final_points: Decimal::ZERO,
        }
    }

    #[test]
    fn test_three_first_place_votes_total_nine() {
        // ranked 3-2-1, three 1st-place votes for one entry
        let facts = vec![fact(Some(1), 3), fact(Some(1), 3), fact(Some(1), 3)];
        let totals = fold_votes(&facts);

        assert_eq!(totals.total_points, Decimal::new(9, 0));
        assert_eq!(totals.vote_count, 3);
        assert_eq!(totals.first_place_count, 3);
        assert_eq!(totals.second_place_count, 0);
    }

    #[test]
    fn test_total_points_is_sum_of_final_points() {
        let facts = vec![fact(Some(1), 3), fact(Some(2), 2), fact(Some(3), 1)];
        let totals = fold_votes(&facts);

        let expected: Decimal = facts.iter().map(|f| f.final_points).sum();
        assert_eq!(totals.total_points, expected);
    }

    #[test]
    fn test_recomputation_is_idempotent() {
        let facts = vec![fact(Some(1), 3), fact(Some(2), 2), rating_fact("4.5")];
        assert_eq!(fold_votes(&facts), fold_votes(&facts));
    }

    #[test]
    fn test_superseded_ballot_contribution_is_removed_exactly() {
        let ballot_a = vec![fact(Some(1), 3), fact(Some(2), 2)];
        let ballot_b = vec![fact(Some(1), 6)];

        let mut all = ballot_a.clone();
        all.extend(ballot_b.clone());

        let with_both = fold_votes(&all);
        let only_b = fold_votes(&ballot_b);

        let a_contribution: Decimal = ballot_a.iter().map(|f| f.final_points).sum();
        assert_eq!(with_both.total_points - only_b.total_points, a_contribution);
        assert_eq!(with_both.vote_count - only_b.vote_count, ballot_a.len() as i32);
    }

    #[test]
    fn test_empty_key_refreshes_to_zero() {
        let totals = fold_votes(&[]);

        assert_eq!(totals.total_points, Decimal::ZERO);
        assert_eq!(totals.vote_count, 0);
        assert_eq!(totals.first_place_count, 0);
        assert_eq!(totals.average_rating, None);
    }

    #[test]
    fn test_average_rating_rounds_to_two_decimals() {
        let facts = vec![rating_fact("5"), rating_fact("4"), rating_fact("4")];
        let totals = fold_votes(&facts);

        assert_eq!(totals.average_rating, Some("4.33".parse().unwrap()));
    }
}
