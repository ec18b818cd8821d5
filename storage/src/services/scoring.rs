use rust_decimal::Decimal;

use crate::dto::ballot::{NormalizedBallot, NormalizedSelection};
use crate::error::VoteError;
use crate::models::VotingCategory;

use super::config_resolver::ResolvedVotingConfig;

/// A selection with its computed point values, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSelection {
    pub selection: NormalizedSelection,
    pub base_points: Decimal,
    pub final_points: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredBallot {
    pub category: VotingCategory,
    pub weight_multiplier: Decimal,
    pub selections: Vec<ScoredSelection>,
}

/// Base points for one validated selection. Deterministic in
/// (selection, place table): ranked reads the place table, rating uses the
/// raw rating, approval uses the flat per-selection value, weighted and
/// cumulative use the caster's allocation.
pub fn base_points(
    config: &ResolvedVotingConfig,
    selection: &NormalizedSelection,
) -> Result<Decimal, VoteError> {
    match config.category {
        VotingCategory::Ranked => {
            let place = selection
                .place
                .ok_or(VoteError::MalformedBallot("ranked selection has no place".into()))?;
            config
                .places
                .get(&place)
                .copied()
                .ok_or(VoteError::InvalidPlace { place })
        }
        VotingCategory::Rating => selection
            .rating
            .ok_or(VoteError::MalformedBallot("rating selection has no rating".into())),
        VotingCategory::Approval => Ok(config.points_per_selection),
        VotingCategory::Weighted | VotingCategory::Cumulative => selection
            .allocated_points
            .ok_or(VoteError::MalformedBallot("selection has no point allocation".into())),
    }
}

/// `final_points = base_points * weight_multiplier`, at the schema's fixed
/// 2-decimal precision. Computed at write time; the stored value must
/// always satisfy this identity.
pub fn final_points(base_points: Decimal, weight_multiplier: Decimal) -> Decimal {
    (base_points * weight_multiplier).round_dp(2)
}

/// Scores every selection of a validated ballot under the caster's weight
/// multiplier.
pub fn score_ballot(
    config: &ResolvedVotingConfig,
    ballot: &NormalizedBallot,
    weight_multiplier: Decimal,
) -> Result<ScoredBallot, Vec<VoteError>> {
    let mut selections = Vec::with_capacity(ballot.selections.len());
    let mut errors = Vec::new();

    for selection in &ballot.selections {
        match base_points(config, selection) {
            Ok(base) => selections.push(ScoredSelection {
                selection: selection.clone(),
                base_points: base,
                final_points: final_points(base, weight_multiplier),
            }),
            Err(error) => errors.push(error),
        }
    }

    if errors.is_empty() {
        Ok(ScoredBallot {
            category: ballot.category,
            weight_multiplier,
            selections,
        })
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use uuid::Uuid;

    use super::*;

    fn ranked_config() -> ResolvedVotingConfig {
        ResolvedVotingConfig {
            event_id: Uuid::new_v4(),
            category: VotingCategory::Ranked,
            places: BTreeMap::from([
                (1, Decimal::new(3, 0)),
                (2, Decimal::new(2, 0)),
                (3, Decimal::new(1, 0)),
            ]),
            max_votes_per_user: None,
            max_votes_per_entry: None,
            allow_self_voting: false,
            allow_vote_changes: false,
            voting_starts_at: None,
            voting_ends_at: None,
            event_is_active: true,
            min_rating: None,
            max_rating: None,
            max_selections: None,
            points_per_selection: Decimal::ONE,
            max_points_per_ballot: None,
            weight_classes: Vec::new(),
        }
    }

    fn ranked_selection(place: i32) -> NormalizedSelection {
        NormalizedSelection {
            entry_id: Uuid::new_v4(),
            division_id: None,
            category_id: None,
            place: Some(place),
            rating: None,
            allocated_points: None,
        }
    }

    #[test]
    fn test_ranked_base_points_from_place_table() {
        let config = ranked_config();
        assert_eq!(
            base_points(&config, &ranked_selection(1)).unwrap(),
            Decimal::new(3, 0)
        );
        assert_eq!(
            base_points(&config, &ranked_selection(3)).unwrap(),
            Decimal::new(1, 0)
        );
    }

    #[test]
    fn test_judge_multiplier_doubles_first_place() {
        // base 3 pts at 2.00 weight must persist as 6.00
        let result = final_points(Decimal::new(3, 0), Decimal::new(200, 2));
        assert_eq!(result, Decimal::new(600, 2));
    }

    #[test]
    fn test_final_points_rounds_to_two_decimals() {
        let result = final_points(Decimal::new(1, 0), Decimal::new(1333, 3));
        assert_eq!(result, Decimal::new(133, 2));
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let config = ranked_config();
        let selection = ranked_selection(2);
        let multiplier = Decimal::new(150, 2);

        let first = base_points(&config, &selection).map(|b| final_points(b, multiplier));
        let second = base_points(&config, &selection).map(|b| final_points(b, multiplier));
        assert_eq!(first, second);
    }

    #[test]
    fn test_rating_passes_through_as_base_points() {
        let mut config = ranked_config();
        config.category = VotingCategory::Rating;

        let selection = NormalizedSelection {
            entry_id: Uuid::new_v4(),
            division_id: None,
            category_id: None,
            place: None,
            rating: Some(Decimal::new(45, 1)),
            allocated_points: None,
        };

        assert_eq!(base_points(&config, &selection).unwrap(), Decimal::new(45, 1));
    }

    #[test]
    fn test_unknown_place_is_rejected() {
        let config = ranked_config();
        let error = base_points(&config, &ranked_selection(7)).unwrap_err();
        assert!(matches!(error, VoteError::InvalidPlace { place: 7 }));
    }

    #[test]
    fn test_score_ballot_scores_every_selection() {
        let config = ranked_config();
        let ballot = NormalizedBallot {
            category: VotingCategory::Ranked,
            selections: vec![ranked_selection(1), ranked_selection(2)],
        };

        let scored = score_ballot(&config, &ballot, Decimal::ONE).unwrap();
        assert_eq!(scored.selections.len(), 2);
        assert_eq!(scored.selections[0].final_points, Decimal::new(3, 0));
        assert_eq!(scored.selections[1].final_points, Decimal::new(2, 0));
    }
}
