use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::dto::ballot::{Ballot, BallotScope, NormalizedBallot, NormalizedSelection, RankedSelection};
use crate::dto::entry::EntryRef;
use crate::error::VoteError;

use super::config_resolver::ResolvedVotingConfig;

/// Everything the validator needs, prefetched so the checks themselves are
/// pure. `entries` holds only the event's own entries, so a failed lookup
/// doubles as the entry-belongs-to-event check.
#[derive(Debug)]
pub struct BallotContext {
    pub config: ResolvedVotingConfig,
    pub entries: HashMap<Uuid, EntryRef>,
    pub caster_user_id: Uuid,
    pub has_live_ballot: bool,
    pub now: DateTime<Utc>,
}

/// Checks a submitted ballot against the event's rules, collecting every
/// violation instead of stopping at the first. All-or-nothing: a ballot
/// with any violation yields no normalized selections.
pub fn validate_ballot(
    ctx: &BallotContext,
    ballot: &Ballot,
) -> Result<NormalizedBallot, Vec<VoteError>> {
    let mut errors = Vec::new();

    if !ctx.config.accepts_ballots(ctx.now) {
        errors.push(VoteError::VotingClosed);
    }

    if ballot.is_empty() {
        errors.push(VoteError::MalformedBallot("ballot contains no selections".into()));
    }

    let mut selections = Vec::new();
    match ballot {
        Ballot::Ranked(ranked) => validate_ranked(ctx, ranked, &mut selections, &mut errors),
        Ballot::Rated(rated) => validate_rated(ctx, rated, &mut selections, &mut errors),
        Ballot::Approval(approved) => validate_approval(ctx, approved, &mut selections, &mut errors),
        Ballot::Weighted(allocations) => {
            validate_weighted(ctx, allocations, &mut selections, &mut errors)
        }
    }

    if ctx.has_live_ballot && !ctx.config.allow_vote_changes {
        errors.push(VoteError::AlreadyVoted);
    }

    if let Some(max) = ctx.config.max_votes_per_user
        && selections.len() as i32 > max
    {
        errors.push(VoteError::TooManySelections { max });
    }

    if errors.is_empty() {
        Ok(NormalizedBallot {
            category: ctx.config.category,
            selections,
        })
    } else {
        Err(errors)
    }
}

fn lookup_entry<'c>(
    ctx: &'c BallotContext,
    entry_id: Uuid,
    errors: &mut Vec<VoteError>,
) -> Option<&'c EntryRef> {
    let entry = ctx.entries.get(&entry_id);
    if entry.is_none() {
        errors.push(VoteError::InvalidEntry {
            entry: entry_id.to_string(),
        });
    }
    entry
}

fn entry_label(entry: &EntryRef) -> String {
    format!("#{}", entry.entry_number)
}

fn check_self_vote(ctx: &BallotContext, entry: &EntryRef, errors: &mut Vec<VoteError>) {
    if !ctx.config.allow_self_voting && entry.owner_user_id == Some(ctx.caster_user_id) {
        errors.push(VoteError::SelfVote {
            entry: entry_label(entry),
        });
    }
}

fn normalized(entry: &EntryRef) -> NormalizedSelection {
    NormalizedSelection {
        entry_id: entry.entry_id,
        division_id: entry.division_id,
        category_id: entry.category_id,
        place: None,
        rating: None,
        allocated_points: None,
    }
}

fn validate_ranked(
    ctx: &BallotContext,
    ranked: &[RankedSelection],
    out: &mut Vec<NormalizedSelection>,
    errors: &mut Vec<VoteError>,
) {
    let mut seen_entries: HashSet<Uuid> = HashSet::new();
    let mut seen_places: HashSet<(BallotScope, i32)> = HashSet::new();

    for selection in ranked {
        let entry = lookup_entry(ctx, selection.entry_id, errors);

        if !seen_entries.insert(selection.entry_id) {
            errors.push(VoteError::DuplicateSelection {
                entry: entry
                    .map(entry_label)
                    .unwrap_or_else(|| selection.entry_id.to_string()),
            });
            continue;
        }

        // Places are unique per scope block: two divisions can each have a
        // 1st place, one division cannot have two.
        if !seen_places.insert((selection.scope, selection.place)) {
            errors.push(VoteError::DuplicatePlace {
                place: selection.place,
            });
        }

        if !ctx.config.places.contains_key(&selection.place) {
            errors.push(VoteError::InvalidPlace {
                place: selection.place,
            });
        }

        let Some(entry) = entry else { continue };

        let scope_ok = match selection.scope {
            BallotScope::Default => true,
            BallotScope::Division(division_id) => entry.division_id == Some(division_id),
            BallotScope::Category(category_id) => entry.category_id == Some(category_id),
        };
        if !scope_ok {
            errors.push(VoteError::InvalidEntry {
                entry: entry_label(entry),
            });
            continue;
        }

        check_self_vote(ctx, entry, errors);

        let mut selection_out = normalized(entry);
        selection_out.place = Some(selection.place);
        out.push(selection_out);
    }
}

fn validate_rated(
    ctx: &BallotContext,
    rated: &std::collections::BTreeMap<Uuid, Decimal>,
    out: &mut Vec<NormalizedSelection>,
    errors: &mut Vec<VoteError>,
) {
    for (&entry_id, &rating) in rated {
        let Some(entry) = lookup_entry(ctx, entry_id, errors) else {
            continue;
        };

        let below_min = ctx.config.min_rating.is_some_and(|min| rating < min);
        let above_max = ctx.config.max_rating.is_some_and(|max| rating > max);
        if below_min || above_max {
            errors.push(VoteError::RatingOutOfRange {
                value: rating.to_string(),
            });
            continue;
        }

        check_self_vote(ctx, entry, errors);

        let mut selection_out = normalized(entry);
        selection_out.rating = Some(rating);
        out.push(selection_out);
    }
}

fn validate_approval(
    ctx: &BallotContext,
    approved: &std::collections::BTreeSet<Uuid>,
    out: &mut Vec<NormalizedSelection>,
    errors: &mut Vec<VoteError>,
) {
    if let Some(max) = ctx.config.max_selections
        && approved.len() as i32 > max
    {
        errors.push(VoteError::TooManySelections { max });
    }

    for &entry_id in approved {
        let Some(entry) = lookup_entry(ctx, entry_id, errors) else {
            continue;
        };
        check_self_vote(ctx, entry, errors);
        out.push(normalized(entry));
    }
}

fn validate_weighted(
    ctx: &BallotContext,
    allocations: &std::collections::BTreeMap<Uuid, Decimal>,
    out: &mut Vec<NormalizedSelection>,
    errors: &mut Vec<VoteError>,
) {
    let mut total = Decimal::ZERO;

    for (&entry_id, &points) in allocations {
        let Some(entry) = lookup_entry(ctx, entry_id, errors) else {
            continue;
        };

        if points <= Decimal::ZERO {
            errors.push(VoteError::MalformedBallot(format!(
                "allocation for entry {} must be positive",
                entry_label(entry)
            )));
            continue;
        }

        if let Some(max) = ctx.config.max_votes_per_entry
            && points > Decimal::from(max)
        {
            errors.push(VoteError::AllocationExceeded);
            continue;
        }

        total += points;
        check_self_vote(ctx, entry, errors);

        let mut selection_out = normalized(entry);
        selection_out.allocated_points = Some(points);
        out.push(selection_out);
    }

    if let Some(max_total) = ctx.config.max_points_per_ballot
        && total > max_total
    {
        errors.push(VoteError::AllocationExceeded);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use chrono::TimeZone;

    use crate::models::VotingCategory;

    use super::*;

    fn fixture_entry(
        entry_id: Uuid,
        entry_number: i32,
        division_id: Option<Uuid>,
        owner_user_id: Option<Uuid>,
    ) -> EntryRef {
        EntryRef {
            entry_id,
            event_id: Uuid::new_v4(),
            division_id,
            category_id: None,
            entry_number,
            owner_user_id,
        }
    }

    struct Fixture {
        ctx: BallotContext,
        entry_a: Uuid,
        entry_b: Uuid,
        entry_c: Uuid,
        own_entry: Uuid,
        division: Uuid,
    }

    fn fixture(category: VotingCategory) -> Fixture {
        let caster = Uuid::new_v4();
        let division = Uuid::new_v4();
        let entry_a = Uuid::new_v4();
        let entry_b = Uuid::new_v4();
        let entry_c = Uuid::new_v4();
        let own_entry = Uuid::new_v4();

        let mut entries = HashMap::new();
        entries.insert(entry_a, fixture_entry(entry_a, 1, Some(division), None));
        entries.insert(entry_b, fixture_entry(entry_b, 2, Some(division), None));
        entries.insert(entry_c, fixture_entry(entry_c, 3, None, None));
        entries.insert(own_entry, fixture_entry(own_entry, 4, None, Some(caster)));

        let config = ResolvedVotingConfig {
            event_id: Uuid::new_v4(),
            category,
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
            min_rating: Some(Decimal::ONE),
            max_rating: Some(Decimal::new(5, 0)),
            max_selections: Some(2),
            points_per_selection: Decimal::ONE,
            max_points_per_ballot: Some(Decimal::new(10, 0)),
            weight_classes: Vec::new(),
        };

        Fixture {
            ctx: BallotContext {
                config,
                entries,
                caster_user_id: caster,
                has_live_ballot: false,
                now: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
            },
            entry_a,
            entry_b,
            entry_c,
            own_entry,
            division,
        }
    }

    fn ranked(selections: &[(i32, Uuid)]) -> Ballot {
        Ballot::Ranked(
            selections
                .iter()
                .map(|&(place, entry_id)| RankedSelection {
                    scope: BallotScope::Default,
                    place,
                    entry_id,
                })
                .collect(),
        )
    }

    #[test]
    fn test_valid_ranked_ballot_is_normalized() {
        let f = fixture(VotingCategory::Ranked);
        let ballot = ranked(&[(1, f.entry_a), (2, f.entry_b), (3, f.entry_c)]);

        let normalized = validate_ballot(&f.ctx, &ballot).unwrap();

        assert_eq!(normalized.selections.len(), 3);
        let first = normalized
            .selections
            .iter()
            .find(|s| s.place == Some(1))
            .unwrap();
        assert_eq!(first.entry_id, f.entry_a);
        // division resolved from the entry itself, not the wire scope
        assert_eq!(first.division_id, Some(f.division));
    }

    #[test]
    fn test_same_entry_for_two_places_is_rejected() {
        let f = fixture(VotingCategory::Ranked);
        let ballot = ranked(&[(1, f.entry_a), (2, f.entry_a)]);

        let errors = validate_ballot(&f.ctx, &ballot).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, VoteError::DuplicateSelection { .. })));
    }

    #[test]
    fn test_duplicate_place_is_rejected() {
        let f = fixture(VotingCategory::Ranked);
        let ballot = ranked(&[(1, f.entry_a), (1, f.entry_b)]);

        let errors = validate_ballot(&f.ctx, &ballot).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, VoteError::DuplicatePlace { place: 1 })));
    }

    #[test]
    fn test_place_outside_configured_range_is_rejected() {
        let f = fixture(VotingCategory::Ranked);
        let ballot = ranked(&[(5, f.entry_a)]);

        let errors = validate_ballot(&f.ctx, &ballot).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, VoteError::InvalidPlace { place: 5 })));
    }

    #[test]
    fn test_unknown_entry_is_rejected() {
        let f = fixture(VotingCategory::Ranked);
        let ballot = ranked(&[(1, Uuid::new_v4())]);

        let errors = validate_ballot(&f.ctx, &ballot).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, VoteError::InvalidEntry { .. })));
    }

    #[test]
    fn test_scoped_selection_must_match_entry_division() {
        let f = fixture(VotingCategory::Ranked);
        // entry_c has no division; claim it under the division scope
        let ballot = Ballot::Ranked(vec![RankedSelection {
            scope: BallotScope::Division(f.division),
            place: 1,
            entry_id: f.entry_c,
        }]);

        let errors = validate_ballot(&f.ctx, &ballot).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, VoteError::InvalidEntry { .. })));
    }

    #[test]
    fn test_per_scope_place_reuse_is_allowed() {
        let f = fixture(VotingCategory::Ranked);
        let other_division = Uuid::new_v4();
        let mut ctx = f.ctx;
        let entry_d = Uuid::new_v4();
        ctx.entries
            .insert(entry_d, fixture_entry(entry_d, 9, Some(other_division), None));

        let ballot = Ballot::Ranked(vec![
            RankedSelection {
                scope: BallotScope::Division(f.division),
                place: 1,
                entry_id: f.entry_a,
            },
            RankedSelection {
                scope: BallotScope::Division(other_division),
                place: 1,
                entry_id: entry_d,
            },
        ]);

        assert!(validate_ballot(&ctx, &ballot).is_ok());
    }

    #[test]
    fn test_self_vote_is_rejected_unless_allowed() {
        let f = fixture(VotingCategory::Ranked);
        let ballot = ranked(&[(1, f.own_entry)]);

        let errors = validate_ballot(&f.ctx, &ballot).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, VoteError::SelfVote { .. })));

        let mut f = fixture(VotingCategory::Ranked);
        f.ctx.config.allow_self_voting = true;
        let ballot = ranked(&[(1, f.own_entry)]);
        assert!(validate_ballot(&f.ctx, &ballot).is_ok());
    }

    #[test]
    fn test_closed_window_rejects_any_submission() {
        let mut f = fixture(VotingCategory::Ranked);
        f.ctx.config.voting_ends_at =
            Some(Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap());
        let ballot = ranked(&[(1, f.entry_a)]);

        let errors = validate_ballot(&f.ctx, &ballot).unwrap_err();
        assert!(errors.contains(&VoteError::VotingClosed));
    }

    #[test]
    fn test_repeat_vote_rejected_unless_changes_allowed() {
        let mut f = fixture(VotingCategory::Ranked);
        f.ctx.has_live_ballot = true;
        let ballot = ranked(&[(1, f.entry_a)]);

        let errors = validate_ballot(&f.ctx, &ballot).unwrap_err();
        assert!(errors.contains(&VoteError::AlreadyVoted));

        f.ctx.config.allow_vote_changes = true;
        assert!(validate_ballot(&f.ctx, &ballot).is_ok());
    }

    #[test]
    fn test_rating_bounds_enforced() {
        let f = fixture(VotingCategory::Rating);
        let ballot = Ballot::Rated(BTreeMap::from([
            (f.entry_a, Decimal::new(6, 0)),
            (f.entry_b, Decimal::new(3, 0)),
        ]));

        let errors = validate_ballot(&f.ctx, &ballot).unwrap_err();
        assert_eq!(
            errors,
            vec![VoteError::RatingOutOfRange {
                value: "6".to_string()
            }]
        );
    }

    #[test]
    fn test_approval_selection_cap_enforced() {
        let f = fixture(VotingCategory::Approval);
        let ballot = Ballot::Approval(BTreeSet::from([f.entry_a, f.entry_b, f.entry_c]));

        let errors = validate_ballot(&f.ctx, &ballot).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, VoteError::TooManySelections { max: 2 })));
    }

    #[test]
    fn test_weighted_allocation_caps_enforced() {
        let mut f = fixture(VotingCategory::Cumulative);
        f.ctx.config.max_votes_per_entry = Some(5);

        let over_per_entry = Ballot::Weighted(BTreeMap::from([(f.entry_a, Decimal::new(8, 0))]));
        let errors = validate_ballot(&f.ctx, &over_per_entry).unwrap_err();
        assert!(errors.contains(&VoteError::AllocationExceeded));

        let over_budget = Ballot::Weighted(BTreeMap::from([
            (f.entry_a, Decimal::new(5, 0)),
            (f.entry_b, Decimal::new(5, 0)),
            (f.entry_c, Decimal::new(5, 0)),
        ]));
        let errors = validate_ballot(&f.ctx, &over_budget).unwrap_err();
        assert!(errors.contains(&VoteError::AllocationExceeded));
    }

    #[test]
    fn test_violations_are_collected_not_fail_fast() {
        let mut f = fixture(VotingCategory::Ranked);
        f.ctx.has_live_ballot = true;
        // duplicate entry AND bad place AND repeat vote, all reported
        let ballot = ranked(&[(1, f.entry_a), (9, f.entry_a)]);

        let errors = validate_ballot(&f.ctx, &ballot).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, VoteError::DuplicateSelection { .. })));
        assert!(errors
            .iter()
            .any(|e| matches!(e, VoteError::InvalidPlace { place: 9 })));
        assert!(errors.contains(&VoteError::AlreadyVoted));
    }

    #[test]
    fn test_ballot_cap_on_total_selections() {
        let mut f = fixture(VotingCategory::Ranked);
        f.ctx.config.max_votes_per_user = Some(2);
        let ballot = ranked(&[(1, f.entry_a), (2, f.entry_b), (3, f.entry_c)]);

        let errors = validate_ballot(&f.ctx, &ballot).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, VoteError::TooManySelections { max: 2 })));
    }
}
