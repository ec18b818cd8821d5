use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::VoteError;
use crate::models::VotingCategory;

/// Scoping key of a ranked selection block on the wire: `default`,
/// `division:<uuid>` or `category:<uuid>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BallotScope {
    Default,
    Division(Uuid),
    Category(Uuid),
}

impl FromStr for BallotScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s == "default" {
            return Ok(Self::Default);
        }
        if let Some(id) = s.strip_prefix("division:") {
            let id = Uuid::parse_str(id).map_err(|_| format!("invalid division id in scope '{s}'"))?;
            return Ok(Self::Division(id));
        }
        if let Some(id) = s.strip_prefix("category:") {
            let id = Uuid::parse_str(id).map_err(|_| format!("invalid category id in scope '{s}'"))?;
            return Ok(Self::Category(id));
        }
        Err(format!("unknown ballot scope '{s}'"))
    }
}

impl fmt::Display for BallotScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Division(id) => write!(f, "division:{id}"),
            Self::Category(id) => write!(f, "category:{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedSelection {
    pub scope: BallotScope,
    pub place: i32,
    pub entry_id: Uuid,
}

/// One user's complete set of selections for one event, in the shape the
/// voting type's category dictates. Validation and scoring match on this
/// exhaustively instead of inspecting loose JSON keys.
#[derive(Debug, Clone, PartialEq)]
pub enum Ballot {
    Ranked(Vec<RankedSelection>),
    Rated(BTreeMap<Uuid, Decimal>),
    Approval(BTreeSet<Uuid>),
    Weighted(BTreeMap<Uuid, Decimal>),
}

impl Ballot {
    /// Interprets the wire `votes` payload according to the event's voting
    /// category. Shape errors are reported as `MalformedBallot`; business
    /// rules are left to the validator.
    pub fn from_wire(category: VotingCategory, votes: &serde_json::Value) -> Result<Self, VoteError> {
        match category {
            VotingCategory::Ranked => parse_ranked(votes),
            VotingCategory::Rating => Ok(Self::Rated(parse_entry_map(votes)?)),
            VotingCategory::Approval => parse_approval(votes),
            VotingCategory::Weighted | VotingCategory::Cumulative => {
                Ok(Self::Weighted(parse_entry_map(votes)?))
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Ranked(selections) => selections.is_empty(),
            Self::Rated(map) => map.is_empty(),
            Self::Approval(set) => set.is_empty(),
            Self::Weighted(map) => map.is_empty(),
        }
    }

    /// Every entry referenced by the ballot, in ballot order (ranked may
    /// repeat an entry; the validator rejects that).
    pub fn entry_ids(&self) -> Vec<Uuid> {
        match self {
            Self::Ranked(selections) => selections.iter().map(|s| s.entry_id).collect(),
            Self::Rated(map) => map.keys().copied().collect(),
            Self::Approval(set) => set.iter().copied().collect(),
            Self::Weighted(map) => map.keys().copied().collect(),
        }
    }
}

fn malformed(msg: impl Into<String>) -> VoteError {
    VoteError::MalformedBallot(msg.into())
}

fn parse_ranked(votes: &serde_json::Value) -> Result<Ballot, VoteError> {
    let map = votes
        .as_object()
        .ok_or_else(|| malformed("ranked ballot must be a JSON object"))?;
    if map.is_empty() {
        return Ok(Ballot::Ranked(Vec::new()));
    }

    let scoped = map.values().all(|v| v.is_object());
    let mut selections = Vec::new();

    if scoped {
        for (scope_key, block) in map {
            let scope: BallotScope = scope_key.parse().map_err(malformed)?;
            let block = block
                .as_object()
                .ok_or_else(|| malformed("ranked scope block must be a JSON object"))?;
            for (place_key, entry) in block {
                selections.push(RankedSelection {
                    scope,
                    place: parse_place(place_key)?,
                    entry_id: parse_entry_id(entry)?,
                });
            }
        }
    } else {
        for (place_key, entry) in map {
            selections.push(RankedSelection {
                scope: BallotScope::Default,
                place: parse_place(place_key)?,
                entry_id: parse_entry_id(entry)?,
            });
        }
    }

    Ok(Ballot::Ranked(selections))
}

fn parse_approval(votes: &serde_json::Value) -> Result<Ballot, VoteError> {
    match votes {
        serde_json::Value::Array(items) => {
            let mut set = BTreeSet::new();
            for item in items {
                set.insert(parse_entry_id(item)?);
            }
            Ok(Ballot::Approval(set))
        }
        serde_json::Value::Object(map) => {
            let mut set = BTreeSet::new();
            for (entry_key, marked) in map {
                let entry_id = Uuid::parse_str(entry_key)
                    .map_err(|_| malformed(format!("invalid entry id '{entry_key}'")))?;
                let marked = match marked {
                    serde_json::Value::Bool(b) => *b,
                    serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0) != 0.0,
                    _ => return Err(malformed("approval mark must be a boolean or number")),
                };
                if marked {
                    set.insert(entry_id);
                }
            }
            Ok(Ballot::Approval(set))
        }
        _ => Err(malformed("approval ballot must be an array or object of entries")),
    }
}

fn parse_entry_map(votes: &serde_json::Value) -> Result<BTreeMap<Uuid, Decimal>, VoteError> {
    let map = votes
        .as_object()
        .ok_or_else(|| malformed("ballot must be a JSON object keyed by entry id"))?;
    let mut parsed = BTreeMap::new();
    for (entry_key, value) in map {
        let entry_id = Uuid::parse_str(entry_key)
            .map_err(|_| malformed(format!("invalid entry id '{entry_key}'")))?;
        parsed.insert(entry_id, parse_decimal(value)?);
    }
    Ok(parsed)
}

fn parse_place(place_key: &str) -> Result<i32, VoteError> {
    place_key
        .parse::<i32>()
        .map_err(|_| malformed(format!("invalid place '{place_key}'")))
}

fn parse_entry_id(value: &serde_json::Value) -> Result<Uuid, VoteError> {
    let raw = value
        .as_str()
        .ok_or_else(|| malformed("entry id must be a string"))?;
    Uuid::parse_str(raw).map_err(|_| malformed(format!("invalid entry id '{raw}'")))
}

fn parse_decimal(value: &serde_json::Value) -> Result<Decimal, VoteError> {
    match value {
        serde_json::Value::Number(n) => Decimal::from_str(&n.to_string())
            .map_err(|_| malformed(format!("invalid numeric value '{n}'"))),
        serde_json::Value::String(s) => {
            Decimal::from_str(s).map_err(|_| malformed(format!("invalid numeric value '{s}'")))
        }
        _ => Err(malformed("value must be a number")),
    }
}

/// A selection after validation: resolved to the entry's own division and
/// category, with exactly one scoring input populated for the ballot's
/// category.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSelection {
    pub entry_id: Uuid,
    pub division_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub place: Option<i32>,
    pub rating: Option<Decimal>,
    pub allocated_points: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedBallot {
    pub category: VotingCategory,
    pub selections: Vec<NormalizedSelection>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ENTRY_A: &str = "11111111-1111-1111-1111-111111111111";
    const ENTRY_B: &str = "22222222-2222-2222-2222-222222222222";
    const DIVISION: &str = "33333333-3333-3333-3333-333333333333";

    #[test]
    fn test_scope_round_trip() {
        let scope: BallotScope = format!("division:{DIVISION}").parse().unwrap();
        assert_eq!(scope, BallotScope::Division(Uuid::parse_str(DIVISION).unwrap()));
        assert_eq!(scope.to_string().parse::<BallotScope>().unwrap(), scope);
        assert_eq!("default".parse::<BallotScope>().unwrap(), BallotScope::Default);
        assert!("divisions:xyz".parse::<BallotScope>().is_err());
    }

    #[test]
    fn test_parse_flat_ranked_ballot() {
        let votes = json!({ "1": ENTRY_A, "2": ENTRY_B });
        let ballot = Ballot::from_wire(VotingCategory::Ranked, &votes).unwrap();
        let Ballot::Ranked(selections) = ballot else {
            panic!("expected ranked ballot");
        };
        assert_eq!(selections.len(), 2);
        assert!(selections.iter().all(|s| s.scope == BallotScope::Default));
        let first = selections.iter().find(|s| s.place == 1).unwrap();
        assert_eq!(first.entry_id, Uuid::parse_str(ENTRY_A).unwrap());
    }

    #[test]
    fn test_parse_scoped_ranked_ballot() {
        let mut scoped = serde_json::Map::new();
        scoped.insert(format!("division:{DIVISION}"), json!({ "1": ENTRY_A }));
        let votes = serde_json::Value::Object(scoped);
        let ballot = Ballot::from_wire(VotingCategory::Ranked, &votes).unwrap();
        let Ballot::Ranked(selections) = ballot else {
            panic!("expected ranked ballot");
        };
        assert_eq!(selections.len(), 1);
        assert_eq!(
            selections[0].scope,
            BallotScope::Division(Uuid::parse_str(DIVISION).unwrap())
        );
    }

    #[test]
    fn test_parse_rated_ballot() {
        let votes = json!({ ENTRY_A: 4.5, ENTRY_B: "3" });
        let ballot = Ballot::from_wire(VotingCategory::Rating, &votes).unwrap();
        let Ballot::Rated(map) = ballot else {
            panic!("expected rated ballot");
        };
        assert_eq!(
            map[&Uuid::parse_str(ENTRY_A).unwrap()],
            Decimal::new(45, 1)
        );
        assert_eq!(map[&Uuid::parse_str(ENTRY_B).unwrap()], Decimal::new(3, 0));
    }

    #[test]
    fn test_parse_approval_array_and_map() {
        let from_array = Ballot::from_wire(VotingCategory::Approval, &json!([ENTRY_A, ENTRY_B])).unwrap();
        let from_map =
            Ballot::from_wire(VotingCategory::Approval, &json!({ ENTRY_A: true, ENTRY_B: 1 })).unwrap();
        assert_eq!(from_array, from_map);

        let unmarked = Ballot::from_wire(VotingCategory::Approval, &json!({ ENTRY_A: false })).unwrap();
        assert!(unmarked.is_empty());
    }

    #[test]
    fn test_malformed_payload_rejected() {
        let err = Ballot::from_wire(VotingCategory::Ranked, &json!([ENTRY_A])).unwrap_err();
        assert!(matches!(err, VoteError::MalformedBallot(_)));

        let err = Ballot::from_wire(VotingCategory::Ranked, &json!({ "first": ENTRY_A })).unwrap_err();
        assert!(matches!(err, VoteError::MalformedBallot(_)));

        let err = Ballot::from_wire(VotingCategory::Rating, &json!({ "not-a-uuid": 3 })).unwrap_err();
        assert!(matches!(err, VoteError::MalformedBallot(_)));
    }
}
