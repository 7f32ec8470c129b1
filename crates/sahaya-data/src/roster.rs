use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid member id: {0:?}")]
    MemberId(String),
    #[error("unknown {0}: {1:?}")]
    Unknown(&'static str, String),
}

/// Member number as assigned by the society.
///
/// Rosters reach us both as JSON numbers and as numeric strings;
/// everything is normalized into this type before any set
/// operation happens.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct MemberId(pub u32);

impl From<u32> for MemberId {
    fn from(id: u32) -> Self {
        MemberId(id)
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for MemberId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(MemberId)
            .map_err(|_| ParseError::MemberId(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for MemberId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u32),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(id) => Ok(MemberId(id)),
            Raw::Text(text) => text.parse().map_err(de::Error::custom),
        }
    }
}

/// A `{ "member_id": n }` entry of an assignment list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub member_id: MemberId,
}

/// An ordered set of member ids: absentee lists, assignment
/// lists and the active member roster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster(BTreeSet<MemberId>);

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: MemberId) -> bool {
        self.0.contains(&id)
    }

    pub fn insert(&mut self, id: MemberId) -> bool {
        self.0.insert(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = MemberId> + '_ {
        self.0.iter().copied()
    }

    /// Members in self but not in other.
    pub fn difference(&self, other: &Roster) -> Roster {
        self.0.difference(&other.0).copied().collect()
    }

    pub fn intersection(&self, other: &Roster) -> Roster {
        self.0.intersection(&other.0).copied().collect()
    }

    pub fn union(&self, other: &Roster) -> Roster {
        self.0.union(&other.0).copied().collect()
    }

    pub fn to_vec(&self) -> Vec<MemberId> {
        self.iter().collect()
    }

    /// Assignment list representation.
    pub fn assignments(&self) -> Vec<Assignment> {
        self.iter().map(|member_id| Assignment { member_id }).collect()
    }
}

impl FromIterator<MemberId> for Roster {
    fn from_iter<I: IntoIterator<Item = MemberId>>(iter: I) -> Self {
        Roster(iter.into_iter().collect())
    }
}

impl FromIterator<Assignment> for Roster {
    fn from_iter<I: IntoIterator<Item = Assignment>>(iter: I) -> Self {
        Roster(iter.into_iter().map(|a| a.member_id).collect())
    }
}

impl From<Vec<MemberId>> for Roster {
    fn from(ids: Vec<MemberId>) -> Self {
        ids.into_iter().collect()
    }
}

impl From<Vec<u32>> for Roster {
    fn from(ids: Vec<u32>) -> Self {
        ids.into_iter().map(MemberId).collect()
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = MemberId;
    type IntoIter = std::iter::Copied<std::collections::btree_set::Iter<'a, MemberId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}

/// Serde adapter writing a roster as a `[{ "member_id": n }]` list.
pub mod assignment_list {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{Assignment, Roster};

    pub fn serialize<S: Serializer>(roster: &Roster, serializer: S) -> Result<S::Ok, S::Error> {
        roster.assignments().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Roster, D::Error> {
        let assignments = Vec::<Assignment>::deserialize(deserializer)?;
        Ok(assignments.into_iter().collect())
    }
}

/// Rosters are stored as JSON arrays of numbers.
impl TryFrom<String> for Roster {
    type Error = serde_json::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().is_empty() {
            return Ok(Roster::default());
        }
        serde_json::from_str(&value)
    }
}

impl From<&Roster> for String {
    fn from(roster: &Roster) -> Self {
        let ids: Vec<String> = roster.iter().map(|id| id.to_string()).collect();
        format!("[{}]", ids.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_id_from_number_or_string() {
        let ids: Vec<MemberId> =
            serde_json::from_str(r#"[7, "7", " 12 "]"#).unwrap();
        assert_eq!(ids, vec![MemberId(7), MemberId(7), MemberId(12)]);

        let err = serde_json::from_str::<MemberId>(r#""seven""#);
        assert!(err.is_err());
    }

    #[test]
    fn test_roster_normalizes_mixed_ids() {
        let roster: Roster =
            serde_json::from_str(r#"[3, "3", 1, "2"]"#).unwrap();
        assert_eq!(roster.len(), 3);
        assert_eq!(roster.to_vec(), vec![MemberId(1), MemberId(2), MemberId(3)]);
    }

    #[test]
    fn test_roster_storage_format() {
        let roster = Roster::from(vec![5, 1, 3]);
        let stored: String = (&roster).into();
        assert_eq!(stored, "[1,3,5]");
        assert_eq!(Roster::try_from(stored).unwrap(), roster);
        assert_eq!(Roster::try_from(String::new()).unwrap(), Roster::new());
    }

    #[test]
    fn test_roster_from_assignments() {
        let assignments: Vec<Assignment> =
            serde_json::from_str(r#"[{"member_id": 5}, {"member_id": "9"}]"#)
                .unwrap();
        let roster: Roster = assignments.into_iter().collect();
        assert!(roster.contains(MemberId(5)));
        assert!(roster.contains(MemberId(9)));
    }

    #[test]
    fn test_roster_set_operations() {
        let a = Roster::from(vec![1, 2, 3]);
        let b = Roster::from(vec![2, 3, 4]);
        assert_eq!(a.difference(&b), Roster::from(vec![1]));
        assert_eq!(a.intersection(&b), Roster::from(vec![2, 3]));
        assert_eq!(a.union(&b), Roster::from(vec![1, 2, 3, 4]));
    }
}
