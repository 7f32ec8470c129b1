//! Attendance transitions between two versions of a roster.

use sahaya_data::Roster;

/// Members whose attendance changed with a roster edit.
/// Everybody else is unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterDiff {
    pub newly_absent: Roster,
    pub newly_present: Roster,
}

impl RosterDiff {
    /// Transitions from a stored absentee roster to an edited one.
    pub fn between(previous: &Roster, new: &Roster) -> Self {
        RosterDiff {
            newly_absent: new.difference(previous),
            newly_present: previous.difference(new),
        }
    }

    /// Transitions for a first-time event. Nobody was absent before;
    /// every member of the roster not marked absent counts as present.
    pub fn first(roster: &Roster, absent: &Roster) -> Self {
        RosterDiff {
            newly_absent: absent.clone(),
            newly_present: roster.difference(absent),
        }
    }

    /// Keep only transitions of members in the roster.
    pub fn restrict_to(&self, roster: &Roster) -> Self {
        RosterDiff {
            newly_absent: self.newly_absent.intersection(roster),
            newly_present: self.newly_present.intersection(roster),
        }
    }

    /// All members with a transition.
    pub fn affected(&self) -> Roster {
        self.newly_absent.union(&self.newly_present)
    }

    pub fn is_empty(&self) -> bool {
        self.newly_absent.is_empty() && self.newly_present.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use sahaya_data::MemberId;

    #[test]
    fn test_diff_between() {
        let previous = Roster::from(vec![1, 2, 3]);
        let new = Roster::from(vec![2, 3, 4, 5]);
        let diff = RosterDiff::between(&previous, &new);
        assert_eq!(diff.newly_absent, Roster::from(vec![4, 5]));
        assert_eq!(diff.newly_present, Roster::from(vec![1]));
        assert_eq!(diff.affected(), Roster::from(vec![1, 4, 5]));
    }

    #[test]
    fn test_same_roster_has_no_transitions() {
        let roster = Roster::from(vec![1, 2]);
        assert!(RosterDiff::between(&roster, &roster).is_empty());
    }

    #[test]
    fn test_first_event() {
        let active = Roster::from(vec![1, 2, 3, 4]);
        let absent = Roster::from(vec![2, 4]);
        let diff = RosterDiff::first(&active, &absent);
        assert_eq!(diff.newly_absent, Roster::from(vec![2, 4]));
        assert_eq!(diff.newly_present, Roster::from(vec![1, 3]));
    }

    #[test]
    fn test_restrict_to_roster() {
        let diff = RosterDiff::between(
            &Roster::from(vec![1, 9]),
            &Roster::from(vec![2, 8]),
        );
        let diff = diff.restrict_to(&Roster::from(vec![1, 2]));
        assert_eq!(diff.newly_absent, Roster::from(vec![2]));
        assert_eq!(diff.newly_present, Roster::from(vec![1]));
    }

    #[test]
    fn test_string_and_number_ids_compare_equal() {
        let stored: Roster = serde_json::from_str(r#"[7, 8]"#).unwrap();
        let edited: Roster = serde_json::from_str(r#"["7", "8"]"#).unwrap();
        assert!(RosterDiff::between(&stored, &edited).is_empty());

        let edited: Roster = serde_json::from_str(r#"["7"]"#).unwrap();
        let diff = RosterDiff::between(&stored, &edited);
        assert_eq!(diff.newly_present.to_vec(), vec![MemberId(8)]);
        assert!(diff.newly_absent.is_empty());
    }
}
