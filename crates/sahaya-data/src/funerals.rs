use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{MemberId, Roster};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct FuneralFilter {
    pub id: Option<u32>,
    pub date: Option<NaiveDate>,
    pub member_id: Option<MemberId>,
}

/// A funeral with its assignments and its three independent
/// absentee rosters.
#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Funeral {
    pub id: u32,
    pub date: NaiveDate,
    /// The member reporting the death.
    #[serde(rename = "member_id")]
    pub member_id: MemberId,
    /// Set when the deceased was a member.
    #[serde(rename = "deceased_id")]
    pub deceased_id: Option<MemberId>,
    #[sqlx(try_from = "String")]
    #[serde(with = "crate::roster::assignment_list")]
    pub cemetery_assignments: Roster,
    #[sqlx(try_from = "String")]
    #[serde(with = "crate::roster::assignment_list")]
    pub funeral_assignments: Roster,
    #[sqlx(try_from = "String")]
    #[serde(with = "crate::roster::assignment_list")]
    pub removed_members: Roster,
    /// Attendance roster.
    #[sqlx(try_from = "String")]
    pub event_absents: Roster,
    #[sqlx(try_from = "String")]
    pub funeral_work_absents: Roster,
    #[sqlx(try_from = "String")]
    pub cemetery_work_absents: Roster,
    pub extra_due: Option<i64>,
}

impl Funeral {
    pub fn is_assigned(&self, id: MemberId) -> bool {
        self.cemetery_assignments.contains(id) || self.funeral_assignments.contains(id)
    }

    pub fn is_removed(&self, id: MemberId) -> bool {
        self.removed_members.contains(id)
    }
}
