use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::Roster;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CommonWorkFilter {
    pub id: Option<u32>,
    pub date: Option<NaiveDate>,
}

/// Aggregate attendance of a communal work day. Always
/// recomputable from the absentee roster and the active members.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonWorkStats {
    pub total_members: u32,
    pub absent_count: u32,
    pub present_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize, Deserialize)]
pub struct CommonWork {
    pub id: u32,
    pub date: NaiveDate,
    pub title: String,
    #[sqlx(try_from = "String")]
    pub absents: Roster,
    pub total_members: u32,
    pub absent_count: u32,
    pub present_count: u32,
}

impl CommonWork {
    pub fn stats(&self) -> CommonWorkStats {
        CommonWorkStats {
            total_members: self.total_members,
            absent_count: self.absent_count,
            present_count: self.present_count,
        }
    }

    pub fn set_stats(&mut self, stats: CommonWorkStats) {
        self.total_members = stats.total_members;
        self.absent_count = stats.absent_count;
        self.present_count = stats.present_count;
    }
}
