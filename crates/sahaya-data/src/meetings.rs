use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::Roster;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MeetingFilter {
    pub id: Option<u32>,
    pub date: Option<NaiveDate>,
    pub date_after: Option<NaiveDate>,
    pub date_before: Option<NaiveDate>,
}

/// A general meeting and the members absent from it.
/// Queries return meetings ordered by date.
#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Meeting {
    pub id: u32,
    pub date: NaiveDate,
    #[sqlx(try_from = "String")]
    pub absents: Roster,
}
