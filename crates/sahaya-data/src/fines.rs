use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{MemberId, ParseError};

/// What a fine was levied for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "kebab-case")]
#[sqlx(rename_all = "kebab-case")]
pub enum FineKind {
    /// Every third consecutive meeting absence.
    Meeting,
    /// Absent from a funeral.
    Funeral,
    /// Absent from assigned funeral work.
    FuneralWork,
    /// Absent from assigned cemetery work.
    CemeteryWork,
    /// Absent from communal work.
    CommonWork,
    /// Extra contribution levied for a funeral.
    #[serde(rename = "extraDue")]
    #[sqlx(rename = "extraDue")]
    ExtraDue,
}

impl FineKind {
    pub const ALL: [FineKind; 6] = [
        FineKind::Meeting,
        FineKind::Funeral,
        FineKind::FuneralWork,
        FineKind::CemeteryWork,
        FineKind::CommonWork,
        FineKind::ExtraDue,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FineKind::Meeting => "meeting",
            FineKind::Funeral => "funeral",
            FineKind::FuneralWork => "funeral-work",
            FineKind::CemeteryWork => "cemetery-work",
            FineKind::CommonWork => "common-work",
            FineKind::ExtraDue => "extraDue",
        }
    }

    /// Work fines supersede a funeral attendance fine.
    pub fn is_work(self) -> bool {
        match self {
            FineKind::FuneralWork | FineKind::CemeteryWork => true,
            FineKind::Meeting
            | FineKind::Funeral
            | FineKind::CommonWork
            | FineKind::ExtraDue => false,
        }
    }
}

impl fmt::Display for FineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for FineKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseError::Unknown("fine kind", s.to_string()))
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct FineFilter {
    pub member_id: Option<MemberId>,
    pub member_ids: Option<Vec<MemberId>>,
    pub event_id: Option<u32>,
    /// Skip fines attached to this event.
    pub except_event_id: Option<u32>,
    pub kind: Option<FineKind>,
}

impl FineFilter {
    /// Filter matching exactly one (member, event, kind) tuple.
    pub fn tuple(member_id: MemberId, event_id: u32, kind: FineKind) -> Self {
        FineFilter {
            member_id: Some(member_id),
            event_id: Some(event_id),
            kind: Some(kind),
            ..Default::default()
        }
    }
}

/// A monetary penalty on a member's ledger. At most one fine
/// exists per (member, event, kind).
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Fine {
    #[serde(default)]
    pub id: u32,
    pub member_id: MemberId,
    #[serde(rename = "eventId")]
    pub event_id: u32,
    #[serde(rename = "eventType")]
    pub kind: FineKind,
    pub amount: i64,
    pub date: NaiveDate,
}

impl Fine {
    pub fn new(
        member_id: MemberId,
        event_id: u32,
        kind: FineKind,
        amount: i64,
        date: NaiveDate,
    ) -> Self {
        Fine {
            id: 0,
            member_id,
            event_id,
            kind,
            amount,
            date,
        }
    }

    pub fn key(&self) -> (MemberId, u32, FineKind) {
        (self.member_id, self.event_id, self.kind)
    }
}
