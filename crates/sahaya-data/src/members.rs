use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{Fine, FineFilter, MemberId, ParseError, Query};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "kebab-case")]
#[sqlx(rename_all = "kebab-case")]
pub enum MemberStatus {
    #[default]
    Regular,
    /// Exempt from meeting, funeral and communal work fines.
    Free,
    /// Exempt from attendance fines.
    AttendanceFree,
    /// Not charged extra dues for funerals.
    FuneralFree,
}

impl MemberStatus {
    pub const ALL: [MemberStatus; 4] = [
        MemberStatus::Regular,
        MemberStatus::Free,
        MemberStatus::AttendanceFree,
        MemberStatus::FuneralFree,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MemberStatus::Regular => "regular",
            MemberStatus::Free => "free",
            MemberStatus::AttendanceFree => "attendance-free",
            MemberStatus::FuneralFree => "funeral-free",
        }
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for MemberStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseError::Unknown("member status", s.to_string()))
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Chairman,
    ViceChairman,
    Secretary,
    ViceSecretary,
    Treasurer,
    LoanTreasurer,
    SpeakerHandler,
    Auditor,
    AreaAdmin,
    AreaHelper,
}

impl Role {
    pub const ALL: [Role; 10] = [
        Role::Chairman,
        Role::ViceChairman,
        Role::Secretary,
        Role::ViceSecretary,
        Role::Treasurer,
        Role::LoanTreasurer,
        Role::SpeakerHandler,
        Role::Auditor,
        Role::AreaAdmin,
        Role::AreaHelper,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Chairman => "chairman",
            Role::ViceChairman => "vice-chairman",
            Role::Secretary => "secretary",
            Role::ViceSecretary => "vice-secretary",
            Role::Treasurer => "treasurer",
            Role::LoanTreasurer => "loan-treasurer",
            Role::SpeakerHandler => "speaker-handler",
            Role::Auditor => "auditor",
            Role::AreaAdmin => "area-admin",
            Role::AreaHelper => "area-helper",
        }
    }

    /// Officers do not pay funeral attendance fines, wherever
    /// the funeral is. The auditor is not an officer in this sense.
    pub fn is_officer(self) -> bool {
        match self {
            Role::Chairman
            | Role::ViceChairman
            | Role::Secretary
            | Role::ViceSecretary
            | Role::Treasurer
            | Role::LoanTreasurer
            | Role::SpeakerHandler => true,
            Role::Auditor | Role::AreaAdmin | Role::AreaHelper => false,
        }
    }

    /// Area administrators and their helpers; exempt only
    /// within their own area.
    pub fn administers_area(self) -> bool {
        match self {
            Role::AreaAdmin | Role::AreaHelper => true,
            Role::Chairman
            | Role::ViceChairman
            | Role::Secretary
            | Role::ViceSecretary
            | Role::Treasurer
            | Role::LoanTreasurer
            | Role::SpeakerHandler
            | Role::Auditor => false,
        }
    }

    /// Roles excused from communal work.
    pub fn is_privileged(self) -> bool {
        match self {
            Role::Chairman
            | Role::ViceChairman
            | Role::Secretary
            | Role::ViceSecretary
            | Role::Treasurer
            | Role::LoanTreasurer => true,
            Role::SpeakerHandler
            | Role::Auditor
            | Role::AreaAdmin
            | Role::AreaHelper => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| ParseError::Unknown("role", s.to_string()))
    }
}

/// Set of roles held by a member, stored as a JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roles(BTreeSet<Role>);

impl Roles {
    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn insert(&mut self, role: Role) -> bool {
        self.0.insert(role)
    }

    pub fn remove(&mut self, role: Role) -> bool {
        self.0.remove(&role)
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Role> for Roles {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Roles(iter.into_iter().collect())
    }
}

impl fmt::Display for Roles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let roles: Vec<&str> = self.iter().map(Role::as_str).collect();
        f.pad(&roles.join(", "))
    }
}

impl TryFrom<String> for Roles {
    type Error = serde_json::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().is_empty() {
            return Ok(Roles::default());
        }
        serde_json::from_str(&value)
    }
}

impl From<&Roles> for String {
    fn from(roles: &Roles) -> Self {
        let roles: Vec<String> =
            roles.iter().map(|r| format!("\"{}\"", r.as_str())).collect();
        format!("[{}]", roles.join(","))
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MemberFilter {
    pub id: Option<MemberId>,
    pub ids: Option<Vec<MemberId>>,
    pub name: Option<String>,
    pub area: Option<String>,
    /// Only members without (true) or with (false) a deactivation date.
    pub active: Option<bool>,
    pub exclude_status: Vec<MemberStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub area: String,
    pub status: MemberStatus,
    #[sqlx(try_from = "String")]
    pub roles: Roles,
    /// Consecutive meeting absences. Maintained by the
    /// reconciliation engine only.
    pub meeting_absents: u32,
    pub deactivated_at: Option<NaiveDateTime>,
}

impl Member {
    pub fn is_active(&self) -> bool {
        self.deactivated_at.is_none()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(role)
    }

    /// Get the fine ledger of a member
    pub async fn get_fines<DB>(&self, db: &DB) -> Result<Vec<Fine>>
    where
        DB: Query<Fine, Filter = FineFilter>,
    {
        let fines = db
            .query(&FineFilter {
                member_id: Some(self.id),
                ..Default::default()
            })
            .await?;
        Ok(fines)
    }
}
