//! Funeral rosters.
//!
//! A funeral carries three rosters, reconciled independently:
//! attendance (`funeral` fines) and the two work duties
//! (`funeral-work` and `cemetery-work` fines). A work fine always
//! replaces an attendance fine for the same funeral; losing the
//! work fine does not bring the attendance fine back.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use sahaya_data::{
    Assignment, Fine, FineFilter, FineKind, Funeral, Insert, MemberFilter, MemberId,
    MemberStatus, Roster, Update,
};

use crate::{
    diff::RosterDiff,
    eligibility::{self, EventContext},
    ledger,
    settings::SettingsCache,
    store,
    ReconcileError,
    Result,
    Store,
};

/// A newly reported funeral.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFuneral {
    pub date: Option<NaiveDate>,
    #[serde(rename = "member_id")]
    pub member_id: Option<MemberId>,
    #[serde(rename = "deceased_id")]
    pub deceased_id: Option<MemberId>,
    #[serde(default)]
    pub cemetery_assignments: Vec<Assignment>,
    #[serde(default)]
    pub funeral_assignments: Vec<Assignment>,
    #[serde(default)]
    pub removed_members: Vec<Assignment>,
}

/// Register a funeral. The reporting member must exist.
#[instrument(skip_all)]
pub async fn create_funeral<DB: Store>(db: &DB, funeral: NewFuneral) -> Result<Funeral> {
    let date = funeral.date.ok_or(ReconcileError::MissingField("date"))?;
    let member_id = funeral.member_id.ok_or(ReconcileError::MissingField("member_id"))?;
    if store::find_member(db, member_id).await?.is_none() {
        return Err(ReconcileError::not_found("member", member_id));
    }

    let funeral = Insert::<Funeral>::insert(db, Funeral {
        date,
        member_id,
        deceased_id: funeral.deceased_id,
        cemetery_assignments: funeral.cemetery_assignments.into_iter().collect(),
        funeral_assignments: funeral.funeral_assignments.into_iter().collect(),
        removed_members: funeral.removed_members.into_iter().collect(),
        ..Default::default()
    })
    .await?;
    info!(funeral_id = funeral.id, %date, %member_id, "registered funeral");
    Ok(funeral)
}

/// Attendance roster of a funeral.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FuneralAttendance {
    pub funeral_id: Option<u32>,
    #[serde(rename = "absentArray")]
    pub absents: Option<Roster>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceReport {
    pub fines_added: u64,
    pub fines_removed: u64,
    pub excluded_from_fines: u64,
    pub excluded_due_to_work_fines: u64,
}

/// Save the attendance roster of a funeral and reconcile
/// attendance fines.
#[instrument(skip_all)]
pub async fn record_attendance<DB: Store>(
    db: &DB,
    settings: &SettingsCache,
    attendance: FuneralAttendance,
) -> Result<AttendanceReport> {
    let funeral_id = attendance.funeral_id.ok_or(ReconcileError::MissingField("funeral_id"))?;
    let absents = attendance.absents.ok_or(ReconcileError::MissingField("absentArray"))?;
    let mut funeral = store::find_funeral(db, funeral_id).await?;

    let mut report = AttendanceReport::default();
    let diff = RosterDiff::between(&funeral.event_absents, &absents);
    if diff.is_empty() {
        return Ok(report);
    }
    let amount = settings.amount(db, FineKind::Funeral).await?;
    funeral.event_absents = absents;
    let funeral = Update::<Funeral>::update(db, funeral).await?;

    let area = funeral_area(db, &funeral).await?;
    let context = EventContext::FuneralAttendance {
        funeral: &funeral,
        area: area.as_deref(),
    };

    for member in store::resolve_members(db, &diff.newly_absent).await? {
        if eligibility::is_exempt(&context, &member) {
            report.excluded_from_fines += 1;
            continue;
        }
        match ledger::has_work_fine(db, member.id, funeral.id).await {
            Ok(true) => {
                report.excluded_due_to_work_fines += 1;
                continue;
            }
            Ok(false) => {}
            Err(err) => {
                error!(member_id = %member.id, funeral_id, "work fine lookup failed: {}", err);
                continue;
            }
        }
        let fine = Fine::new(member.id, funeral.id, FineKind::Funeral, amount, funeral.date);
        match ledger::apply_fine(db, fine).await {
            Ok(applied) if applied.inserted => report.fines_added += 1,
            Ok(_) => {}
            Err(err) => error!(member_id = %member.id, funeral_id, "fine not applied: {}", err),
        }
    }

    for member_id in diff.newly_present.iter() {
        match ledger::remove_fine(db, member_id, funeral.id, FineKind::Funeral).await {
            Ok(removed) => report.fines_removed += removed,
            Err(err) => error!(%member_id, funeral_id, "fine not removed: {}", err),
        }
    }

    info!(
        funeral_id,
        fines_added = report.fines_added,
        fines_removed = report.fines_removed,
        excluded = report.excluded_from_fines,
        excluded_work = report.excluded_due_to_work_fines,
        "recorded funeral attendance",
    );
    Ok(report)
}

/// Area of the deceased if they were a member, otherwise the
/// area of the reporting member.
async fn funeral_area<DB: Store>(db: &DB, funeral: &Funeral) -> Result<Option<String>> {
    if let Some(deceased_id) = funeral.deceased_id {
        if let Some(deceased) = store::find_member(db, deceased_id).await? {
            return Ok(Some(deceased.area).filter(|area| !area.is_empty()));
        }
    }
    let reporter = store::find_member(db, funeral.member_id).await?;
    Ok(reporter.map(|member| member.area).filter(|area| !area.is_empty()))
}

/// Work rosters of a funeral. A missing roster is left as stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuneralWorkRoster {
    pub funeral_id: Option<u32>,
    pub funeral_work_absents: Option<Roster>,
    pub cemetery_work_absents: Option<Roster>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkCount {
    pub added: u64,
    pub removed: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkReport {
    pub funeral_work: WorkCount,
    pub cemetery_work: WorkCount,
    /// Attendance fines replaced by work fines.
    pub event_fines_removed: u64,
}

/// Save the work rosters of a funeral and reconcile work fines.
#[instrument(skip_all)]
pub async fn record_work<DB: Store>(
    db: &DB,
    settings: &SettingsCache,
    work: FuneralWorkRoster,
) -> Result<WorkReport> {
    let funeral_id = work.funeral_id.ok_or(ReconcileError::MissingField("funeralId"))?;
    if work.funeral_work_absents.is_none() && work.cemetery_work_absents.is_none() {
        return Err(ReconcileError::MissingField("funeralWorkAbsents"));
    }
    let mut funeral = store::find_funeral(db, funeral_id).await?;

    let funeral_work = work
        .funeral_work_absents
        .unwrap_or_else(|| funeral.funeral_work_absents.clone());
    let cemetery_work = work
        .cemetery_work_absents
        .unwrap_or_else(|| funeral.cemetery_work_absents.clone());
    let funeral_diff = RosterDiff::between(&funeral.funeral_work_absents, &funeral_work);
    let cemetery_diff = RosterDiff::between(&funeral.cemetery_work_absents, &cemetery_work);

    let mut report = WorkReport::default();
    if funeral_diff.is_empty() && cemetery_diff.is_empty() {
        return Ok(report);
    }
    let funeral_work_fine = settings.amount(db, FineKind::FuneralWork).await?;
    let cemetery_work_fine = settings.amount(db, FineKind::CemeteryWork).await?;
    funeral.funeral_work_absents = funeral_work;
    funeral.cemetery_work_absents = cemetery_work;
    let funeral = Update::<Funeral>::update(db, funeral).await?;

    let (count, superseded) = reconcile_work(
        db,
        &funeral,
        FineKind::FuneralWork,
        funeral_work_fine,
        &funeral_diff,
    )
    .await?;
    report.funeral_work = count;
    report.event_fines_removed += superseded;

    let (count, superseded) = reconcile_work(
        db,
        &funeral,
        FineKind::CemeteryWork,
        cemetery_work_fine,
        &cemetery_diff,
    )
    .await?;
    report.cemetery_work = count;
    report.event_fines_removed += superseded;

    info!(
        funeral_id,
        funeral_work_added = report.funeral_work.added,
        funeral_work_removed = report.funeral_work.removed,
        cemetery_work_added = report.cemetery_work.added,
        cemetery_work_removed = report.cemetery_work.removed,
        event_fines_removed = report.event_fines_removed,
        "recorded funeral work",
    );
    Ok(report)
}

async fn reconcile_work<DB: Store>(
    db: &DB,
    funeral: &Funeral,
    kind: FineKind,
    amount: i64,
    diff: &RosterDiff,
) -> Result<(WorkCount, u64)> {
    let mut count = WorkCount::default();
    let mut superseded = 0;

    for member in store::resolve_members(db, &diff.newly_absent).await? {
        if eligibility::is_exempt(&EventContext::FuneralWork, &member) {
            continue;
        }
        let fine = Fine::new(member.id, funeral.id, kind, amount, funeral.date);
        match ledger::apply_fine(db, fine).await {
            Ok(applied) => {
                if applied.inserted {
                    count.added += 1;
                }
                superseded += applied.superseded;
            }
            Err(err) => error!(member_id = %member.id, funeral_id = funeral.id, %kind, "fine not applied: {}", err),
        }
    }
    for member_id in diff.newly_present.iter() {
        match ledger::remove_fine(db, member_id, funeral.id, kind).await {
            Ok(removed) => count.removed += removed,
            Err(err) => error!(%member_id, funeral_id = funeral.id, %kind, "fine not removed: {}", err),
        }
    }
    Ok((count, superseded))
}

/// An extra contribution levied on the members for a funeral.
/// `amount: null` clears the levy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraDue {
    pub funeral_id: Option<u32>,
    pub amount: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraDueReport {
    pub fines_added: u64,
    pub fines_removed: u64,
}

/// Levy (or change, or clear) the extra due of a funeral.
///
/// Every active member pays it except the reporting member and
/// members with status `funeral-free`. A changed amount replaces
/// the existing extra due fines.
#[instrument(skip_all)]
pub async fn levy_extra_due<DB: Store>(db: &DB, levy: ExtraDue) -> Result<ExtraDueReport> {
    let funeral_id = levy.funeral_id.ok_or(ReconcileError::MissingField("funeralId"))?;
    if let Some(amount) = levy.amount {
        if amount <= 0 {
            return Err(ReconcileError::Invalid(format!(
                "extra due must be positive, got {}",
                amount
            )));
        }
    }
    let mut funeral = store::find_funeral(db, funeral_id).await?;

    let mut report = ExtraDueReport::default();
    if funeral.extra_due == levy.amount {
        return Ok(report);
    }
    if funeral.extra_due.is_some() {
        let filter = FineFilter {
            event_id: Some(funeral.id),
            kind: Some(FineKind::ExtraDue),
            ..Default::default()
        };
        report.fines_removed = db.pull(&filter).await?;
    }
    funeral.extra_due = levy.amount;
    let funeral = Update::<Funeral>::update(db, funeral).await?;

    if let Some(amount) = funeral.extra_due {
        let members = store::members(db, MemberFilter {
            active: Some(true),
            exclude_status: vec![MemberStatus::FuneralFree],
            ..Default::default()
        })
        .await?;
        for member in members.iter().filter(|member| member.id != funeral.member_id) {
            let fine = Fine::new(member.id, funeral.id, FineKind::ExtraDue, amount, funeral.date);
            match ledger::apply_fine(db, fine).await {
                Ok(applied) if applied.inserted => report.fines_added += 1,
                Ok(_) => {}
                Err(err) => error!(member_id = %member.id, funeral_id, "extra due not applied: {}", err),
            }
        }
    }

    info!(
        funeral_id,
        amount = ?funeral.extra_due,
        fines_added = report.fines_added,
        fines_removed = report.fines_removed,
        "levied extra due",
    );
    Ok(report)
}
