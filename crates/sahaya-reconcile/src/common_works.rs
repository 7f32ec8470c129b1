use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use sahaya_data::{
    CommonWork, CommonWorkFilter, CommonWorkStats, Fine, FineKind, Insert, MemberFilter, Roster,
    Update,
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

/// Absentee roster of the communal work held on a date.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommonWorkRoster {
    pub date: Option<NaiveDate>,
    pub title: Option<String>,
    #[serde(rename = "absentArray")]
    pub absents: Option<Roster>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonWorkReport {
    pub common_work_id: u32,
    pub created: bool,
    pub fines_added: u64,
    pub fines_removed: u64,
    pub stats: CommonWorkStats,
}

/// Attendance totals over the active members.
pub fn stats(active: &Roster, absents: &Roster) -> CommonWorkStats {
    let total_members = active.len() as u32;
    let absent_count = absents.intersection(active).len() as u32;
    CommonWorkStats {
        total_members,
        absent_count,
        present_count: total_members - absent_count,
    }
}

/// Save the absentee roster of a communal work day, creating it
/// on first use of the date, and reconcile common work fines.
#[instrument(skip_all)]
pub async fn record_common_work<DB: Store>(
    db: &DB,
    settings: &SettingsCache,
    roster: CommonWorkRoster,
) -> Result<CommonWorkReport> {
    let date = roster.date.ok_or(ReconcileError::MissingField("date"))?;
    let absents = roster.absents.ok_or(ReconcileError::MissingField("absentArray"))?;

    let active: Roster = store::members(db, MemberFilter {
        active: Some(true),
        ..Default::default()
    })
    .await?
    .iter()
    .map(|member| member.id)
    .collect();
    let stats = stats(&active, &absents);

    let existing = store::common_works(db, CommonWorkFilter {
        date: Some(date),
        ..Default::default()
    })
    .await?
    .pop();

    let (work, previous, created) = match existing {
        None => {
            let title = roster.title.ok_or(ReconcileError::MissingField("title"))?;
            let mut work = CommonWork {
                date,
                title,
                absents,
                ..Default::default()
            };
            work.set_stats(stats);
            let work = Insert::<CommonWork>::insert(db, work).await?;
            (work, Roster::new(), true)
        }
        Some(mut work) => {
            let previous = std::mem::replace(&mut work.absents, absents);
            if let Some(title) = roster.title {
                work.title = title;
            }
            work.set_stats(stats);
            let work = Update::<CommonWork>::update(db, work).await?;
            (work, previous, false)
        }
    };

    let mut report = CommonWorkReport {
        common_work_id: work.id,
        created,
        stats: work.stats(),
        ..Default::default()
    };
    let diff = RosterDiff::between(&previous, &work.absents);
    let amount = if diff.newly_absent.is_empty() {
        0
    } else {
        settings.amount(db, FineKind::CommonWork).await?
    };

    for member in store::resolve_members(db, &diff.newly_absent).await? {
        if eligibility::is_exempt(&EventContext::CommonWork, &member) {
            continue;
        }
        let fine = Fine::new(member.id, work.id, FineKind::CommonWork, amount, work.date);
        match ledger::apply_fine(db, fine).await {
            Ok(applied) if applied.inserted => report.fines_added += 1,
            Ok(_) => {}
            Err(err) => error!(member_id = %member.id, common_work_id = work.id, "fine not applied: {}", err),
        }
    }
    for member_id in diff.newly_present.iter() {
        match ledger::remove_fine(db, member_id, work.id, FineKind::CommonWork).await {
            Ok(removed) => report.fines_removed += removed,
            Err(err) => error!(%member_id, common_work_id = work.id, "fine not removed: {}", err),
        }
    }

    info!(
        %date,
        common_work_id = work.id,
        created,
        fines_added = report.fines_added,
        fines_removed = report.fines_removed,
        "recorded common work",
    );
    Ok(report)
}
