use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use sahaya_data::{
    FineFilter, FineKind, Insert, Meeting, MeetingFilter, MemberFilter, MemberId, Roster, Update,
};

use crate::{
    counter,
    diff::RosterDiff,
    eligibility::MEETING_EXEMPT_STATUS,
    recalculation,
    store,
    ReconcileError,
    Result,
    Store,
};

/// Absentee roster of the meeting held on a date.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeetingRoster {
    pub date: Option<NaiveDate>,
    #[serde(rename = "absentArray")]
    pub absents: Option<Roster>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingReport {
    pub meeting_id: u32,
    pub created: bool,
    pub fines_added: u64,
    pub fines_removed: u64,
}

/// Save the absentee roster of a meeting and reconcile absence
/// runs and meeting fines.
///
/// The first roster of a date creates the meeting. Later rosters
/// for the same date edit it and replay the history of every
/// member whose attendance changed.
#[instrument(skip_all)]
pub async fn record_meeting<DB: Store>(db: &DB, roster: MeetingRoster) -> Result<MeetingReport> {
    let date = roster.date.ok_or(ReconcileError::MissingField("date"))?;
    let absents = roster.absents.ok_or(ReconcileError::MissingField("absentArray"))?;

    let active = active_roster(db).await?;
    let existing = store::meetings(db, MeetingFilter {
        date: Some(date),
        ..Default::default()
    })
    .await?
    .pop();

    let report = match existing {
        None => create(db, date, absents, &active).await?,
        Some(meeting) => edit(db, meeting, absents, &active).await?,
    };
    info!(
        %date,
        meeting_id = report.meeting_id,
        created = report.created,
        fines_added = report.fines_added,
        fines_removed = report.fines_removed,
        "recorded meeting",
    );
    Ok(report)
}

/// Members expected at meetings.
pub async fn active_roster<DB: Store>(db: &DB) -> Result<Roster> {
    let members = store::members(db, MemberFilter {
        active: Some(true),
        exclude_status: MEETING_EXEMPT_STATUS.to_vec(),
        ..Default::default()
    })
    .await?;
    Ok(members.iter().map(|member| member.id).collect())
}

async fn create<DB: Store>(
    db: &DB,
    date: NaiveDate,
    absents: Roster,
    active: &Roster,
) -> Result<MeetingReport> {
    let meeting = Insert::<Meeting>::insert(db, Meeting {
        id: 0,
        date,
        absents,
    })
    .await?;
    let diff = RosterDiff::first(active, &meeting.absents).restrict_to(active);
    let fines_added = register_transitions(db, &meeting, &diff).await;

    Ok(MeetingReport {
        meeting_id: meeting.id,
        created: true,
        fines_added,
        fines_removed: 0,
    })
}

async fn edit<DB: Store>(
    db: &DB,
    mut meeting: Meeting,
    absents: Roster,
    active: &Roster,
) -> Result<MeetingReport> {
    let mut report = MeetingReport {
        meeting_id: meeting.id,
        ..Default::default()
    };
    if meeting.absents == absents {
        return Ok(report);
    }
    let diff = RosterDiff::between(&meeting.absents, &absents).restrict_to(active);
    meeting.absents = absents;
    let meeting = Update::<Meeting>::update(db, meeting).await?;
    if diff.is_empty() {
        return Ok(report);
    }

    let affected = diff.affected();
    let before = meeting_fines(db, &affected).await?;
    register_transitions(db, &meeting, &diff).await;
    recalculation::recalculate(db, &meeting, &diff).await?;
    let after = meeting_fines(db, &affected).await?;

    report.fines_added = after.difference(&before).count() as u64;
    report.fines_removed = before.difference(&after).count() as u64;
    Ok(report)
}

/// Run the absence counter for every transition. Returns the
/// number of fines added.
async fn register_transitions<DB: Store>(db: &DB, meeting: &Meeting, diff: &RosterDiff) -> u64 {
    let mut added = 0;
    for member_id in diff.newly_absent.iter() {
        match counter::register_absence(db, member_id, meeting).await {
            Ok(true) => added += 1,
            Ok(false) => {}
            Err(err) => error!(%member_id, meeting_id = meeting.id, "absence not counted: {}", err),
        }
    }
    for member_id in diff.newly_present.iter() {
        if let Err(err) = counter::register_presence(db, member_id).await {
            error!(%member_id, meeting_id = meeting.id, "presence not counted: {}", err);
        }
    }
    added
}

async fn meeting_fines<DB: Store>(db: &DB, members: &Roster) -> Result<BTreeSet<(MemberId, u32)>> {
    let fines = store::fines(db, FineFilter {
        member_ids: Some(members.to_vec()),
        kind: Some(FineKind::Meeting),
        ..Default::default()
    })
    .await?;
    Ok(fines.iter().map(|fine| (fine.member_id, fine.event_id)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    use sahaya_data::{Fine, Member, MemberStatus};

    use crate::testing::{
        add_member, day, fines_of, member, members, open, Connection, FailingMember,
    };

    fn roster(date: NaiveDate, absents: Vec<u32>) -> MeetingRoster {
        MeetingRoster {
            date: Some(date),
            absents: Some(Roster::from(absents)),
        }
    }

    async fn meeting_fines_of(db: &Connection, id: MemberId) -> Vec<Fine> {
        fines_of(db, id)
            .await
            .into_iter()
            .filter(|fine| fine.kind == FineKind::Meeting)
            .collect()
    }

    #[tokio::test]
    async fn test_missing_fields() {
        let db = open().await;
        let err = record_meeting(&db, MeetingRoster {
            date: None,
            absents: Some(Roster::new()),
        }).await.unwrap_err();
        assert!(matches!(err, ReconcileError::MissingField("date")));

        let err = record_meeting(&db, MeetingRoster {
            date: Some(day(2024, 1, 1)),
            absents: None,
        }).await.unwrap_err();
        assert!(matches!(err, ReconcileError::MissingField("absentArray")));
        assert!(store::meetings(&db, MeetingFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_consecutive_absences_fined_once() {
        let db = open().await;
        let [m, n] = members(&db, [1, 2]).await;

        for month in 1..=3 {
            let report = record_meeting(&db, roster(day(2024, month, 1), vec![1])).await.unwrap();
            assert!(report.created);
            assert_eq!(report.fines_added, if month == 3 { 1 } else { 0 });
        }

        assert_eq!(member(&db, m).await.meeting_absents, 3);
        let fines = meeting_fines_of(&db, m).await;
        assert_eq!(fines.len(), 1);
        assert_eq!(fines[0].amount, 500);
        assert_eq!(fines[0].date, day(2024, 3, 1));

        assert_eq!(member(&db, n).await.meeting_absents, 0);
        assert!(fines_of(&db, n).await.is_empty());
    }

    #[tokio::test]
    async fn test_same_roster_twice_is_idempotent() {
        let db = open().await;
        let [m] = members(&db, [1]).await;
        for month in 1..=2 {
            record_meeting(&db, roster(day(2024, month, 1), vec![1])).await.unwrap();
        }
        let first = record_meeting(&db, roster(day(2024, 3, 1), vec![1])).await.unwrap();
        let again = record_meeting(&db, roster(day(2024, 3, 1), vec![1])).await.unwrap();

        assert_eq!(first.meeting_id, again.meeting_id);
        assert!(!again.created);
        assert_eq!(again.fines_added, 0);
        assert_eq!(again.fines_removed, 0);
        assert_eq!(member(&db, m).await.meeting_absents, 3);
        assert_eq!(meeting_fines_of(&db, m).await.len(), 1);
    }

    #[tokio::test]
    async fn test_meeting_fine_not_retracted() {
        let db = open().await;
        let [m] = members(&db, [1]).await;
        for month in 1..=3 {
            record_meeting(&db, roster(day(2024, month, 1), vec![1])).await.unwrap();
        }

        let report = record_meeting(&db, roster(day(2024, 3, 1), vec![])).await.unwrap();
        assert_eq!(report.fines_added, 0);
        assert_eq!(report.fines_removed, 0);

        assert_eq!(member(&db, m).await.meeting_absents, 0);
        let fines = meeting_fines_of(&db, m).await;
        assert_eq!(fines.len(), 1);
        assert_eq!(fines[0].date, day(2024, 3, 1));
    }

    #[tokio::test]
    async fn test_kept_fine_dropped_by_later_edit() {
        let db = open().await;
        let [m] = members(&db, [1]).await;
        for month in 1..=3 {
            record_meeting(&db, roster(day(2024, month, 1), vec![1])).await.unwrap();
        }
        record_meeting(&db, roster(day(2024, 3, 1), vec![])).await.unwrap();
        assert_eq!(meeting_fines_of(&db, m).await.len(), 1);

        // Editing February replays the history, which no longer fines March
        let report = record_meeting(&db, roster(day(2024, 2, 1), vec![])).await.unwrap();
        assert_eq!(report.fines_added, 0);
        assert_eq!(report.fines_removed, 1);
        assert_eq!(member(&db, m).await.meeting_absents, 0);
        assert!(meeting_fines_of(&db, m).await.is_empty());
    }

    #[tokio::test]
    async fn test_retroactive_edit_replays_history() {
        let db = open().await;
        let [m] = members(&db, [1]).await;
        record_meeting(&db, roster(day(2024, 1, 1), vec![1])).await.unwrap();
        record_meeting(&db, roster(day(2024, 2, 1), vec![])).await.unwrap();
        record_meeting(&db, roster(day(2024, 3, 1), vec![1])).await.unwrap();
        record_meeting(&db, roster(day(2024, 4, 1), vec![1])).await.unwrap();
        assert_eq!(member(&db, m).await.meeting_absents, 2);
        assert!(meeting_fines_of(&db, m).await.is_empty());

        // Member was in fact absent in February too
        let report = record_meeting(&db, roster(day(2024, 2, 1), vec![1])).await.unwrap();
        assert_eq!(report.fines_added, 1);
        assert_eq!(report.fines_removed, 0);

        assert_eq!(member(&db, m).await.meeting_absents, 4);
        let fines = meeting_fines_of(&db, m).await;
        assert_eq!(fines.len(), 1);
        assert_eq!(fines[0].date, day(2024, 3, 1));
    }

    #[tokio::test]
    async fn test_retroactive_edit_removes_replayed_fine() {
        let db = open().await;
        let [m] = members(&db, [1]).await;
        for month in 1..=4 {
            record_meeting(&db, roster(day(2024, month, 1), vec![1])).await.unwrap();
        }
        assert_eq!(meeting_fines_of(&db, m).await.len(), 1);

        // Present in January after all: the run starts in February
        let report = record_meeting(&db, roster(day(2024, 1, 1), vec![])).await.unwrap();
        assert_eq!(report.fines_added, 1);
        assert_eq!(report.fines_removed, 1);

        assert_eq!(member(&db, m).await.meeting_absents, 3);
        let fines = meeting_fines_of(&db, m).await;
        assert_eq!(fines.len(), 1);
        assert_eq!(fines[0].date, day(2024, 4, 1));
    }

    #[tokio::test]
    async fn test_exempt_and_inactive_members_not_counted() {
        let db = open().await;
        members(&db, [1]).await;
        let free = add_member(&db, Member {
            id: MemberId(2),
            status: MemberStatus::AttendanceFree,
            ..Default::default()
        }).await;
        let gone = add_member(&db, Member {
            id: MemberId(3),
            deactivated_at: day(2023, 1, 1).and_hms_opt(0, 0, 0),
            ..Default::default()
        }).await;

        for month in 1..=3 {
            record_meeting(&db, roster(day(2024, month, 1), vec![1, 2, 3, 99])).await.unwrap();
        }
        assert_eq!(member(&db, free.id).await.meeting_absents, 0);
        assert_eq!(member(&db, gone.id).await.meeting_absents, 0);
        assert!(fines_of(&db, free.id).await.is_empty());
        assert!(fines_of(&db, gone.id).await.is_empty());
        assert_eq!(meeting_fines_of(&db, MemberId(1)).await.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_fine_does_not_stop_meeting() {
        let db = open().await;
        let [m1, m2, m3] = members(&db, [1, 2, 3]).await;
        let db = FailingMember { db, member_id: m2 };

        for month in 1..=3 {
            let report = record_meeting(&db, roster(day(2024, month, 1), vec![1, 2, 3])).await.unwrap();
            assert_eq!(report.fines_added, if month == 3 { 2 } else { 0 });
        }

        assert_eq!(meeting_fines_of(&db.db, m1).await.len(), 1);
        assert_eq!(meeting_fines_of(&db.db, m3).await.len(), 1);
        assert!(fines_of(&db.db, m2).await.is_empty());
        assert_eq!(member(&db.db, m2).await.meeting_absents, 3);
    }
}
