//! Re-derive meeting absence runs and meeting fines after a
//! retroactive roster edit.
//!
//! Only members whose attendance changed are replayed, but always
//! against the whole meeting history. The cost is linear in the
//! number of meetings on every edit, which will show for
//! societies with a long history.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{error, info};

use sahaya_data::{
    Fine, FineFilter, FineKind, Meeting, MeetingFilter, MemberId, Roster, MEETING_FINE,
};

use crate::{counter, diff::RosterDiff, ledger, store, ReconcileError, Result, Store};

/// Meetings in non-decreasing date order.
#[derive(Debug, Clone, Default)]
pub struct ChronologicalMeetings(Vec<Meeting>);

impl TryFrom<Vec<Meeting>> for ChronologicalMeetings {
    type Error = ReconcileError;

    fn try_from(meetings: Vec<Meeting>) -> Result<Self> {
        if let Some(pair) = meetings.windows(2).find(|pair| pair[1].date < pair[0].date) {
            return Err(ReconcileError::OutOfOrder {
                previous: pair[0].date,
                next: pair[1].date,
            });
        }
        Ok(ChronologicalMeetings(meetings))
    }
}

impl ChronologicalMeetings {
    pub fn iter(&self) -> impl Iterator<Item = &Meeting> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// State of one member after replaying the meeting history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Replayed {
    pub meeting_absents: u32,
    /// Meetings (id, date) that cost a fine.
    pub fined: Vec<(u32, NaiveDate)>,
}

/// Replay the absence runs of the members over the meetings.
pub fn replay(meetings: &ChronologicalMeetings, members: &Roster) -> BTreeMap<MemberId, Replayed> {
    let mut state: BTreeMap<MemberId, Replayed> =
        members.iter().map(|id| (id, Replayed::default())).collect();

    for meeting in meetings.iter() {
        for (id, replayed) in state.iter_mut() {
            if !meeting.absents.contains(*id) {
                replayed.meeting_absents = 0;
                continue;
            }
            replayed.meeting_absents += 1;
            if counter::triggers_fine(replayed.meeting_absents) {
                replayed.fined.push((meeting.id, meeting.date));
            }
        }
    }
    state
}

/// Recalculate runs and meeting fines of every member with a
/// transition in the edited meeting.
///
/// Members marked present keep a fine levied for the edited
/// meeting itself. Failures of single members are logged and
/// do not stop the others.
pub async fn recalculate<DB: Store>(db: &DB, edited: &Meeting, diff: &RosterDiff) -> Result<()> {
    let affected = diff.affected();
    if affected.is_empty() {
        return Ok(());
    }
    let history = store::meetings(db, MeetingFilter::default()).await?;
    let meetings = ChronologicalMeetings::try_from(history)?;

    for (member_id, replayed) in replay(&meetings, &affected) {
        let keep = diff.newly_present.contains(member_id).then_some(edited.id);
        if let Err(err) = recalculate_member(db, member_id, keep, &replayed).await {
            error!(%member_id, meeting_id = edited.id, "recalculation failed: {}", err);
        }
    }
    info!(
        meeting_id = edited.id,
        members = affected.len(),
        meetings = meetings.len(),
        "replayed meeting history",
    );
    Ok(())
}

async fn recalculate_member<DB: Store>(
    db: &DB,
    member_id: MemberId,
    keep: Option<u32>,
    replayed: &Replayed,
) -> Result<()> {
    let filter = FineFilter {
        member_id: Some(member_id),
        except_event_id: keep,
        kind: Some(FineKind::Meeting),
        ..Default::default()
    };
    db.pull(&filter).await?;
    db.set_absents(member_id, replayed.meeting_absents).await?;

    for (meeting_id, date) in &replayed.fined {
        let fine = Fine::new(member_id, *meeting_id, FineKind::Meeting, MEETING_FINE, *date);
        ledger::apply_fine(db, fine).await?;
    }
    Ok(())
}
