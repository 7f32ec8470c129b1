//! Consecutive meeting absences.
//!
//! Every third consecutive absence costs a meeting fine. A fine
//! once levied for a meeting is never taken back; a later presence
//! only resets the run.

use sahaya_data::{Fine, FineKind, Meeting, MemberId, MEETING_FINE};

use crate::{ledger, Result, Store};

/// A run of this length (or a multiple of it) is fined.
pub const FINE_EVERY: u32 = 3;

pub fn triggers_fine(absents: u32) -> bool {
    absents > 0 && absents % FINE_EVERY == 0
}

/// Count an absence from the meeting. Returns true when this
/// absence added a meeting fine.
pub async fn register_absence<DB: Store>(
    db: &DB,
    member_id: MemberId,
    meeting: &Meeting,
) -> Result<bool> {
    let absents = db.increment_absents(member_id).await?;
    if !triggers_fine(absents) {
        return Ok(false);
    }
    let fine = Fine::new(member_id, meeting.id, FineKind::Meeting, MEETING_FINE, meeting.date);
    let applied = ledger::apply_fine(db, fine).await?;
    Ok(applied.inserted)
}

/// Break the run. Returns false if there was no run.
pub async fn register_presence<DB: Store>(db: &DB, member_id: MemberId) -> Result<bool> {
    Ok(db.reset_absents(member_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    use sahaya_data::Insert;

    use crate::testing::{day, fines_of, member, members, open};

    #[test]
    fn test_triggers_fine() {
        let fired: Vec<u32> = (0..10).filter(|n| triggers_fine(*n)).collect();
        assert_eq!(fired, vec![3, 6, 9]);
    }

    #[tokio::test]
    async fn test_third_absence_is_fined() {
        let db = open().await;
        let [m] = members(&db, [1]).await;

        let mut fined = vec![];
        for month in 1..=4 {
            let meeting = db.insert(Meeting {
                date: day(2024, month, 1),
                ..Default::default()
            }).await.unwrap();
            fined.push(register_absence(&db, m, &meeting).await.unwrap());
        }
        assert_eq!(fined, vec![false, false, true, false]);
        assert_eq!(member(&db, m).await.meeting_absents, 4);

        let fines = fines_of(&db, m).await;
        assert_eq!(fines.len(), 1);
        assert_eq!(fines[0].kind, FineKind::Meeting);
        assert_eq!(fines[0].amount, 500);
        assert_eq!(fines[0].date, day(2024, 3, 1));
    }

    #[tokio::test]
    async fn test_presence_resets_run() {
        let db = open().await;
        let [m] = members(&db, [1]).await;
        let meeting = db.insert(Meeting {
            date: day(2024, 1, 1),
            ..Default::default()
        }).await.unwrap();

        assert!(!register_presence(&db, m).await.unwrap());
        register_absence(&db, m, &meeting).await.unwrap();
        assert!(register_presence(&db, m).await.unwrap());
        assert_eq!(member(&db, m).await.meeting_absents, 0);
    }
}
