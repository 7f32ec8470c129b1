//! Fine ledger mutations.
//!
//! Every call is its own write; nothing here spans members.

use tracing::debug;

use sahaya_data::{Fine, FineFilter, FineKind, MemberId};

use crate::{store, Result, Store};

/// Outcome of applying a fine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Applied {
    /// A new fine was written.
    pub inserted: bool,
    /// Attendance fines removed in favour of a work fine.
    pub superseded: u64,
}

/// Levy a fine unless the member already holds one for the same
/// event and kind. A work fine first removes any attendance fine
/// for the same funeral.
pub async fn apply_fine<DB: Store>(db: &DB, fine: Fine) -> Result<Applied> {
    let superseded = if fine.kind.is_work() {
        let filter = FineFilter::tuple(fine.member_id, fine.event_id, FineKind::Funeral);
        db.pull(&filter).await?
    } else {
        0
    };
    let (member_id, event_id, kind) = fine.key();
    let inserted = db.push(fine).await?;
    debug!(%member_id, event_id, %kind, inserted, superseded, "apply fine");
    Ok(Applied {
        inserted,
        superseded,
    })
}

/// Remove all fines matching (member, event, kind).
pub async fn remove_fine<DB: Store>(
    db: &DB,
    member_id: MemberId,
    event_id: u32,
    kind: FineKind,
) -> Result<u64> {
    let removed = db.pull(&FineFilter::tuple(member_id, event_id, kind)).await?;
    debug!(%member_id, event_id, %kind, removed, "remove fine");
    Ok(removed)
}

/// Does the member hold a funeral or cemetery work fine for the funeral?
pub async fn has_work_fine<DB: Store>(
    db: &DB,
    member_id: MemberId,
    funeral_id: u32,
) -> Result<bool> {
    let fines = store::fines(db, FineFilter {
        member_id: Some(member_id),
        event_id: Some(funeral_id),
        ..Default::default()
    })
    .await?;
    Ok(fines.iter().any(|fine| fine.kind.is_work()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::testing::{day, members, open};

    #[tokio::test]
    async fn test_apply_fine_once() {
        let db = open().await;
        let [m] = members(&db, [1]).await;

        let fine = Fine::new(m, 3, FineKind::CommonWork, 300, day(2024, 6, 1));
        let applied = apply_fine(&db, fine.clone()).await.unwrap();
        assert_eq!(applied, Applied { inserted: true, superseded: 0 });
        let applied = apply_fine(&db, fine).await.unwrap();
        assert_eq!(applied, Applied { inserted: false, superseded: 0 });

        let fines = store::fines(&db, FineFilter::tuple(m, 3, FineKind::CommonWork))
            .await.unwrap();
        assert_eq!(fines.len(), 1);
    }

    #[tokio::test]
    async fn test_work_fine_supersedes_attendance_fine() {
        let db = open().await;
        let [m] = members(&db, [7]).await;
        let date = day(2024, 5, 2);

        apply_fine(&db, Fine::new(m, 1, FineKind::Funeral, 100, date)).await.unwrap();
        apply_fine(&db, Fine::new(m, 1, FineKind::ExtraDue, 50, date)).await.unwrap();
        apply_fine(&db, Fine::new(m, 2, FineKind::Funeral, 100, date)).await.unwrap();

        let applied = apply_fine(&db, Fine::new(m, 1, FineKind::FuneralWork, 200, date))
            .await.unwrap();
        assert_eq!(applied, Applied { inserted: true, superseded: 1 });
        assert!(has_work_fine(&db, m, 1).await.unwrap());
        assert!(!has_work_fine(&db, m, 2).await.unwrap());

        let kinds: Vec<(u32, FineKind)> = store::fines(&db, FineFilter {
            member_id: Some(m),
            ..Default::default()
        })
        .await
        .unwrap()
        .iter()
        .map(|fine| (fine.event_id, fine.kind))
        .collect();
        assert_eq!(kinds.len(), 3);
        assert!(kinds.contains(&(1, FineKind::FuneralWork)));
        assert!(kinds.contains(&(1, FineKind::ExtraDue)));
        assert!(kinds.contains(&(2, FineKind::Funeral)));
    }

    #[tokio::test]
    async fn test_remove_fine() {
        let db = open().await;
        let [m] = members(&db, [2]).await;
        let date = day(2024, 5, 2);
        apply_fine(&db, Fine::new(m, 1, FineKind::CemeteryWork, 200, date)).await.unwrap();

        assert_eq!(remove_fine(&db, m, 1, FineKind::CemeteryWork).await.unwrap(), 1);
        assert_eq!(remove_fine(&db, m, 1, FineKind::CemeteryWork).await.unwrap(), 0);
        assert!(!has_work_fine(&db, m, 1).await.unwrap());
    }
}
