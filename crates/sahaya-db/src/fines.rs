use anyhow::{anyhow, Result};
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};
use tracing::debug;

use sahaya_data::{Fine, FineFilter, Pull, Push, Query};

use crate::Connection;

fn push_filter(qry: &mut QueryBuilder<'_, Sqlite>, filter: &FineFilter) {
    if let Some(member_id) = filter.member_id {
        qry.push(" AND member_id = ").push_bind(member_id);
    }
    if let Some(member_ids) = &filter.member_ids {
        if member_ids.is_empty() {
            qry.push(" AND 0");
        } else {
            qry.push(" AND member_id IN (");
            let mut list = qry.separated(", ");
            for id in member_ids {
                list.push_bind(*id);
            }
            list.push_unseparated(")");
        }
    }
    if let Some(event_id) = filter.event_id {
        qry.push(" AND event_id = ").push_bind(event_id);
    }
    if let Some(event_id) = filter.except_event_id {
        qry.push(" AND event_id != ").push_bind(event_id);
    }
    if let Some(kind) = filter.kind {
        qry.push(" AND kind = ").push_bind(kind);
    }
}

#[async_trait]
impl Query<Fine> for Connection {
    type Filter = FineFilter;
    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Fine>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                id,
                member_id,
                event_id,
                kind,
                amount,
                date
            FROM fines
            WHERE 1
            "#,
        );
        push_filter(&mut qry, filter);
        qry.push(" ORDER BY date, id");

        let fines: Vec<Fine> = qry.build_query_as().fetch_all(&mut *conn).await?;
        Ok(fines)
    }
}

#[async_trait]
impl Push<Fine> for Connection {
    /// Conditional insert keyed by (member, event, kind).
    async fn push(&self, fine: Fine) -> Result<bool> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"INSERT INTO fines (
                member_id,
                event_id,
                kind,
                amount,
                date
            ) VALUES (
            "#,
        );
        qry.separated(", ")
            .push_bind(fine.member_id)
            .push_bind(fine.event_id)
            .push_bind(fine.kind)
            .push_bind(fine.amount)
            .push_bind(fine.date);
        qry.push(") ON CONFLICT (member_id, event_id, kind) DO NOTHING");

        let result = qry.build().execute(&mut *conn).await?;
        let written = result.rows_affected() > 0;
        debug!(
            member_id = %fine.member_id,
            event_id = fine.event_id,
            kind = %fine.kind,
            written,
            "push fine"
        );
        Ok(written)
    }
}

#[async_trait]
impl Pull<Fine> for Connection {
    type Filter = FineFilter;
    async fn pull(&self, filter: &Self::Filter) -> Result<u64> {
        if filter.member_id.is_none()
            && filter.member_ids.is_none()
            && filter.event_id.is_none()
        {
            return Err(anyhow!("refusing to pull fines without member or event"));
        }
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new("DELETE FROM fines WHERE 1");
        push_filter(&mut qry, filter);
        let result = qry.build().execute(&mut *conn).await?;
        debug!(?filter, removed = result.rows_affected(), "pull fines");
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    use sahaya_data::{FineKind, Insert, Member, MemberId};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[tokio::test]
    async fn test_push_is_keyed_by_tuple() {
        let db = Connection::open_test().await.unwrap();
        let m = db.insert(Member::default()).await.unwrap();

        let fine = Fine::new(m.id, 1, FineKind::Funeral, 100, date());
        assert!(db.push(fine.clone()).await.unwrap());
        assert!(!db.push(fine.clone()).await.unwrap());

        // A different amount does not make it a different fine
        let fine = Fine { amount: 150, ..fine };
        assert!(!db.push(fine).await.unwrap());

        // Other kinds for the same event coexist
        assert!(db.push(Fine::new(m.id, 1, FineKind::ExtraDue, 50, date())).await.unwrap());

        let fines = m.get_fines(&db).await.unwrap();
        assert_eq!(fines.len(), 2);
        assert_eq!(fines[0].amount, 100);
    }

    #[tokio::test]
    async fn test_concurrent_push_yields_one_fine() {
        let db = Connection::open_test().await.unwrap();
        let m = db.insert(Member::default()).await.unwrap();
        let fine = Fine::new(m.id, 9, FineKind::CommonWork, 300, date());

        let (a, b) = tokio::join!(db.push(fine.clone()), db.push(fine.clone()));
        assert!(a.unwrap() ^ b.unwrap());

        let fines: Vec<Fine> = db.query(&FineFilter::tuple(m.id, 9, FineKind::CommonWork))
            .await.unwrap();
        assert_eq!(fines.len(), 1);
    }

    #[tokio::test]
    async fn test_pull() {
        let db = Connection::open_test().await.unwrap();
        let m1 = db.insert(Member::default()).await.unwrap();
        let m2 = db.insert(Member::default()).await.unwrap();
        for event_id in [1, 2, 3] {
            db.push(Fine::new(m1.id, event_id, FineKind::Meeting, 500, date())).await.unwrap();
            db.push(Fine::new(m2.id, event_id, FineKind::Meeting, 500, date())).await.unwrap();
        }

        let removed = db.pull(&FineFilter {
            member_ids: Some(vec![m1.id]),
            kind: Some(FineKind::Meeting),
            except_event_id: Some(2),
            ..Default::default()
        }).await.unwrap();
        assert_eq!(removed, 2);

        let fines = m1.get_fines(&db).await.unwrap();
        assert_eq!(fines.len(), 1);
        assert_eq!(fines[0].event_id, 2);
        assert_eq!(m2.get_fines(&db).await.unwrap().len(), 3);

        assert!(db.pull(&FineFilter::default()).await.is_err());
        assert_eq!(
            db.pull(&FineFilter::tuple(MemberId(77), 1, FineKind::Meeting)).await.unwrap(),
            0
        );
    }
}
