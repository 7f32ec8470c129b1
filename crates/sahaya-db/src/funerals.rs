use anyhow::Result;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};

use sahaya_data::{Funeral, FuneralFilter, Insert, Query, Retrieve, Update};

use crate::{
    results::{Id, QueryError},
    Connection,
};

#[async_trait]
impl Query<Funeral> for Connection {
    type Filter = FuneralFilter;
    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Funeral>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                id,
                date,
                member_id,
                deceased_id,
                cemetery_assignments,
                funeral_assignments,
                removed_members,
                event_absents,
                funeral_work_absents,
                cemetery_work_absents,
                extra_due
            FROM funerals
            WHERE 1
            "#,
        );
        if let Some(id) = filter.id {
            qry.push(" AND id = ").push_bind(id);
        }
        if let Some(date) = filter.date {
            qry.push(" AND date = ").push_bind(date);
        }
        if let Some(member_id) = filter.member_id {
            qry.push(" AND member_id = ").push_bind(member_id);
        }
        qry.push(" ORDER BY date, id");

        let funerals: Vec<Funeral> = qry.build_query_as().fetch_all(&mut *conn).await?;
        Ok(funerals)
    }
}

#[async_trait]
impl Retrieve<Funeral> for Connection {
    type Key = u32;
    async fn retrieve(&self, id: Self::Key) -> Result<Funeral> {
        let funeral = self
            .query(&FuneralFilter {
                id: Some(id),
                ..Default::default()
            })
            .await?
            .pop()
            .ok_or(QueryError::NotFound)?;
        Ok(funeral)
    }
}

#[async_trait]
impl Insert<Funeral> for Connection {
    async fn insert(&self, funeral: Funeral) -> Result<Funeral> {
        let insert: Id<u32> = {
            let mut conn = self.lock().await;
            let mut qry = QueryBuilder::<Sqlite>::new(
                r#"INSERT INTO funerals (
                    date,
                    member_id,
                    deceased_id,
                    cemetery_assignments,
                    funeral_assignments,
                    removed_members,
                    event_absents,
                    funeral_work_absents,
                    cemetery_work_absents,
                    extra_due
                ) VALUES (
                "#,
            );
            qry.separated(", ")
                .push_bind(funeral.date)
                .push_bind(funeral.member_id)
                .push_bind(funeral.deceased_id)
                .push_bind(String::from(&funeral.cemetery_assignments))
                .push_bind(String::from(&funeral.funeral_assignments))
                .push_bind(String::from(&funeral.removed_members))
                .push_bind(String::from(&funeral.event_absents))
                .push_bind(String::from(&funeral.funeral_work_absents))
                .push_bind(String::from(&funeral.cemetery_work_absents))
                .push_bind(funeral.extra_due);
            qry.push(") RETURNING id ")
                .build_query_as()
                .fetch_one(&mut *conn)
                .await?
        };
        self.retrieve(insert.id).await
    }
}

#[async_trait]
impl Update<Funeral> for Connection {
    async fn update(&self, funeral: Funeral) -> Result<Funeral> {
        {
            let mut conn = self.lock().await;
            QueryBuilder::<Sqlite>::new("UPDATE funerals SET")
                .push(" date = ")
                .push_bind(funeral.date)
                .push(", member_id = ")
                .push_bind(funeral.member_id)
                .push(", deceased_id = ")
                .push_bind(funeral.deceased_id)
                .push(", cemetery_assignments = ")
                .push_bind(String::from(&funeral.cemetery_assignments))
                .push(", funeral_assignments = ")
                .push_bind(String::from(&funeral.funeral_assignments))
                .push(", removed_members = ")
                .push_bind(String::from(&funeral.removed_members))
                .push(", event_absents = ")
                .push_bind(String::from(&funeral.event_absents))
                .push(", funeral_work_absents = ")
                .push_bind(String::from(&funeral.funeral_work_absents))
                .push(", cemetery_work_absents = ")
                .push_bind(String::from(&funeral.cemetery_work_absents))
                .push(", extra_due = ")
                .push_bind(funeral.extra_due)
                .push(" WHERE id = ")
                .push_bind(funeral.id)
                .build()
                .execute(&mut *conn)
                .await?;
        }
        self.retrieve(funeral.id).await
    }
}
