use anyhow::Result;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};

use sahaya_data::{CommonWork, CommonWorkFilter, Insert, Query, Retrieve, Update};

use crate::{
    results::{Id, QueryError},
    Connection,
};

#[async_trait]
impl Query<CommonWork> for Connection {
    type Filter = CommonWorkFilter;
    async fn query(&self, filter: &Self::Filter) -> Result<Vec<CommonWork>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                id,
                date,
                title,
                absents,
                total_members,
                absent_count,
                present_count
            FROM common_works
            WHERE 1
            "#,
        );
        if let Some(id) = filter.id {
            qry.push(" AND id = ").push_bind(id);
        }
        if let Some(date) = filter.date {
            qry.push(" AND date = ").push_bind(date);
        }
        qry.push(" ORDER BY date, id");

        let works: Vec<CommonWork> = qry.build_query_as().fetch_all(&mut *conn).await?;
        Ok(works)
    }
}

#[async_trait]
impl Retrieve<CommonWork> for Connection {
    type Key = u32;
    async fn retrieve(&self, id: Self::Key) -> Result<CommonWork> {
        let work = self
            .query(&CommonWorkFilter {
                id: Some(id),
                ..Default::default()
            })
            .await?
            .pop()
            .ok_or(QueryError::NotFound)?;
        Ok(work)
    }
}

#[async_trait]
impl Insert<CommonWork> for Connection {
    async fn insert(&self, work: CommonWork) -> Result<CommonWork> {
        let insert: Id<u32> = {
            let mut conn = self.lock().await;
            let mut qry = QueryBuilder::<Sqlite>::new(
                r#"INSERT INTO common_works (
                    date,
                    title,
                    absents,
                    total_members,
                    absent_count,
                    present_count
                ) VALUES (
                "#,
            );
            qry.separated(", ")
                .push_bind(work.date)
                .push_bind(&work.title)
                .push_bind(String::from(&work.absents))
                .push_bind(work.total_members)
                .push_bind(work.absent_count)
                .push_bind(work.present_count);
            qry.push(") RETURNING id ")
                .build_query_as()
                .fetch_one(&mut *conn)
                .await?
        };
        self.retrieve(insert.id).await
    }
}

#[async_trait]
impl Update<CommonWork> for Connection {
    async fn update(&self, work: CommonWork) -> Result<CommonWork> {
        {
            let mut conn = self.lock().await;
            QueryBuilder::<Sqlite>::new("UPDATE common_works SET")
                .push(" date = ")
                .push_bind(work.date)
                .push(", title = ")
                .push_bind(&work.title)
                .push(", absents = ")
                .push_bind(String::from(&work.absents))
                .push(", total_members = ")
                .push_bind(work.total_members)
                .push(", absent_count = ")
                .push_bind(work.absent_count)
                .push(", present_count = ")
                .push_bind(work.present_count)
                .push(" WHERE id = ")
                .push_bind(work.id)
                .build()
                .execute(&mut *conn)
                .await?;
        }
        self.retrieve(work.id).await
    }
}
