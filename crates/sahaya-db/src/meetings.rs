use anyhow::Result;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};

use sahaya_data::{Insert, Meeting, MeetingFilter, Query, Retrieve, Update};

use crate::{
    results::{Id, QueryError},
    Connection,
};

#[async_trait]
impl Query<Meeting> for Connection {
    type Filter = MeetingFilter;

    /// Meetings in non-decreasing date order.
    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Meeting>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                id,
                date,
                absents
            FROM meetings
            WHERE 1
            "#,
        );
        if let Some(id) = filter.id {
            qry.push(" AND id = ").push_bind(id);
        }
        if let Some(date) = filter.date {
            qry.push(" AND date = ").push_bind(date);
        }
        if let Some(date_after) = filter.date_after {
            qry.push(" AND date >= ").push_bind(date_after);
        }
        if let Some(date_before) = filter.date_before {
            qry.push(" AND date <= ").push_bind(date_before);
        }
        qry.push(" ORDER BY date, id");

        let meetings: Vec<Meeting> = qry.build_query_as().fetch_all(&mut *conn).await?;
        Ok(meetings)
    }
}

#[async_trait]
impl Retrieve<Meeting> for Connection {
    type Key = u32;
    async fn retrieve(&self, id: Self::Key) -> Result<Meeting> {
        let meeting = self
            .query(&MeetingFilter {
                id: Some(id),
                ..Default::default()
            })
            .await?
            .pop()
            .ok_or(QueryError::NotFound)?;
        Ok(meeting)
    }
}

#[async_trait]
impl Insert<Meeting> for Connection {
    async fn insert(&self, meeting: Meeting) -> Result<Meeting> {
        let insert: Id<u32> = {
            let mut conn = self.lock().await;
            let absents: String = (&meeting.absents).into();
            let mut qry = QueryBuilder::<Sqlite>::new(
                "INSERT INTO meetings (date, absents) VALUES (");
            qry.separated(", ")
                .push_bind(meeting.date)
                .push_bind(absents);
            qry.push(") RETURNING id ")
                .build_query_as()
                .fetch_one(&mut *conn)
                .await?
        };
        self.retrieve(insert.id).await
    }
}

#[async_trait]
impl Update<Meeting> for Connection {
    async fn update(&self, meeting: Meeting) -> Result<Meeting> {
        {
            let mut conn = self.lock().await;
            let absents: String = (&meeting.absents).into();
            QueryBuilder::<Sqlite>::new("UPDATE meetings SET")
                .push(" date = ")
                .push_bind(meeting.date)
                .push(", absents = ")
                .push_bind(absents)
                .push(" WHERE id = ")
                .push_bind(meeting.id)
                .build()
                .execute(&mut *conn)
                .await?;
        }
        self.retrieve(meeting.id).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    use sahaya_data::{MemberId, Roster};

    #[tokio::test]
    async fn test_meetings_are_ordered_by_date() {
        let db = Connection::open_test().await.unwrap();
        for (month, absents) in [(3, vec![1]), (1, vec![1, 2]), (2, vec![])] {
            db.insert(Meeting {
                date: NaiveDate::from_ymd_opt(2024, month, 1).unwrap(),
                absents: Roster::from(absents),
                ..Default::default()
            }).await.unwrap();
        }

        let meetings: Vec<Meeting> = db.query(&MeetingFilter::default()).await.unwrap();
        let months: Vec<NaiveDate> = meetings.iter().map(|m| m.date).collect();
        assert_eq!(months, vec![
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        ]);
        assert!(meetings[0].absents.contains(MemberId(2)));
        assert!(meetings[1].absents.is_empty());

        let meetings: Vec<Meeting> = db.query(&MeetingFilter {
            date_after: NaiveDate::from_ymd_opt(2024, 2, 1),
            ..Default::default()
        }).await.unwrap();
        assert_eq!(meetings.len(), 2);
    }

    #[tokio::test]
    async fn test_meeting_update_roster() {
        let db = Connection::open_test().await.unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut meeting = db.insert(Meeting {
            date,
            absents: Roster::from(vec![4, 5]),
            ..Default::default()
        }).await.unwrap();

        meeting.absents = Roster::from(vec![5, 6]);
        let meeting = db.update(meeting).await.unwrap();
        assert_eq!(meeting.absents, Roster::from(vec![5, 6]));

        let found: Vec<Meeting> = db.query(&MeetingFilter {
            date: Some(date),
            ..Default::default()
        }).await.unwrap();
        assert_eq!(found, vec![meeting]);
    }

    #[tokio::test]
    async fn test_meeting_date_is_unique() {
        let db = Connection::open_test().await.unwrap();
        let meeting = Meeting {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            ..Default::default()
        };
        db.insert(meeting.clone()).await.unwrap();
        assert!(db.insert(meeting).await.is_err());
    }
}
