use anyhow::Result;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};

use sahaya_data::{
    AbsenceCounter,
    Insert,
    Member,
    MemberFilter,
    MemberId,
    Query,
    Retrieve,
    Update,
};

use crate::{
    results::{Id, QueryError},
    Connection,
};

#[async_trait]
impl Query<Member> for Connection {
    type Filter = MemberFilter;
    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Member>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                id,
                name,
                area,
                status,
                roles,
                meeting_absents,
                deactivated_at
            FROM members
            WHERE 1
            "#,
        );

        if let Some(id) = filter.id {
            qry.push(" AND id = ").push_bind(id);
        }
        if let Some(ids) = &filter.ids {
            if ids.is_empty() {
                qry.push(" AND 0");
            } else {
                qry.push(" AND id IN (");
                let mut list = qry.separated(", ");
                for id in ids {
                    list.push_bind(*id);
                }
                list.push_unseparated(")");
            }
        }
        if let Some(name) = filter.name.clone() {
            qry.push(" AND name LIKE ").push_bind(format!("%{}%", name));
        }
        if let Some(area) = filter.area.clone() {
            qry.push(" AND area = ").push_bind(area);
        }
        match filter.active {
            Some(true) => {
                qry.push(" AND deactivated_at IS NULL");
            }
            Some(false) => {
                qry.push(" AND deactivated_at IS NOT NULL");
            }
            None => {}
        }
        if !filter.exclude_status.is_empty() {
            qry.push(" AND status NOT IN (");
            let mut list = qry.separated(", ");
            for status in &filter.exclude_status {
                list.push_bind(*status);
            }
            list.push_unseparated(")");
        }
        qry.push(" ORDER BY id");

        let members: Vec<Member> = qry.build_query_as().fetch_all(&mut *conn).await?;
        Ok(members)
    }
}

#[async_trait]
impl Retrieve<Member> for Connection {
    type Key = MemberId;
    async fn retrieve(&self, member_id: Self::Key) -> Result<Member> {
        let filter = MemberFilter {
            id: Some(member_id),
            ..Default::default()
        };
        let member = self
            .query(&filter)
            .await?
            .pop()
            .ok_or(QueryError::NotFound)?;
        Ok(member)
    }
}

#[async_trait]
impl Insert<Member> for Connection {
    /// Insert a member. A zero id lets the database
    /// assign the next member number.
    async fn insert(&self, member: Member) -> Result<Member> {
        let insert: Id<u32> = {
            let mut conn = self.lock().await;
            let id = if member.id.0 == 0 { None } else { Some(member.id) };
            let roles: String = (&member.roles).into();
            let mut qry = QueryBuilder::<Sqlite>::new(
                r#"INSERT INTO members (
                    id,
                    name,
                    area,
                    status,
                    roles,
                    meeting_absents,
                    deactivated_at
                ) VALUES (
                "#,
            );
            qry.separated(", ")
                .push_bind(id)
                .push_bind(&member.name)
                .push_bind(&member.area)
                .push_bind(member.status)
                .push_bind(roles)
                .push_bind(member.meeting_absents)
                .push_bind(member.deactivated_at);

            qry.push(") RETURNING id ")
                .build_query_as()
                .fetch_one(&mut *conn)
                .await?
        };
        self.retrieve(MemberId(insert.id)).await
    }
}

#[async_trait]
impl Update<Member> for Connection {
    /// Update member. The meeting absence counter belongs to the
    /// reconciliation engine and is left untouched.
    async fn update(&self, member: Member) -> Result<Member> {
        {
            let mut conn = self.lock().await;
            let roles: String = (&member.roles).into();
            QueryBuilder::<Sqlite>::new("UPDATE members SET")
                .push(" name = ")
                .push_bind(&member.name)
                .push(", area = ")
                .push_bind(&member.area)
                .push(", status = ")
                .push_bind(member.status)
                .push(", roles = ")
                .push_bind(roles)
                .push(", deactivated_at = ")
                .push_bind(member.deactivated_at)
                .push(" WHERE id = ")
                .push_bind(member.id)
                .build()
                .execute(&mut *conn)
                .await?;
        }
        self.retrieve(member.id).await
    }
}

#[async_trait]
impl AbsenceCounter for Connection {
    async fn increment_absents(&self, member_id: MemberId) -> Result<u32> {
        let mut conn = self.lock().await;
        let absents: Option<u32> = QueryBuilder::<Sqlite>::new(
            "UPDATE members SET meeting_absents = meeting_absents + 1")
            .push(" WHERE id = ")
            .push_bind(member_id)
            .push(" RETURNING meeting_absents")
            .build_query_scalar()
            .fetch_optional(&mut *conn)
            .await?;
        Ok(absents.ok_or(QueryError::NotFound)?)
    }

    async fn reset_absents(&self, member_id: MemberId) -> Result<bool> {
        let mut conn = self.lock().await;
        let result = QueryBuilder::<Sqlite>::new(
            "UPDATE members SET meeting_absents = 0")
            .push(" WHERE id = ")
            .push_bind(member_id)
            .push(" AND meeting_absents > 0")
            .build()
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_absents(&self, member_id: MemberId, absents: u32) -> Result<()> {
        let mut conn = self.lock().await;
        QueryBuilder::<Sqlite>::new("UPDATE members SET meeting_absents = ")
            .push_bind(absents)
            .push(" WHERE id = ")
            .push_bind(member_id)
            .build()
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}
