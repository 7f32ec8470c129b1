use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveDate;

use sahaya_data::{
    AbsenceCounter,
    CommonWork,
    CommonWorkFilter,
    Fine,
    FineFilter,
    Funeral,
    FuneralFilter,
    Insert,
    Meeting,
    MeetingFilter,
    Member,
    MemberFilter,
    MemberId,
    Pull,
    Push,
    Query,
    Retrieve,
    Settings,
    Update,
};
pub use sahaya_db::Connection;

use crate::store;

pub async fn open() -> Connection {
    Connection::open_test().await.unwrap()
}

pub fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Insert regular members with the given ids.
pub async fn members<const N: usize>(db: &Connection, ids: [u32; N]) -> [MemberId; N] {
    for id in ids {
        db.insert(Member {
            id: MemberId(id),
            name: format!("Member {}", id),
            area: "X".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    }
    ids.map(MemberId)
}

pub async fn add_member(db: &Connection, member: Member) -> Member {
    db.insert(member).await.unwrap()
}

pub async fn member(db: &Connection, id: MemberId) -> Member {
    Retrieve::<Member>::retrieve(db, id).await.unwrap()
}

pub async fn fines_of(db: &Connection, id: MemberId) -> Vec<Fine> {
    store::fines(db, FineFilter {
        member_id: Some(id),
        ..Default::default()
    })
    .await
    .unwrap()
}

/// A store whose fine writes for one member always fail.
pub struct FailingMember {
    pub db: Connection,
    pub member_id: MemberId,
}

macro_rules! forward_query {
    ($($model:ty => $filter:ty),* $(,)?) => {$(
        #[async_trait]
        impl Query<$model> for FailingMember {
            type Filter = $filter;
            async fn query(&self, filter: &Self::Filter) -> Result<Vec<$model>> {
                Query::<$model>::query(&self.db, filter).await
            }
        }
    )*};
}

macro_rules! forward_write {
    ($($model:ty),* $(,)?) => {$(
        #[async_trait]
        impl Insert<$model> for FailingMember {
            async fn insert(&self, item: $model) -> Result<$model> {
                Insert::<$model>::insert(&self.db, item).await
            }
        }

        #[async_trait]
        impl Update<$model> for FailingMember {
            async fn update(&self, item: $model) -> Result<$model> {
                Update::<$model>::update(&self.db, item).await
            }
        }
    )*};
}

forward_query! {
    Member => MemberFilter,
    Fine => FineFilter,
    Meeting => MeetingFilter,
    Funeral => FuneralFilter,
    CommonWork => CommonWorkFilter,
}

forward_write!(Meeting, Funeral, CommonWork);

#[async_trait]
impl Retrieve<Settings> for FailingMember {
    type Key = ();
    async fn retrieve(&self, key: ()) -> Result<Settings> {
        Retrieve::<Settings>::retrieve(&self.db, key).await
    }
}

#[async_trait]
impl AbsenceCounter for FailingMember {
    async fn increment_absents(&self, member_id: MemberId) -> Result<u32> {
        self.db.increment_absents(member_id).await
    }

    async fn reset_absents(&self, member_id: MemberId) -> Result<bool> {
        self.db.reset_absents(member_id).await
    }

    async fn set_absents(&self, member_id: MemberId, absents: u32) -> Result<()> {
        self.db.set_absents(member_id, absents).await
    }
}

#[async_trait]
impl Push<Fine> for FailingMember {
    async fn push(&self, fine: Fine) -> Result<bool> {
        if fine.member_id == self.member_id {
            return Err(anyhow!("write failed for member {}", fine.member_id));
        }
        self.db.push(fine).await
    }
}

#[async_trait]
impl Pull<Fine> for FailingMember {
    type Filter = FineFilter;
    async fn pull(&self, filter: &FineFilter) -> Result<u64> {
        if filter.member_id == Some(self.member_id) {
            return Err(anyhow!("write failed for member {}", self.member_id));
        }
        self.db.pull(filter).await
    }
}
