use anyhow::Result;
use async_trait::async_trait;

use crate::MemberId;

#[async_trait]
pub trait Query<T> {
    type Filter;
    async fn query(&self, filter: &Self::Filter) -> Result<Vec<T>>;
}

#[async_trait]
pub trait Insert<T> {
    async fn insert(&self, item: T) -> Result<T>;
}

#[async_trait]
pub trait Update<T> {
    async fn update(&self, item: T) -> Result<T>;
}

#[async_trait]
pub trait Retrieve<T> {
    type Key;
    async fn retrieve(&self, key: Self::Key) -> Result<T>;
}

/// Append an item unless one with the same key is already present.
/// This is a single atomic write: concurrent pushes of the same key
/// leave exactly one item behind.
#[async_trait]
pub trait Push<T> {
    /// Returns true if the item was written.
    async fn push(&self, item: T) -> Result<bool>;
}

/// Remove every item matching a filter.
#[async_trait]
pub trait Pull<T> {
    type Filter;
    /// Returns the number of removed items.
    async fn pull(&self, filter: &Self::Filter) -> Result<u64>;
}

/// Atomic single-member updates of the consecutive meeting
/// absence counter.
#[async_trait]
pub trait AbsenceCounter {
    /// Increment the counter and return the new value.
    async fn increment_absents(&self, member_id: MemberId) -> Result<u32>;

    /// Reset the counter to zero. Returns false if it already was zero.
    async fn reset_absents(&self, member_id: MemberId) -> Result<bool>;

    /// Overwrite the counter.
    async fn set_absents(&self, member_id: MemberId, absents: u32) -> Result<()>;
}
