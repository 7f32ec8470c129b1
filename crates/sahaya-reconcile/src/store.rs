use tracing::warn;

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
    Roster,
    Settings,
    Update,
};

use crate::{ReconcileError, Result};

/// Everything the engine needs from persistence: the member
/// store with its fine ledger, the event stores and the settings.
pub trait Store:
    Query<Member, Filter = MemberFilter>
    + AbsenceCounter
    + Query<Fine, Filter = FineFilter>
    + Push<Fine>
    + Pull<Fine, Filter = FineFilter>
    + Query<Meeting, Filter = MeetingFilter>
    + Insert<Meeting>
    + Update<Meeting>
    + Query<Funeral, Filter = FuneralFilter>
    + Insert<Funeral>
    + Update<Funeral>
    + Query<CommonWork, Filter = CommonWorkFilter>
    + Insert<CommonWork>
    + Update<CommonWork>
    + Retrieve<Settings, Key = ()>
    + Send
    + Sync
{
}

impl<T> Store for T where
    T: Query<Member, Filter = MemberFilter>
        + AbsenceCounter
        + Query<Fine, Filter = FineFilter>
        + Push<Fine>
        + Pull<Fine, Filter = FineFilter>
        + Query<Meeting, Filter = MeetingFilter>
        + Insert<Meeting>
        + Update<Meeting>
        + Query<Funeral, Filter = FuneralFilter>
        + Insert<Funeral>
        + Update<Funeral>
        + Query<CommonWork, Filter = CommonWorkFilter>
        + Insert<CommonWork>
        + Update<CommonWork>
        + Retrieve<Settings, Key = ()>
        + Send
        + Sync
{
}

pub async fn members<DB: Store>(db: &DB, filter: MemberFilter) -> Result<Vec<Member>> {
    Ok(Query::<Member>::query(db, &filter).await?)
}

pub async fn fines<DB: Store>(db: &DB, filter: FineFilter) -> Result<Vec<Fine>> {
    Ok(Query::<Fine>::query(db, &filter).await?)
}

pub async fn meetings<DB: Store>(db: &DB, filter: MeetingFilter) -> Result<Vec<Meeting>> {
    Ok(Query::<Meeting>::query(db, &filter).await?)
}

pub async fn common_works<DB: Store>(
    db: &DB,
    filter: CommonWorkFilter,
) -> Result<Vec<CommonWork>> {
    Ok(Query::<CommonWork>::query(db, &filter).await?)
}

pub async fn find_member<DB: Store>(db: &DB, id: MemberId) -> Result<Option<Member>> {
    let filter = MemberFilter {
        id: Some(id),
        ..Default::default()
    };
    Ok(members(db, filter).await?.pop())
}

pub async fn find_funeral<DB: Store>(db: &DB, id: u32) -> Result<Funeral> {
    let filter = FuneralFilter {
        id: Some(id),
        ..Default::default()
    };
    Query::<Funeral>::query(db, &filter)
        .await?
        .pop()
        .ok_or_else(|| ReconcileError::not_found("funeral", id))
}

/// Active members of a roster. Ids that cannot be resolved, or
/// that belong to deactivated members, are skipped.
pub async fn resolve_members<DB: Store>(db: &DB, roster: &Roster) -> Result<Vec<Member>> {
    if roster.is_empty() {
        return Ok(vec![]);
    }
    let found = members(db, MemberFilter {
        ids: Some(roster.to_vec()),
        active: Some(true),
        ..Default::default()
    })
    .await?;

    if found.len() < roster.len() {
        let known: Roster = found.iter().map(|m| m.id).collect();
        for id in roster.difference(&known).iter() {
            warn!(member_id = %id, "skipping unknown or inactive member");
        }
    }
    Ok(found)
}
