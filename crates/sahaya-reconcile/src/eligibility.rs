//! Who is exempt from a fine despite being marked absent.
//!
//! The resolver is pure and holds no state; callers evaluate it
//! afresh on every roster edit.

use sahaya_data::{Funeral, Member, MemberStatus, Roster};

/// Statuses that keep a member off the meeting roster entirely.
pub const MEETING_EXEMPT_STATUS: [MemberStatus; 2] =
    [MemberStatus::Free, MemberStatus::AttendanceFree];

/// The event a fine would be levied for.
#[derive(Debug, Clone, Copy)]
pub enum EventContext<'a> {
    Meeting,
    FuneralAttendance {
        funeral: &'a Funeral,
        /// Area of the deceased, if known.
        area: Option<&'a str>,
    },
    FuneralWork,
    CommonWork,
}

/// The subset of candidates exempt from a fine for the event.
pub fn exempt(context: &EventContext<'_>, candidates: &[Member]) -> Roster {
    candidates
        .iter()
        .filter(|member| is_exempt(context, member))
        .map(|member| member.id)
        .collect()
}

pub fn is_exempt(context: &EventContext<'_>, member: &Member) -> bool {
    match context {
        EventContext::Meeting => MEETING_EXEMPT_STATUS.contains(&member.status),
        EventContext::FuneralAttendance { funeral, area } => {
            exempt_from_funeral(funeral, *area, member)
        }
        // Work fines supersede attendance fines instead
        EventContext::FuneralWork => false,
        EventContext::CommonWork => {
            member.status == MemberStatus::Free
                || member.roles.iter().any(|role| role.is_privileged())
        }
    }
}

fn exempt_from_funeral(funeral: &Funeral, area: Option<&str>, member: &Member) -> bool {
    if funeral.is_assigned(member.id) || funeral.is_removed(member.id) {
        return true;
    }
    match member.status {
        MemberStatus::Free | MemberStatus::AttendanceFree => return true,
        MemberStatus::Regular | MemberStatus::FuneralFree => {}
    }
    if member.roles.iter().any(|role| role.is_officer()) {
        return true;
    }
    // Area admins and helpers only within their own area
    let in_area = area.is_some_and(|area| area == member.area);
    in_area && member.roles.iter().any(|role| role.administers_area())
}
