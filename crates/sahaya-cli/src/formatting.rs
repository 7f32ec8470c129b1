use sahaya_data::{Fine, Funeral, Member, Roster, Settings};
use sahaya_reconcile::{
    common_works::CommonWorkReport,
    funerals::{AttendanceReport, ExtraDueReport, WorkReport},
    meetings::MeetingReport,
};

macro_rules! next_attr {
    ($old:ident, $new:ident) => {
        if $old != $new {
            format!(" -> {}", $new)
        } else {
            "".to_string()
        }
    };
    ($old:ident, $new:ident, $attr:ident) => {
        if $old.$attr != $new.$attr {
            format!(" -> {}", $new.$attr)
        } else {
            "".to_string()
        }
    };
}

pub trait PrintFormatted {
    fn print_formatted(&self);
}

fn roster(roster: &Roster) -> String {
    let ids: Vec<String> = roster.iter().map(|id| id.to_string()).collect();
    if ids.is_empty() {
        "-".to_string()
    } else {
        ids.join(", ")
    }
}

fn deactivated(member: &Member) -> String {
    match member.deactivated_at {
        Some(at) => at.to_string(),
        None => "-".to_string(),
    }
}

impl PrintFormatted for Member {
    fn print_formatted(&self) {
        println!("ID:\t\t\t{}", self.id);
        println!("Name:\t\t\t{}", self.name);
        println!("Area:\t\t\t{}", self.area);
        println!("Status:\t\t\t{}", self.status);
        println!("Roles:\t\t\t{}", self.roles);
        println!("Meeting Absences:\t{}", self.meeting_absents);
        println!("Deactivated:\t\t{}", deactivated(self));
    }
}

impl PrintFormatted for (Member, Member) {
    fn print_formatted(&self) {
        let (old, new) = self;
        let next_name = next_attr!(old, new, name);
        println!("Name:\t\t\t{}{}", old.name, next_name);
        let next_area = next_attr!(old, new, area);
        println!("Area:\t\t\t{}{}", old.area, next_area);
        let next_status = next_attr!(old, new, status);
        println!("Status:\t\t\t{}{}", old.status, next_status);
        let next_roles = next_attr!(old, new, roles);
        println!("Roles:\t\t\t{}{}", old.roles, next_roles);

        let deactivated_old = deactivated(old);
        let deactivated_new = deactivated(new);
        let next_deactivated = next_attr!(deactivated_old, deactivated_new);
        println!("Deactivated:\t\t{}{}", deactivated_old, next_deactivated);
    }
}

impl PrintFormatted for Vec<Member> {
    fn print_formatted(&self) {
        println!(
            "{:>4}\t{:<24}\t{:<12}\t{:<16}\t{:>8}\t{:<40}\t{}",
            "ID", "Name", "Area", "Status", "Absences", "Roles", "Inactive"
        );
        println!("{:-<140}", "-");
        for member in self {
            let inactive = if member.is_active() { "" } else { "*" };
            println!(
                "{:>4}\t{:<24}\t{:<12}\t{:<16}\t{:>8}\t{:<40}\t{}",
                member.id,
                member.name,
                member.area,
                member.status,
                member.meeting_absents,
                member.roles,
                inactive,
            );
        }
    }
}

impl PrintFormatted for Vec<Fine> {
    fn print_formatted(&self) {
        println!("{:<10}\t{:<14}\t{:>6}\t{:>8}", "Date", "Type", "Event", "Amount");
        println!("{:-<60}", "-");
        for fine in self {
            println!(
                "{:<10}\t{:<14}\t{:>6}\t{:>8}",
                fine.date, fine.kind, fine.event_id, fine.amount,
            );
        }
        let total: i64 = self.iter().map(|fine| fine.amount).sum();
        println!("{:-<60}", "-");
        println!("{:<10}\t{:<14}\t{:>6}\t{:>8}", "Total", "", "", total);
    }
}

impl PrintFormatted for Funeral {
    fn print_formatted(&self) {
        let deceased = match self.deceased_id {
            Some(id) => id.to_string(),
            None => "-".to_string(),
        };
        let extra_due = match self.extra_due {
            Some(amount) => amount.to_string(),
            None => "-".to_string(),
        };
        println!("ID:\t\t\t{}", self.id);
        println!("Date:\t\t\t{}", self.date);
        println!("Reported by:\t\t{}", self.member_id);
        println!("Deceased:\t\t{}", deceased);
        println!("Cemetery Work:\t\t{}", roster(&self.cemetery_assignments));
        println!("Funeral Work:\t\t{}", roster(&self.funeral_assignments));
        println!("Removed:\t\t{}", roster(&self.removed_members));
        println!("Absent:\t\t\t{}", roster(&self.event_absents));
        println!("Absent (Funeral Work):\t{}", roster(&self.funeral_work_absents));
        println!("Absent (Cemetery Work):\t{}", roster(&self.cemetery_work_absents));
        println!("Extra Due:\t\t{}", extra_due);
    }
}

impl PrintFormatted for Settings {
    fn print_formatted(&self) {
        println!("Funeral:\t\t{}", self.funeral_fine);
        println!("Funeral Work:\t\t{}", self.funeral_work_fine);
        println!("Cemetery Work:\t\t{}", self.cemetery_work_fine);
        println!("Common Work:\t\t{}", self.common_work_fine);
    }
}

impl PrintFormatted for (Settings, Settings) {
    fn print_formatted(&self) {
        let (old, new) = self;
        let next = next_attr!(old, new, funeral_fine);
        println!("Funeral:\t\t{}{}", old.funeral_fine, next);
        let next = next_attr!(old, new, funeral_work_fine);
        println!("Funeral Work:\t\t{}{}", old.funeral_work_fine, next);
        let next = next_attr!(old, new, cemetery_work_fine);
        println!("Cemetery Work:\t\t{}{}", old.cemetery_work_fine, next);
        let next = next_attr!(old, new, common_work_fine);
        println!("Common Work:\t\t{}{}", old.common_work_fine, next);
    }
}

impl PrintFormatted for MeetingReport {
    fn print_formatted(&self) {
        let action = if self.created { "created" } else { "updated" };
        println!("Meeting {} {}.", self.meeting_id, action);
        println!("Fines added:\t\t{}", self.fines_added);
        println!("Fines removed:\t\t{}", self.fines_removed);
    }
}

impl PrintFormatted for AttendanceReport {
    fn print_formatted(&self) {
        println!("Fines added:\t\t{}", self.fines_added);
        println!("Fines removed:\t\t{}", self.fines_removed);
        println!("Exempt:\t\t\t{}", self.excluded_from_fines);
        println!("Holding work fine:\t{}", self.excluded_due_to_work_fines);
    }
}

impl PrintFormatted for WorkReport {
    fn print_formatted(&self) {
        println!(
            "Funeral work fines:\t+{} -{}",
            self.funeral_work.added, self.funeral_work.removed
        );
        println!(
            "Cemetery work fines:\t+{} -{}",
            self.cemetery_work.added, self.cemetery_work.removed
        );
        println!("Replaced attendance:\t{}", self.event_fines_removed);
    }
}

impl PrintFormatted for ExtraDueReport {
    fn print_formatted(&self) {
        println!("Fines added:\t\t{}", self.fines_added);
        println!("Fines removed:\t\t{}", self.fines_removed);
    }
}

impl PrintFormatted for CommonWorkReport {
    fn print_formatted(&self) {
        let action = if self.created { "created" } else { "updated" };
        println!("Common work {} {}.", self.common_work_id, action);
        println!("Fines added:\t\t{}", self.fines_added);
        println!("Fines removed:\t\t{}", self.fines_removed);
        println!(
            "Attendance:\t\t{} of {} ({} absent)",
            self.stats.present_count, self.stats.total_members, self.stats.absent_count,
        );
    }
}
