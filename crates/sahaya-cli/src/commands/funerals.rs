use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use inquire::Confirm;

use sahaya_data::{Funeral, MemberId, Retrieve, Roster};
use sahaya_db::Connection;
use sahaya_reconcile::{
    funerals::{
        create_funeral, levy_extra_due, record_attendance, record_work, ExtraDue,
        FuneralAttendance, FuneralWorkRoster, NewFuneral,
    },
    settings::SettingsCache,
};

use crate::formatting::PrintFormatted;

#[derive(Subcommand, Debug)]
pub enum Funerals {
    /// Register a funeral
    #[clap(name = "create")]
    Create(CreateFuneral),
    /// Save the attendance roster of a funeral
    #[clap(name = "attendance")]
    Attendance(RecordAttendance),
    /// Save the work rosters of a funeral
    #[clap(name = "work")]
    Work(RecordWork),
    /// Levy an extra due for a funeral
    #[clap(name = "extra-due")]
    ExtraDue(LevyExtraDue),
}

impl Funerals {
    pub async fn run(self, db: &Connection, settings: &SettingsCache) -> Result<()> {
        match self {
            Funerals::Create(cmd) => cmd.run(db).await,
            Funerals::Attendance(cmd) => cmd.run(db, settings).await,
            Funerals::Work(cmd) => cmd.run(db, settings).await,
            Funerals::ExtraDue(cmd) => cmd.run(db).await,
        }
    }
}

fn confirm(funeral: &Funeral, question: &str) -> Result<bool> {
    println!();
    funeral.print_formatted();
    println!();
    Ok(Confirm::new(question).with_default(true).prompt()?)
}

#[derive(Args, Debug)]
pub struct CreateFuneral {
    #[clap(short, long)]
    pub date: NaiveDate,
    /// Reporting member
    #[clap(short, long)]
    pub member: MemberId,
    #[clap(long)]
    pub deceased: Option<MemberId>,
    /// Members assigned to cemetery work
    #[clap(long, value_delimiter = ',')]
    pub cemetery: Vec<MemberId>,
    /// Members assigned to funeral work
    #[clap(long, value_delimiter = ',')]
    pub funeral: Vec<MemberId>,
    /// Members excused from the funeral
    #[clap(long, value_delimiter = ',')]
    pub removed: Vec<MemberId>,
}

impl CreateFuneral {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let cemetery: Roster = self.cemetery.into_iter().collect();
        let funeral: Roster = self.funeral.into_iter().collect();
        let removed: Roster = self.removed.into_iter().collect();
        let preview = Funeral {
            date: self.date,
            member_id: self.member,
            deceased_id: self.deceased,
            cemetery_assignments: cemetery.clone(),
            funeral_assignments: funeral.clone(),
            removed_members: removed.clone(),
            ..Default::default()
        };
        if !confirm(&preview, "Register funeral?")? {
            return Ok(());
        }

        let funeral = create_funeral(db, NewFuneral {
            date: Some(self.date),
            member_id: Some(self.member),
            deceased_id: self.deceased,
            cemetery_assignments: cemetery.assignments(),
            funeral_assignments: funeral.assignments(),
            removed_members: removed.assignments(),
        }).await?;
        println!("Funeral registered with id {}.", funeral.id);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct RecordAttendance {
    #[clap(short, long)]
    pub id: u32,
    /// Absent members, comma separated
    #[clap(short, long, value_delimiter = ',')]
    pub absent: Vec<MemberId>,
}

impl RecordAttendance {
    pub async fn run(self, db: &Connection, settings: &SettingsCache) -> Result<()> {
        let funeral: Funeral = db.retrieve(self.id).await?;
        if !confirm(&funeral, "Record attendance?")? {
            return Ok(());
        }

        let report = record_attendance(db, settings, FuneralAttendance {
            funeral_id: Some(self.id),
            absents: Some(self.absent.into_iter().collect()),
        }).await?;
        report.print_formatted();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct RecordWork {
    #[clap(short, long)]
    pub id: u32,
    /// Absent from funeral work; pass without values to clear
    #[clap(long, value_delimiter = ',', num_args = 0..)]
    pub funeral_work: Option<Vec<MemberId>>,
    /// Absent from cemetery work; pass without values to clear
    #[clap(long, value_delimiter = ',', num_args = 0..)]
    pub cemetery_work: Option<Vec<MemberId>>,
}

impl RecordWork {
    pub async fn run(self, db: &Connection, settings: &SettingsCache) -> Result<()> {
        let funeral: Funeral = db.retrieve(self.id).await?;
        if !confirm(&funeral, "Record work rosters?")? {
            return Ok(());
        }

        let report = record_work(db, settings, FuneralWorkRoster {
            funeral_id: Some(self.id),
            funeral_work_absents: self.funeral_work.map(Roster::from),
            cemetery_work_absents: self.cemetery_work.map(Roster::from),
        }).await?;
        report.print_formatted();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct LevyExtraDue {
    #[clap(short, long)]
    pub id: u32,
    #[clap(short, long, required_unless_present = "clear")]
    pub amount: Option<i64>,
    /// Remove the extra due
    #[clap(long, conflicts_with = "amount")]
    pub clear: bool,
}

impl LevyExtraDue {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let funeral: Funeral = db.retrieve(self.id).await?;
        let question = match self.amount {
            Some(amount) => format!("Levy an extra due of {}?", amount),
            None => "Clear the extra due?".to_string(),
        };
        if !confirm(&funeral, &question)? {
            return Ok(());
        }

        let report = levy_extra_due(db, ExtraDue {
            funeral_id: Some(self.id),
            amount: self.amount,
        }).await?;
        report.print_formatted();
        Ok(())
    }
}
