use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use inquire::Confirm;

use sahaya_data::{MemberId, Roster};
use sahaya_db::Connection;
use sahaya_reconcile::meetings::{record_meeting, MeetingRoster};

use crate::formatting::PrintFormatted;

#[derive(Subcommand, Debug)]
pub enum Meetings {
    /// Save the absentee roster of a meeting
    #[clap(name = "record")]
    Record(RecordMeeting),
}

impl Meetings {
    pub async fn run(self, db: &Connection) -> Result<()> {
        match self {
            Meetings::Record(cmd) => cmd.run(db).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct RecordMeeting {
    #[clap(short, long)]
    pub date: NaiveDate,
    /// Absent members, comma separated
    #[clap(short, long, value_delimiter = ',')]
    pub absent: Vec<MemberId>,
}

impl RecordMeeting {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let absents: Roster = self.absent.into_iter().collect();

        println!();
        println!("Date:\t\t\t{}", self.date);
        println!("Absent:\t\t\t{} members", absents.len());
        println!();
        let confirm = Confirm::new("Record meeting?").with_default(true);
        if !confirm.prompt()? {
            return Ok(());
        }

        let report = record_meeting(db, MeetingRoster {
            date: Some(self.date),
            absents: Some(absents),
        }).await?;
        report.print_formatted();
        Ok(())
    }
}
