use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use inquire::Confirm;

use sahaya_data::{MemberId, Roster};
use sahaya_db::Connection;
use sahaya_reconcile::{
    common_works::{record_common_work, CommonWorkRoster},
    settings::SettingsCache,
};

use crate::formatting::PrintFormatted;

#[derive(Subcommand, Debug)]
pub enum CommonWorks {
    /// Save the absentee roster of a communal work day
    #[clap(name = "record")]
    Record(RecordCommonWork),
}

impl CommonWorks {
    pub async fn run(self, db: &Connection, settings: &SettingsCache) -> Result<()> {
        match self {
            CommonWorks::Record(cmd) => cmd.run(db, settings).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct RecordCommonWork {
    #[clap(short, long)]
    pub date: NaiveDate,
    /// Required for a new date
    #[clap(short, long)]
    pub title: Option<String>,
    /// Absent members, comma separated
    #[clap(short, long, value_delimiter = ',')]
    pub absent: Vec<MemberId>,
}

impl RecordCommonWork {
    pub async fn run(self, db: &Connection, settings: &SettingsCache) -> Result<()> {
        let absents: Roster = self.absent.into_iter().collect();

        println!();
        println!("Date:\t\t\t{}", self.date);
        if let Some(title) = &self.title {
            println!("Title:\t\t\t{}", title);
        }
        println!("Absent:\t\t\t{} members", absents.len());
        println!();
        let confirm = Confirm::new("Record common work?").with_default(true);
        if !confirm.prompt()? {
            return Ok(());
        }

        let report = record_common_work(db, settings, CommonWorkRoster {
            date: Some(self.date),
            title: self.title,
            absents: Some(absents),
        }).await?;
        report.print_formatted();
        Ok(())
    }
}
