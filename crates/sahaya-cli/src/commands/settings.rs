use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};
use inquire::Confirm;

use sahaya_data::Update;
use sahaya_db::Connection;
use sahaya_reconcile::settings::SettingsCache;

use crate::formatting::PrintFormatted;

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Show fine amounts
    #[clap(name = "show")]
    Show,
    /// Change fine amounts
    #[clap(name = "set")]
    Set(SetFines),
}

impl SettingsCommand {
    pub async fn run(self, db: &Connection, settings: &SettingsCache) -> Result<()> {
        match self {
            SettingsCommand::Show => {
                settings.get(db).await?.print_formatted();
                Ok(())
            }
            SettingsCommand::Set(cmd) => cmd.run(db, settings).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct SetFines {
    #[clap(long)]
    pub funeral: Option<i64>,
    #[clap(long)]
    pub funeral_work: Option<i64>,
    #[clap(long)]
    pub cemetery_work: Option<i64>,
    #[clap(long)]
    pub common_work: Option<i64>,
}

impl SetFines {
    pub async fn run(self, db: &Connection, settings: &SettingsCache) -> Result<()> {
        let current = settings.refresh(db).await?;
        let mut update = current.clone();
        if let Some(amount) = self.funeral {
            update.funeral_fine = amount;
        }
        if let Some(amount) = self.funeral_work {
            update.funeral_work_fine = amount;
        }
        if let Some(amount) = self.cemetery_work {
            update.cemetery_work_fine = amount;
        }
        if let Some(amount) = self.common_work {
            update.common_work_fine = amount;
        }
        let amounts = [
            update.funeral_fine,
            update.funeral_work_fine,
            update.cemetery_work_fine,
            update.common_work_fine,
        ];
        if amounts.iter().any(|amount| *amount < 0) {
            return Err(anyhow!("Fine amounts must not be negative."));
        }

        println!();
        (current, update.clone()).print_formatted();
        println!();
        let confirm = Confirm::new("Update fine amounts?").with_default(true);
        if !confirm.prompt()? {
            return Ok(());
        }

        db.update(update).await?;
        settings.invalidate().await;
        Ok(())
    }
}
