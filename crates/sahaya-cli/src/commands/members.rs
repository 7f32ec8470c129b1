use anyhow::{anyhow, Result};
use chrono::Utc;
use clap::{Args, Subcommand};
use inquire::Confirm;

use sahaya_data::{
    Insert, Member, MemberFilter, MemberId, MemberStatus, Query, Retrieve, Role, Update,
};
use sahaya_db::Connection;

use crate::formatting::PrintFormatted;

#[derive(Subcommand, Debug)]
pub enum Members {
    /// Show a member
    #[clap(name = "show")]
    Show(ShowMember),
    /// List members
    #[clap(name = "list")]
    List(ListMembers),
    /// Add a member
    #[clap(name = "add")]
    Add(AddMember),
    /// Update a member
    #[clap(name = "set")]
    Update(UpdateMember),
    /// Show the fines of a member
    #[clap(name = "fines")]
    Fines(MemberFines),
}

impl Members {
    pub async fn run(self, db: &Connection) -> Result<()> {
        match self {
            Members::Show(cmd) => cmd.run(db).await,
            Members::List(cmd) => cmd.run(db).await,
            Members::Add(cmd) => cmd.run(db).await,
            Members::Update(cmd) => cmd.run(db).await,
            Members::Fines(cmd) => cmd.run(db).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ShowMember {
    #[clap(short, long)]
    pub id: MemberId,
}

impl ShowMember {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let member: Member = db.retrieve(self.id).await?;
        println!();
        member.print_formatted();
        println!();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ListMembers {
    #[clap(short, long)]
    pub name: Option<String>,
    #[clap(short, long)]
    pub area: Option<String>,
    /// Include deactivated members
    #[clap(long)]
    pub all: bool,
}

impl ListMembers {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let filter = MemberFilter {
            name: self.name,
            area: self.area,
            active: if self.all { None } else { Some(true) },
            ..Default::default()
        };

        let members: Vec<Member> = db.query(&filter).await?;
        println!("{} members.", members.len());
        members.print_formatted();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct AddMember {
    /// Member number, assigned automatically if omitted
    #[clap(short, long)]
    pub id: Option<MemberId>,
    #[clap(short, long)]
    pub name: String,
    #[clap(short, long, default_value = "")]
    pub area: String,
    #[clap(short, long, default_value = "regular")]
    pub status: MemberStatus,
    #[clap(short, long = "role")]
    pub roles: Vec<Role>,
}

impl AddMember {
    /// Add a member to the database
    pub async fn run(self, db: &Connection) -> Result<()> {
        if let Some(id) = self.id {
            let existing: Vec<Member> = db.query(&MemberFilter {
                id: Some(id),
                ..Default::default()
            }).await?;
            if !existing.is_empty() {
                return Err(anyhow!("Member with id {} already exists.", id));
            }
        }

        let member = Member {
            id: self.id.unwrap_or_default(),
            name: self.name,
            area: self.area,
            status: self.status,
            roles: self.roles.into_iter().collect(),
            ..Default::default()
        };

        println!();
        member.print_formatted();
        println!();

        let confirm = Confirm::new("Add member?").with_default(true);
        if !confirm.prompt()? {
            return Ok(());
        }

        let member = db.insert(member).await?;
        println!("Member added with id {}.", member.id);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct UpdateMember {
    #[clap(short, long)]
    pub id: MemberId,
    #[clap(short, long)]
    pub name: Option<String>,
    #[clap(short, long)]
    pub area: Option<String>,
    #[clap(short, long)]
    pub status: Option<MemberStatus>,
    /// Grant a role
    #[clap(long = "role")]
    pub add_roles: Vec<Role>,
    /// Revoke a role
    #[clap(long = "drop-role")]
    pub drop_roles: Vec<Role>,
    #[clap(long, conflicts_with = "reactivate")]
    pub deactivate: bool,
    #[clap(long)]
    pub reactivate: bool,
}

impl UpdateMember {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let member: Member = db.retrieve(self.id).await?;
        let mut update = member.clone();

        if let Some(name) = self.name {
            update.name = name;
        }
        if let Some(area) = self.area {
            update.area = area;
        }
        if let Some(status) = self.status {
            update.status = status;
        }
        for role in self.add_roles {
            update.roles.insert(role);
        }
        for role in self.drop_roles {
            update.roles.remove(role);
        }
        if self.deactivate && update.deactivated_at.is_none() {
            update.deactivated_at = Some(Utc::now().naive_utc());
        }
        if self.reactivate {
            update.deactivated_at = None;
        }

        println!();
        (member, update.clone()).print_formatted();
        println!();
        let confirm = Confirm::new("Update member?").with_default(true);
        if !confirm.prompt()? {
            return Ok(());
        }

        db.update(update).await?;
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct MemberFines {
    #[clap(short, long)]
    pub id: MemberId,
}

impl MemberFines {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let member: Member = db.retrieve(self.id).await?;
        let fines = member.get_fines(db).await?;
        println!("{} fines for {} ({}).", fines.len(), member.name, member.id);
        fines.print_formatted();
        Ok(())
    }
}
