//! `corpus team list|add|edit|move|delete`

use anyhow::Result;
use clap::{Args, Subcommand};
use tabled::{settings::Style, Table, Tabled};

use corpus_core::{Identified, TeamMember, TeamMemberPatch};

use super::ordered::{self, DeleteArgs, ListArgs, MoveArgs};
use crate::backoffice::Backoffice;

/// Manage team members shown on the about page.
#[derive(Subcommand, Debug)]
pub enum TeamCommand {
    /// List team members in display order.
    List(ListArgs),

    /// Add a member at the end of the list.
    Add(AddMemberArgs),

    /// Change fields of an existing member.
    Edit(EditMemberArgs),

    /// Swap a member with their neighbour.
    Move(MoveArgs),

    /// Remove a member permanently.
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
pub struct AddMemberArgs {
    #[arg(long)]
    pub name: String,

    /// Job title, e.g. "Personal Trainer".
    #[arg(long)]
    pub role: String,

    /// Absolute http(s) URL of the picture.
    #[arg(long, default_value = "")]
    pub image: String,
}

#[derive(Args, Debug)]
pub struct EditMemberArgs {
    /// Member id as shown by `corpus team list`.
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub role: Option<String>,

    /// New picture URL; pass "" to remove it.
    #[arg(long)]
    pub image: Option<String>,
}

pub async fn run(cmd: TeamCommand) -> Result<()> {
    let office = Backoffice::open()?;
    match cmd {
        TeamCommand::List(args) => ordered::list::<TeamMember>(&office, args, print_table).await,
        TeamCommand::Add(args) => {
            let label = args.name.clone();
            let member = TeamMember {
                name: args.name,
                role: args.role,
                image: args.image,
                order: 0,
            };
            ordered::create(&office, member, &label).await
        }
        TeamCommand::Edit(args) => {
            let patch = TeamMemberPatch {
                name: args.name,
                role: args.role,
                image: args.image,
                order: None,
            };
            ordered::update::<TeamMember>(&office, args.id, patch).await
        }
        TeamCommand::Move(args) => ordered::reorder::<TeamMember>(&office, args).await,
        TeamCommand::Delete(args) => {
            ordered::delete::<TeamMember>(&office, args, |member| member.name.clone()).await
        }
    }
}

#[derive(Tabled)]
struct MemberRow {
    #[tabled(rename = "order")]
    order: u32,
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "role")]
    role: String,
    #[tabled(rename = "image")]
    image: String,
}

pub fn print_table(members: &[Identified<TeamMember>]) {
    if members.is_empty() {
        println!("No team members yet. Add one with `corpus team add --name ... --role ...`.");
        return;
    }
    let rows: Vec<MemberRow> = members
        .iter()
        .map(|member| MemberRow {
            order: member.record.order,
            id: member.id.to_string(),
            name: member.record.name.clone(),
            role: member.record.role.clone(),
            image: if member.record.image.is_empty() {
                "-".to_string()
            } else {
                member.record.image.clone()
            },
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
