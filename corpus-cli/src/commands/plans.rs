//! `corpus plans list|add|edit|move|delete`

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use corpus_core::{Identified, Plan, PlanPatch};

use super::ordered::{self, DeleteArgs, ListArgs, MoveArgs};
use crate::backoffice::Backoffice;

/// Manage membership plans.
#[derive(Subcommand, Debug)]
pub enum PlansCommand {
    /// List plans in display order.
    List(ListArgs),

    /// Add a plan at the end of the list.
    Add(AddPlanArgs),

    /// Change fields of an existing plan.
    Edit(EditPlanArgs),

    /// Swap a plan with its neighbour.
    Move(MoveArgs),

    /// Delete a plan permanently.
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
pub struct AddPlanArgs {
    /// Display name, e.g. "Musculação | Anual".
    #[arg(long)]
    pub name: String,

    /// Price label, e.g. "R$ 109,00/mês".
    #[arg(long)]
    pub price: String,

    /// One feature line; repeat for several.
    #[arg(long = "feature", value_name = "TEXT")]
    pub features: Vec<String>,

    /// Render with an accent border.
    #[arg(long)]
    pub highlight: bool,

    /// Flag as the recommended plan.
    #[arg(long)]
    pub special: bool,
}

#[derive(Args, Debug)]
pub struct EditPlanArgs {
    /// Plan id as shown by `corpus plans list`.
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub price: Option<String>,

    /// Replaces all feature lines; repeat for several.
    #[arg(long = "feature", value_name = "TEXT")]
    pub features: Option<Vec<String>>,

    /// Remove every feature line.
    #[arg(long, conflicts_with = "features")]
    pub clear_features: bool,

    #[arg(long, value_name = "BOOL")]
    pub highlight: Option<bool>,

    #[arg(long, value_name = "BOOL")]
    pub special: Option<bool>,
}

impl EditPlanArgs {
    fn patch(&self) -> PlanPatch {
        let features = if self.clear_features {
            Some(Vec::new())
        } else {
            self.features.clone()
        };
        PlanPatch {
            name: self.name.clone(),
            price: self.price.clone(),
            features,
            highlight: self.highlight,
            special: self.special,
            order: None,
        }
    }
}

pub async fn run(cmd: PlansCommand) -> Result<()> {
    let office = Backoffice::open()?;
    match cmd {
        PlansCommand::List(args) => ordered::list::<Plan>(&office, args, print_table).await,
        PlansCommand::Add(args) => {
            let label = args.name.clone();
            let plan = Plan {
                name: args.name,
                price: args.price,
                features: args.features,
                highlight: args.highlight,
                special: args.special,
                order: 0,
            };
            ordered::create(&office, plan, &label).await
        }
        PlansCommand::Edit(args) => {
            let patch = args.patch();
            ordered::update::<Plan>(&office, args.id, patch).await
        }
        PlansCommand::Move(args) => ordered::reorder::<Plan>(&office, args).await,
        PlansCommand::Delete(args) => {
            ordered::delete::<Plan>(&office, args, |plan| plan.name.clone()).await
        }
    }
}

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "order")]
    order: u32,
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "price")]
    price: String,
    #[tabled(rename = "features")]
    features: String,
    #[tabled(rename = "flags")]
    flags: String,
}

pub fn print_table(plans: &[Identified<Plan>]) {
    if plans.is_empty() {
        println!("No plans yet. Add one with `corpus plans add --name ... --price ...`.");
        return;
    }
    let rows: Vec<PlanRow> = plans
        .iter()
        .map(|plan| PlanRow {
            order: plan.record.order,
            id: plan.id.to_string(),
            name: plan.record.name.clone(),
            price: plan.record.price.clone(),
            features: plan.record.features.join("\n"),
            flags: flags(&plan.record),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

fn flags(plan: &Plan) -> String {
    let mut flags = Vec::new();
    if plan.highlight {
        flags.push("highlight".yellow().to_string());
    }
    if plan.special {
        flags.push("special".green().bold().to_string());
    }
    flags.join(" ")
}
