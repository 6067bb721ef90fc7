//! `corpus registrations [--json]`

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;
use tabled::{settings::Style, Table, Tabled};

use corpus_core::{Identified, Registration};

use crate::backoffice::Backoffice;

#[derive(Args, Debug)]
pub struct RegistrationsArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl RegistrationsArgs {
    pub async fn run(self) -> Result<()> {
        let office = Backoffice::open()?;
        office.require_admin()?;
        let registrations = office
            .intake()
            .recent()
            .await
            .context("failed to load registrations")?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&registrations).context("failed to serialize JSON")?
            );
        } else {
            print_table(&registrations);
        }
        Ok(())
    }
}

#[derive(Tabled)]
struct RegistrationRow {
    #[tabled(rename = "received")]
    received: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "email")]
    email: String,
    #[tabled(rename = "phone")]
    phone: String,
    #[tabled(rename = "plan")]
    plan: String,
    #[tabled(rename = "trial")]
    trial: String,
}

pub fn print_table(registrations: &[Identified<Registration>]) {
    if registrations.is_empty() {
        println!("No registrations yet.");
        return;
    }
    let rows: Vec<RegistrationRow> = registrations
        .iter()
        .map(|Identified { record, .. }| RegistrationRow {
            received: record
                .registration_date
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M")
                .to_string(),
            name: record.name.clone(),
            email: record.email.clone(),
            phone: record.phone.clone(),
            plan: record.plan.clone(),
            trial: match (record.preferred_date, record.preferred_time) {
                (Some(date), Some(time)) => format!("{date} {time}"),
                _ => "-".to_string(),
            },
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
