//! `corpus register --name --email --phone --plan [--date] [--time]`

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;

use corpus_core::{RegistrationForm, TimeSlot};

use crate::backoffice::Backoffice;

/// Submit a registration. Trial-class bookings need `--date` and `--time`.
#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub phone: String,

    /// Plan label, e.g. "Musculação | Mensal" or "Aula Experimental".
    #[arg(long)]
    pub plan: String,

    /// Preferred trial date (YYYY-MM-DD).
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub date: Option<NaiveDate>,

    /// Preferred trial time (HH:MM); see `corpus slots <date>`.
    #[arg(long, value_name = "HH:MM")]
    pub time: Option<TimeSlot>,
}

impl RegisterArgs {
    pub async fn run(self) -> Result<()> {
        let office = Backoffice::open()?;
        let form = RegistrationForm {
            name: self.name,
            email: self.email,
            phone: self.phone,
            plan: self.plan,
            preferred_date: self.date,
            preferred_time: self.time,
        };
        let saved = office
            .intake()
            .submit(form)
            .await
            .context("registration rejected")?;

        println!("✓ Registration received for {} ({})", saved.record.name, saved.id);
        if let (Some(date), Some(time)) = (saved.record.preferred_date, saved.record.preferred_time) {
            println!("  Trial class: {} at {time}", date.format("%d/%m/%Y"));
        }
        Ok(())
    }
}
