//! `corpus slots <YYYY-MM-DD>`

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::Args;
use colored::Colorize;

use corpus_core::{available_slots, config, BookingPolicy};

#[derive(Args, Debug)]
pub struct SlotsArgs {
    /// Date to look up.
    #[arg(value_name = "YYYY-MM-DD")]
    pub date: NaiveDate,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl SlotsArgs {
    pub fn run(self) -> Result<()> {
        let slots = available_slots(self.date);
        if self.json {
            let labels: Vec<String> = slots.iter().map(ToString::to_string).collect();
            println!("{}", serde_json::to_string(&labels)?);
            return Ok(());
        }

        if slots.is_empty() {
            println!("{} is a Sunday: no trial classes.", self.date);
            return Ok(());
        }
        let labels: Vec<String> = slots.iter().map(ToString::to_string).collect();
        println!("{} ({})", self.date, self.date.format("%A"));
        println!("  {}", labels.join("  "));

        let policy = config::load()
            .map(|cfg| BookingPolicy::from(&cfg))
            .unwrap_or_default();
        let today = Local::now().date_naive();
        let latest = policy.latest_day(today)?;
        if self.date < today || self.date > latest {
            println!(
                "{}",
                format!("  outside the booking window ({today} to {latest})").yellow()
            );
        }
        Ok(())
    }
}
