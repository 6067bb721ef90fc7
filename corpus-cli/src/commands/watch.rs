//! `corpus watch plans|team|registrations`

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;
use colored::Colorize;

use corpus_core::{Collection, Identified, Plan, Record, Registration, TeamMember};
use corpus_service::{mount, LiveHandle};
use corpus_store::watch_store_dir;

use super::{plans, registrations, team};
use crate::backoffice::Backoffice;

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// plans | team | registrations
    pub collection: Collection,
}

impl WatchArgs {
    pub async fn run(self) -> Result<()> {
        let office = Backoffice::open()?;
        if self.collection == Collection::Registrations {
            office.require_admin()?;
        }

        // Writes from other `corpus` processes land on disk; follow them.
        let _watcher = watch_store_dir(Arc::clone(&office.store))
            .context("failed to watch the store directory")?;

        let _view = match self.collection {
            Collection::Plans => view::<Plan>(&office, plans::print_table)?,
            Collection::Team => view::<TeamMember>(&office, team::print_table)?,
            Collection::Registrations => {
                view::<Registration>(&office, registrations::print_table)?
            }
        };
        eprintln!("{}", "Watching; press Ctrl-C to stop.".bright_black());

        tokio::signal::ctrl_c()
            .await
            .context("failed to listen for Ctrl-C")?;
        Ok(())
    }
}

fn view<R: Record>(office: &Backoffice, print: fn(&[Identified<R>])) -> Result<LiveHandle> {
    let collection = R::COLLECTION;
    mount::<R, _>(office.store.as_ref(), move |snapshot| {
        println!(
            "{}",
            format!(
                "── {collection} @ {} ({} records)",
                Local::now().format("%H:%M:%S"),
                snapshot.len()
            )
            .bold()
        );
        print(&snapshot);
    })
    .with_context(|| format!("failed to subscribe to {collection}"))
}
