//! Subcommands shared by `corpus plans` and `corpus team`.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use corpus_core::{Direction, Identified, OrderedRecord, RecordId};
use corpus_service::{OrderedCollection, ReorderOutcome};

use crate::backoffice::Backoffice;
use crate::prompt;

/// `<id> up|down`
#[derive(Args, Debug)]
pub struct MoveArgs {
    /// Record id as shown by `list`.
    pub id: String,

    /// up | down
    pub direction: Direction,
}

/// `<id> [--yes]`
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Record id as shown by `list`.
    pub id: String,

    /// Skip the confirmation prompt.
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// `[--json]`
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

pub async fn list<R>(
    office: &Backoffice,
    args: ListArgs,
    print_table: fn(&[Identified<R>]),
) -> Result<()>
where
    R: OrderedRecord,
    Identified<R>: Serialize,
{
    let service: OrderedCollection<R> = office.collection();
    let records = service
        .list()
        .await
        .with_context(|| format!("failed to list {}", R::COLLECTION))?;
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&records).context("failed to serialize JSON")?
        );
    } else {
        print_table(&records);
    }
    Ok(())
}

pub async fn create<R: OrderedRecord>(office: &Backoffice, record: R, label: &str) -> Result<()> {
    office.require_admin()?;
    let service: OrderedCollection<R> = office.collection();
    let id = service
        .create(record)
        .await
        .with_context(|| format!("failed to add '{label}'"))?;
    println!("✓ Added '{label}' ({id})");
    Ok(())
}

pub async fn update<R: OrderedRecord>(
    office: &Backoffice,
    id: String,
    patch: R::Patch,
) -> Result<()> {
    office.require_admin()?;
    let service: OrderedCollection<R> = office.collection();
    let id = RecordId::from(id);
    service
        .update(&id, patch)
        .await
        .with_context(|| format!("failed to update '{id}'"))?;
    println!("✓ Updated {id}");
    Ok(())
}

pub async fn reorder<R: OrderedRecord>(office: &Backoffice, args: MoveArgs) -> Result<()> {
    office.require_admin()?;
    let service: OrderedCollection<R> = office.collection();
    let id = RecordId::from(args.id);
    let outcome = service
        .reorder(&id, args.direction)
        .await
        .with_context(|| format!("failed to move '{id}' {}", args.direction))?;
    match outcome {
        ReorderOutcome::Moved { with } => println!("✓ Moved {id} {} (swapped with {with})", args.direction),
        ReorderOutcome::Unchanged => println!("{id} is already at the edge; nothing to do"),
    }
    Ok(())
}

pub async fn delete<R: OrderedRecord>(
    office: &Backoffice,
    args: DeleteArgs,
    describe: fn(&R) -> String,
) -> Result<()> {
    office.require_admin()?;
    let service: OrderedCollection<R> = office.collection();
    let id = RecordId::from(args.id);
    let current = service
        .get(&id)
        .await
        .with_context(|| format!("cannot delete '{id}'"))?;
    let label = describe(&current.record);

    if !args.yes && !prompt::confirm(&format!("Delete '{label}' ({id})?"))? {
        println!("Aborted.");
        return Ok(());
    }
    service
        .delete(&id)
        .await
        .with_context(|| format!("failed to delete '{label}'"))?;
    println!("✓ Deleted '{label}'");
    Ok(())
}
