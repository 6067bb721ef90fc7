//! Corpus Gym back office CLI.
//!
//! # Usage
//!
//! ```text
//! corpus init --email <admin> [--password <pw>]
//! corpus login <email> [--password <pw>] | logout | whoami
//! corpus plans list [--json] | add ... | edit <id> ... | move <id> up|down | delete <id> [--yes]
//! corpus team  list [--json] | add ... | edit <id> ... | move <id> up|down | delete <id> [--yes]
//! corpus register --name <n> --email <e> --phone <p> --plan <label> [--date YYYY-MM-DD] [--time HH:MM]
//! corpus slots <YYYY-MM-DD>
//! corpus registrations [--json]
//! corpus watch plans|team|registrations
//! ```

mod backoffice;
mod commands;
mod prompt;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    init::InitArgs,
    plans::PlansCommand,
    register::RegisterArgs,
    registrations::RegistrationsArgs,
    session::LoginArgs,
    slots::SlotsArgs,
    team::TeamCommand,
    watch::WatchArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "corpus",
    version,
    about = "Manage plans, team and registrations of the Corpus Gym site",
    long_about = None,
)]
struct Cli {
    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create or update an admin account in ~/.corpus/config.yaml.
    Init(InitArgs),

    /// Sign in as an admin.
    Login(LoginArgs),

    /// Sign out of the current admin session.
    Logout,

    /// Show who is signed in.
    Whoami,

    /// Manage membership plans.
    Plans {
        #[command(subcommand)]
        command: PlansCommand,
    },

    /// Manage team members.
    Team {
        #[command(subcommand)]
        command: TeamCommand,
    },

    /// Submit a registration (or trial-class booking).
    Register(RegisterArgs),

    /// List trial-class slots for a date.
    Slots(SlotsArgs),

    /// List registrations, newest first (admin).
    Registrations(RegistrationsArgs),

    /// Stream live snapshots of a collection until interrupted.
    Watch(WatchArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Login(args) => args.run().await,
        Commands::Logout => commands::session::logout().await,
        Commands::Whoami => commands::session::whoami(),
        Commands::Plans { command } => commands::plans::run(command).await,
        Commands::Team { command } => commands::team::run(command).await,
        Commands::Register(args) => args.run().await,
        Commands::Slots(args) => args.run(),
        Commands::Registrations(args) => args.run().await,
        Commands::Watch(args) => args.run().await,
    }
}

/// Logs go to stderr so stdout stays parseable. `RUST_LOG` overrides the
/// default `warn` level.
fn init_tracing(json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
