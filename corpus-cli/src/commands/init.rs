//! `corpus init --email <admin> [--password <pw>]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use corpus_core::config::{self, AdminAccount};

use crate::prompt;

/// Create or update an admin account.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Admin email used to sign in.
    #[arg(long)]
    pub email: String,

    /// Admin password. Prompted for when omitted.
    #[arg(long)]
    pub password: Option<String>,

    /// Keep collection files here instead of ~/.corpus/store.
    #[arg(long, value_name = "DIR")]
    pub store_dir: Option<PathBuf>,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let home = config::home().context("could not determine home directory")?;
        let mut cfg = config::load_at(&home).context("failed to load ~/.corpus/config.yaml")?;

        let password = prompt::password(self.password)?;
        anyhow::ensure!(!password.is_empty(), "password must not be empty");

        let email = self.email.trim().to_string();
        anyhow::ensure!(!email.is_empty(), "email must not be empty");
        cfg.upsert_admin(AdminAccount::new(email.clone(), &password)?);
        if let Some(dir) = self.store_dir {
            cfg.store_dir = Some(dir);
        }
        config::save_at(&home, &cfg).context("failed to write ~/.corpus/config.yaml")?;

        println!("✓ Admin '{email}' saved");
        println!("  Config: {}", config::config_path_at(&home).display());
        println!("  Store:  {}", cfg.store_dir_at(&home).display());
        Ok(())
    }
}
