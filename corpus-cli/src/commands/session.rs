//! `corpus login`, `corpus logout`, `corpus whoami`

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use crate::backoffice::Backoffice;
use crate::prompt;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Admin email.
    pub email: String,

    /// Password. Prompted for when omitted.
    #[arg(long)]
    pub password: Option<String>,
}

impl LoginArgs {
    pub async fn run(self) -> Result<()> {
        let office = Backoffice::open()?;
        let password = prompt::password(self.password)?;
        let user = office
            .gate
            .sign_in(&self.email, &password)
            .await
            .context("sign in failed")?;
        println!("✓ Signed in as {}", user.email.bold());
        Ok(())
    }
}

pub async fn logout() -> Result<()> {
    let office = Backoffice::open()?;
    office.gate.sign_out().await;
    if let Some(user) = office.persisted_session() {
        bail!(
            "could not clear the session for {}; delete ~/.corpus/session.json by hand",
            user.email
        );
    }
    println!("✓ Signed out");
    Ok(())
}

pub fn whoami() -> Result<()> {
    let office = Backoffice::open()?;
    match office.gate.current_user() {
        Some(user) => println!(
            "{} (since {})",
            user.email,
            user.signed_in_at.format("%Y-%m-%d %H:%M UTC")
        ),
        None => println!("{}", "Not signed in.".bright_black()),
    }
    Ok(())
}
