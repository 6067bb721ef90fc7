//! Interactive prompts on stdin.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

/// Print `label` to stderr and read one trimmed line from stdin.
pub fn read_line(label: &str) -> Result<String> {
    eprint!("{label}");
    io::stderr().flush().ok();
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    Ok(line.trim().to_string())
}

/// `--password` when given, otherwise ask for it.
pub fn password(given: Option<String>) -> Result<String> {
    match given {
        Some(password) => Ok(password),
        None => read_line("Password: "),
    }
}

/// Yes/no question defaulting to no.
pub fn confirm(question: &str) -> Result<bool> {
    let answer = read_line(&format!("{question} [y/N] "))?;
    Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes" | "s" | "sim"))
}
