//! `cidades harvest` — collect indicators for every municipality of one
//! state and write the CSV artifact.

use crate::export::write_csv;
use crate::harvest::HarvestOrchestrator;
use crate::locations::{LocationDirectory, StateRecord};
use crate::session::chromium::ChromiumSession;
use anyhow::{anyhow, Context, Result};
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Run the harvest command. Without `--state` the operator picks a state
/// interactively; bad input aborts before any browser work and before
/// the output file is created.
pub async fn run(
    state: Option<&str>,
    output: &Path,
    timeout_secs: u64,
    quiet: bool,
) -> Result<()> {
    let directory = LocationDirectory::from_env();
    let states = directory
        .list_states()
        .await
        .context("could not fetch the state list")?;

    let chosen = match state {
        Some(sigla) => states
            .iter()
            .find(|s| s.abbreviation.eq_ignore_ascii_case(sigla))
            .cloned()
            .ok_or_else(|| anyhow!("unknown state abbreviation {sigla:?}"))?,
        None => prompt_state(&states)?,
    };

    if !quiet {
        println!(
            "Harvesting municipalities of {} ({})",
            chosen.name, chosen.abbreviation
        );
    }

    let session = ChromiumSession::connect()
        .await
        .context("could not start the browser session")?;

    let table = HarvestOrchestrator::new(
        &directory,
        &session,
        Duration::from_secs(timeout_secs),
    )
    .with_progress(!quiet)
    .harvest(&chosen.abbreviation)
    .await?;

    write_csv(output, &table)?;

    let degraded = table.iter().filter(|r| r.is_degraded()).count();
    info!(rows = table.len(), degraded, "harvest complete");
    if !quiet {
        println!(
            "Wrote {} rows ({} degraded) to {}",
            table.len(),
            degraded,
            output.display()
        );
    }

    session.shutdown().await?;
    Ok(())
}

/// Present the state list and read one numeric ID from stdin.
fn prompt_state(states: &[StateRecord]) -> Result<StateRecord> {
    println!("Choose a state by ID:");
    for s in states {
        println!("  {:>2} — {} ({})", s.id, s.name, s.abbreviation);
    }
    print!("State ID: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("failed to read the selection")?;

    parse_selection(&line, states)
}

/// Resolve one line of operator input to a state. Non-numeric input or
/// an unknown ID is fatal; no harvesting may start from a bad selection.
fn parse_selection(input: &str, states: &[StateRecord]) -> Result<StateRecord> {
    let trimmed = input.trim();
    let id: u32 = trimmed
        .parse()
        .map_err(|_| anyhow!("invalid selection {trimmed:?}: expected a numeric state ID"))?;

    states
        .iter()
        .find(|s| s.id == id)
        .cloned()
        .ok_or_else(|| anyhow!("no state with ID {id}"))
}
