//! `cidades states` — list the available states.

use crate::locations::LocationDirectory;
use anyhow::{Context, Result};

pub async fn run() -> Result<()> {
    let directory = LocationDirectory::from_env();
    let states = directory
        .list_states()
        .await
        .context("could not fetch the state list")?;

    for s in &states {
        println!("{:>2} — {} ({})", s.id, s.name, s.abbreviation);
    }
    Ok(())
}
