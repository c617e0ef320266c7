//! Environment readiness check.

use crate::locations::LocationDirectory;
use crate::session::chromium::find_chromium;
use anyhow::Result;

/// Check Chromium availability and lookup-service reachability.
pub async fn run() -> Result<()> {
    println!("cidades doctor");
    println!("==============");
    println!();

    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    println!("OS:   {os}");
    println!("Arch: {arch}");
    println!();

    let chromium_path = find_chromium();
    match &chromium_path {
        Some(path) => println!("[OK] Chromium found: {}", path.display()),
        None => println!(
            "[!!] Chromium NOT found. Install google-chrome or set CIDADES_CHROMIUM_PATH."
        ),
    }

    let directory = LocationDirectory::from_env();
    let lookup_ok = match directory.list_states().await {
        Ok(states) => {
            println!("[OK] Location lookup reachable ({} states)", states.len());
            true
        }
        Err(e) => {
            println!("[!!] Location lookup unreachable: {e}");
            false
        }
    };

    println!();
    if chromium_path.is_some() && lookup_ok {
        println!("Status: READY");
    } else {
        println!("Status: NOT READY");
    }

    Ok(())
}
