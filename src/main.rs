// src/main.rs

use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::{Result, eyre};
use tokio::time::sleep;

use palisade::{InMemoryJobStore, ScanEngine, ScanStatus, logging};

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Runs one scan from the command line: create the job, poll until it
/// reaches a terminal state, print the record as JSON.
#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    logging::initialize_logging()?;

    let target = std::env::args()
        .nth(1)
        .ok_or_else(|| eyre!("usage: palisade <target-host-or-url>"))?;

    let engine = ScanEngine::new(Arc::new(InMemoryJobStore::new()));
    let scan_id = engine.create_scan(&target, "cli").await?;
    eprintln!("scan {} started against {}", scan_id, target);

    let job = loop {
        let job = engine.get_scan_status(&scan_id).await?;
        if job.status.is_terminal() {
            break job;
        }
        sleep(POLL_INTERVAL).await;
    };
    engine.shutdown().await;

    println!("{}", serde_json::to_string_pretty(&job)?);
    if job.status == ScanStatus::Failed {
        return Err(eyre!(job.error.unwrap_or_else(|| "scan failed".to_string())));
    }
    Ok(())
}
