//! `wsn replay`: rebuild controllers from a saved journal.

use anyhow::{Context, Result};
use std::path::Path;
use wsn_core::ControllerSnapshot;
use wsn_ledger::{ContractId, InMemoryLedger, JournalStore, LedgerTransport};

/// Replay the journal at `path` and return each contract's final state.
pub async fn run(path: &Path) -> Result<Vec<(ContractId, ControllerSnapshot)>> {
    let journal = JournalStore::new(path)
        .load()
        .with_context(|| format!("Failed to load journal {}", path.display()))?;
    let ledger = InMemoryLedger::replay(&journal)
        .await
        .context("Journal replay failed")?;

    let mut snapshots = Vec::with_capacity(journal.deployments.len());
    for deployment in &journal.deployments {
        let snapshot = ledger.snapshot(deployment.contract).await?;
        snapshots.push((deployment.contract, snapshot));
    }
    Ok(snapshots)
}

/// Print snapshots as pretty JSON keyed by contract id.
pub fn print(snapshots: &[(ContractId, ControllerSnapshot)]) -> Result<()> {
    let map: serde_json::Map<String, serde_json::Value> = snapshots
        .iter()
        .map(|(id, snapshot)| serde_json::to_value(snapshot).map(|value| (id.to_string(), value)))
        .collect::<serde_json::Result<_>>()?;
    println!("{}", serde_json::to_string_pretty(&map)?);
    Ok(())
}
