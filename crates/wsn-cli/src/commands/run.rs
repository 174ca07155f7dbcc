//! `wsn run`: drive one deployment through the full monitoring lifecycle.
//!
//! The operator deploys the contract and performs deployment, estimation and
//! the anomaly check; the supervisor completes deployment and acts on the
//! anomaly; both then read the dashboard.

use crate::config::WsnConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use wsn_core::{Address, ControllerSnapshot};
use wsn_ledger::{
    ContractId, InMemoryLedger, JournalStore, LedgerTransport, Mutation, Query, QueryValue,
};

/// Estimate recorded when none is given on the command line
pub const DEFAULT_ESTIMATE: i64 = 83;

/// One dashboard read made during the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadResult {
    pub function: &'static str,
    pub caller: Address,
    pub value: QueryValue,
}

/// What a run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub contract: ContractId,
    pub reads: Vec<ReadResult>,
    pub snapshot: ControllerSnapshot,
    pub journal: Option<PathBuf>,
}

pub async fn run(config: &WsnConfig, estimate: i64, journal: Option<&Path>) -> Result<RunReport> {
    let controller_config = config
        .controller_config()
        .context("Invalid controller configuration")?;
    let operator = config.roles.operator;
    let supervisor = config.roles.supervisor;

    let ledger = InMemoryLedger::new();
    let contract = ledger.deploy(operator, controller_config).await?;
    tracing::info!(%contract, "Contract deployed");

    submit(&ledger, contract, operator, Mutation::DeployPlugAndPlay).await?;
    tracing::info!("WSN deployed in plug and play operation");

    submit(&ledger, contract, operator, Mutation::SetEstimationState).await?;
    tracing::info!("State of WSN recorded");

    submit(
        &ledger,
        contract,
        operator,
        Mutation::RecordStateEstimate { value: estimate },
    )
    .await?;
    tracing::info!(estimate, "State estimate has been recorded");

    submit(&ledger, contract, operator, Mutation::CheckForAnomalies).await?;
    tracing::info!("Anomaly check completed");

    submit(&ledger, contract, supervisor, Mutation::DeployFully).await?;
    tracing::info!("WSN fully deployed");

    let detected = ledger
        .snapshot(contract)
        .await?
        .anomaly
        .is_some_and(|record| record.detected);
    if detected {
        submit(&ledger, contract, supervisor, Mutation::RaiseAlarm).await?;
        tracing::info!("Alarm raised");

        submit(&ledger, contract, supervisor, Mutation::ConfirmAnomalies).await?;
        tracing::info!("Anomalies confirmed");
    } else {
        tracing::info!("No anomaly detected, alarm not raised");
    }

    let reads = [
        (operator, Query::ViewEstimate),
        (operator, Query::ViewStateOfWsn),
        (operator, Query::ViewStateOfEstimate),
        (supervisor, Query::ViewTimesVisited { address: operator }),
        (operator, Query::ViewAnomalyDetected),
        (operator, Query::ViewAnomalyType),
    ];
    let mut results = Vec::with_capacity(reads.len());
    for (caller, query) in reads {
        let value = ledger
            .query(contract, caller, query)
            .await
            .with_context(|| format!("{} failed", query.name()))?;
        tracing::info!(function = query.name(), %caller, %value, "Read");
        results.push(ReadResult {
            function: query.name(),
            caller,
            value,
        });
    }

    let journal = match journal.or(config.ledger.journal.as_deref()) {
        Some(path) => {
            JournalStore::new(path).save(&ledger.export_journal().await)?;
            tracing::info!(path = %path.display(), "Journal written");
            Some(path.to_path_buf())
        }
        None => None,
    };

    Ok(RunReport {
        contract,
        reads: results,
        snapshot: ledger.snapshot(contract).await?,
        journal,
    })
}

async fn submit(
    ledger: &InMemoryLedger,
    contract: ContractId,
    caller: Address,
    mutation: Mutation,
) -> Result<()> {
    let receipt = ledger
        .submit(contract, caller, mutation)
        .await
        .with_context(|| format!("{} failed", mutation.name()))?;
    tracing::debug!(
        sequence = receipt.sequence,
        phase = %receipt.phase,
        "{} committed",
        mutation.name()
    );
    Ok(())
}

/// Print each read the way the dashboard shows it.
pub fn print(report: &RunReport) {
    println!("Contract deployed to {}", report.contract);
    for read in &report.reads {
        println!("{}: {}", read.function, read.value);
    }
    if let Some(path) = &report.journal {
        println!("Journal written to {}", path.display());
    }
}
