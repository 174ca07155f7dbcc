//! Append-only call journal and its on-disk store.

use crate::call::{Call, CallOutcome};
use crate::error::{LedgerError, Result};
use crate::transport::ContractId;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use wsn_core::{Address, ControllerConfig};

/// A controller deployment, in deployment order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    /// Id assigned at deployment
    pub contract: ContractId,
    /// Address that requested the deployment
    pub deployer: Address,
    /// Configuration the controller was built from
    pub config: ControllerConfig,
}

/// One sequenced call and what came of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Per-contract position, starting at 0
    pub sequence: u64,
    /// Contract the call was addressed to
    pub contract: ContractId,
    /// Address the call is attributed to
    pub caller: Address,
    /// The call with its arguments
    pub call: Call,
    /// Committed result or rejection
    pub outcome: CallOutcome,
}

/// Everything a transport needs to rebuild its controllers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerJournal {
    /// Deployments, in deployment order
    pub deployments: Vec<Deployment>,
    /// Entries across all contracts, in commit order
    pub entries: Vec<JournalEntry>,
}

impl LedgerJournal {
    /// An empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries recorded for one contract.
    pub fn entries_for(&self, contract: ContractId) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter().filter(move |e| e.contract == contract)
    }

    /// Entries the controller refused.
    pub fn rejected(&self) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter().filter(|e| e.outcome.is_rejected())
    }

    /// True when nothing was deployed or called.
    pub fn is_empty(&self) -> bool {
        self.deployments.is_empty() && self.entries.is_empty()
    }
}

/// JSON file holding a [`LedgerJournal`].
#[derive(Debug, Clone)]
pub struct JournalStore {
    path: PathBuf,
}

impl JournalStore {
    /// Store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the journal file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the journal, creating parent directories as needed.
    ///
    /// The JSON goes to a temporary file in the target directory, which is
    /// then renamed over the target, so readers see the old journal or the
    /// new one and never a partial write.
    pub fn save(&self, journal: &LedgerJournal) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| {
            LedgerError::storage_failed(format!("Failed to create {}: {e}", dir.display()))
        })?;

        let content = serde_json::to_string_pretty(journal)?;
        let mut staged = NamedTempFile::new_in(dir).map_err(|e| {
            LedgerError::storage_failed(format!("Failed to stage journal in {}: {e}", dir.display()))
        })?;
        staged
            .write_all(content.as_bytes())
            .and_then(|()| staged.as_file().sync_all())
            .map_err(|e| {
                LedgerError::storage_failed(format!(
                    "Failed to write {}: {e}",
                    staged.path().display()
                ))
            })?;
        staged.persist(&self.path).map_err(|e| {
            LedgerError::storage_failed(format!("Failed to replace {}: {}", self.path.display(), e.error))
        })?;

        tracing::debug!(
            path = %self.path.display(),
            deployments = journal.deployments.len(),
            entries = journal.entries.len(),
            "Journal saved"
        );
        Ok(())
    }

    /// Read and parse the journal file.
    pub fn load(&self) -> Result<LedgerJournal> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            LedgerError::storage_failed(format!("Failed to read {}: {e}", self.path.display()))
        })?;
        let journal: LedgerJournal = serde_json::from_str(&content).map_err(|e| {
            LedgerError::serialization_failed(format!(
                "Failed to parse {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(journal)
    }
}
