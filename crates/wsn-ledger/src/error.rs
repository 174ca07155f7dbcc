//! Error types for the ledger transport

use crate::transport::ContractId;
use thiserror::Error;
use wsn_core::ControllerError;

/// Ledger error types
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The controller rejected the call
    #[error(transparent)]
    Controller(#[from] ControllerError),

    /// No controller deployed under this id
    #[error("Unknown contract: {0}")]
    UnknownContract(ContractId),

    /// Journal storage operation failed
    #[error("Storage failed: {0}")]
    Storage(String),

    /// Journal encoding or decoding failed
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Re-deploying a journaled deployment produced a different contract id
    #[error("Deployment {index} diverged: recorded {expected}, replayed {actual}")]
    DeploymentDivergence {
        /// Position of the deployment in the journal, starting at 0
        index: usize,
        /// Id recorded in the journal
        expected: ContractId,
        /// Id the replay produced
        actual: ContractId,
    },

    /// Re-applying a journal produced a different outcome than recorded
    #[error("Replay diverged at {contract} sequence {sequence}: {message}")]
    ReplayDivergence {
        /// Contract whose history diverged
        contract: ContractId,
        /// Sequence number of the first divergent entry
        sequence: u64,
        /// What differed
        message: String,
    },
}

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

impl LedgerError {
    /// Create a storage error
    pub fn storage_failed(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a serialization error
    pub fn serialization_failed(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Create a replay divergence error
    pub fn replay_divergence(contract: ContractId, sequence: u64, msg: impl Into<String>) -> Self {
        Self::ReplayDivergence {
            contract,
            sequence,
            message: msg.into(),
        }
    }

    /// Create a deployment divergence error
    pub fn deployment_divergence(index: usize, expected: ContractId, actual: ContractId) -> Self {
        Self::DeploymentDivergence {
            index,
            expected,
            actual,
        }
    }

    /// The controller error behind this failure, if the controller rejected the call.
    pub fn controller_error(&self) -> Option<&ControllerError> {
        match self {
            Self::Controller(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization_failed(err.to_string())
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        Self::storage_failed(err.to_string())
    }
}
