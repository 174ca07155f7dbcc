//! Ledger transport contract
//!
//! A transport hosts deployed controllers, orders every call submitted to
//! them and hands back a receipt or read value. Callers never touch the
//! controller directly.

use crate::call::{Mutation, Query, QueryValue};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use wsn_core::{Address, ControllerConfig, ControllerSnapshot, LifecyclePhase, Operation};

const CONTRACT_PREFIX: &str = "contract-";

/// Identifier of a deployed controller.
///
/// Derived deterministically from the deployer address and the transport's
/// deployment counter, so a replayed journal yields the same ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractId(Uuid);

impl ContractId {
    /// Derive the id of the `nonce`-th deployment made through a transport.
    pub fn derive(deployer: &Address, nonce: u64) -> Self {
        let mut name = Vec::with_capacity(deployer.as_bytes().len() + 8);
        name.extend_from_slice(deployer.as_bytes());
        name.extend_from_slice(&nonce.to_be_bytes());
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, &name))
    }

    /// The underlying UUID.
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CONTRACT_PREFIX}{}", self.0)
    }
}

impl FromStr for ContractId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let raw = s.strip_prefix(CONTRACT_PREFIX).unwrap_or(s);
        Uuid::parse_str(raw).map(Self)
    }
}

/// Acknowledgement of a committed mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Contract the mutation was applied to
    pub contract: ContractId,
    /// Position of the call in the contract's history
    pub sequence: u64,
    /// Address the call is attributed to
    pub caller: Address,
    /// Operation that committed
    pub operation: Operation,
    /// Phase after the mutation committed
    pub phase: LifecyclePhase,
}

/// Ordered, journaled access to deployed controllers.
///
/// Calls to one contract are applied strictly one at a time in submission
/// order. A rejected call is still sequenced and recorded, but leaves the
/// controller unchanged and surfaces as [`LedgerError::Controller`].
///
/// [`LedgerError::Controller`]: crate::LedgerError::Controller
#[async_trait]
pub trait LedgerTransport: Send + Sync {
    /// Deploy a fresh controller bound to the configured roles.
    async fn deploy(&self, deployer: Address, config: ControllerConfig) -> Result<ContractId>;

    /// Submit a state-mutating call.
    async fn submit(
        &self,
        contract: ContractId,
        caller: Address,
        mutation: Mutation,
    ) -> Result<Receipt>;

    /// Submit a read call. Dashboard reads update visit counts, so reads are
    /// ordered alongside mutations.
    async fn query(&self, contract: ContractId, caller: Address, query: Query)
        -> Result<QueryValue>;

    /// Current controller state, without recording a call.
    async fn snapshot(&self, contract: ContractId) -> Result<ControllerSnapshot>;
}
