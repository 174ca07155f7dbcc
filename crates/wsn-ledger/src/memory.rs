//! In-memory ledger transport
//!
//! Reference [`LedgerTransport`] for tests, the CLI and journal replay.
//! Each contract sits behind its own mutex, which serializes its calls; the
//! journal lock is only ever taken while a contract lock is held, never the
//! other way round.

use crate::call::{Call, CallOutcome, Mutation, Query, QueryValue};
use crate::error::{LedgerError, Result};
use crate::journal::{Deployment, JournalEntry, LedgerJournal};
use crate::transport::{ContractId, LedgerTransport, Receipt};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use wsn_core::{Address, ControllerConfig, ControllerSnapshot, MonitoringController};

#[derive(Debug)]
struct ContractSlot {
    controller: MonitoringController,
    next_sequence: u64,
}

/// Ledger transport holding every controller in process memory.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    contracts: RwLock<HashMap<ContractId, Arc<Mutex<ContractSlot>>>>,
    journal: Mutex<LedgerJournal>,
}

impl InMemoryLedger {
    /// An empty ledger with no contracts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    pub async fn export_journal(&self) -> LedgerJournal {
        self.journal.lock().await.clone()
    }

    /// Number of deployed contracts.
    pub async fn contract_count(&self) -> usize {
        self.contracts.read().await.len()
    }

    /// Rebuild a ledger by re-applying a journal from scratch.
    ///
    /// Every deployment must reproduce its recorded id, or the replay stops
    /// with [`LedgerError::DeploymentDivergence`]. Every entry must reproduce
    /// its recorded sequence number and outcome, or the replay stops with
    /// [`LedgerError::ReplayDivergence`].
    pub async fn replay(journal: &LedgerJournal) -> Result<Self> {
        let ledger = Self::new();

        for (index, deployment) in journal.deployments.iter().enumerate() {
            let id = ledger.deploy(deployment.deployer, deployment.config).await?;
            if id != deployment.contract {
                return Err(LedgerError::deployment_divergence(
                    index,
                    deployment.contract,
                    id,
                ));
            }
        }

        for entry in &journal.entries {
            let call = entry.call;
            let (sequence, outcome) = ledger
                .execute(
                    entry.contract,
                    entry.caller,
                    call,
                    |controller, caller| Ok(call.apply(controller, caller)),
                    CallOutcome::clone,
                )
                .await?;
            // Rejections were replayed as outcomes, not errors.
            let outcome = outcome?;

            if sequence != entry.sequence {
                return Err(LedgerError::replay_divergence(
                    entry.contract,
                    entry.sequence,
                    format!("call {} landed at sequence {sequence}", call.operation()),
                ));
            }
            if outcome != entry.outcome {
                return Err(LedgerError::replay_divergence(
                    entry.contract,
                    entry.sequence,
                    format!(
                        "{} recorded {:?} but replayed {:?}",
                        call.operation(),
                        entry.outcome,
                        outcome
                    ),
                ));
            }
        }

        tracing::info!(
            deployments = journal.deployments.len(),
            entries = journal.entries.len(),
            "Journal replayed"
        );
        Ok(ledger)
    }

    async fn slot(&self, contract: ContractId) -> Result<Arc<Mutex<ContractSlot>>> {
        self.contracts
            .read()
            .await
            .get(&contract)
            .cloned()
            .ok_or(LedgerError::UnknownContract(contract))
    }

    /// Sequence one call, run it and journal the outcome.
    ///
    /// The call is recorded whether or not the controller accepts it.
    async fn execute<T: Send>(
        &self,
        contract: ContractId,
        caller: Address,
        call: Call,
        run: impl FnOnce(&mut MonitoringController, &Address) -> wsn_core::Result<T> + Send,
        record: impl FnOnce(&T) -> CallOutcome + Send,
    ) -> Result<(u64, wsn_core::Result<T>)> {
        let slot = self.slot(contract).await?;
        let mut slot = slot.lock().await;

        let sequence = slot.next_sequence;
        slot.next_sequence += 1;

        let result = run(&mut slot.controller, &caller);
        let outcome = match &result {
            Ok(value) => record(value),
            Err(error) => CallOutcome::Rejected {
                error: error.clone(),
            },
        };

        match &outcome {
            CallOutcome::Rejected { error } => tracing::warn!(
                contract = %contract,
                sequence,
                caller = %caller,
                operation = %call.operation(),
                kind = error.kind(),
                error = %error,
                "Call rejected"
            ),
            _ => tracing::debug!(
                contract = %contract,
                sequence,
                caller = %caller,
                operation = %call.operation(),
                phase = %slot.controller.phase(),
                "Call committed"
            ),
        }

        self.journal.lock().await.entries.push(JournalEntry {
            sequence,
            contract,
            caller,
            call,
            outcome,
        });

        Ok((sequence, result))
    }
}

#[async_trait]
impl LedgerTransport for InMemoryLedger {
    async fn deploy(&self, deployer: Address, config: ControllerConfig) -> Result<ContractId> {
        let controller = MonitoringController::from_config(&config)?;

        let mut contracts = self.contracts.write().await;
        let mut journal = self.journal.lock().await;

        let nonce = journal.deployments.len() as u64;
        let contract = ContractId::derive(&deployer, nonce);
        contracts.insert(
            contract,
            Arc::new(Mutex::new(ContractSlot {
                controller,
                next_sequence: 0,
            })),
        );
        journal.deployments.push(Deployment {
            contract,
            deployer,
            config,
        });

        tracing::info!(
            contract = %contract,
            deployer = %deployer,
            operator = %config.roles.operator(),
            supervisor = %config.roles.supervisor(),
            "Controller deployed"
        );
        Ok(contract)
    }

    async fn submit(
        &self,
        contract: ContractId,
        caller: Address,
        mutation: Mutation,
    ) -> Result<Receipt> {
        let (sequence, result) = self
            .execute(
                contract,
                caller,
                mutation.into(),
                |controller, who| mutation.apply(controller, who),
                |phase| CallOutcome::Committed { phase: *phase },
            )
            .await?;
        let phase = result?;

        Ok(Receipt {
            contract,
            sequence,
            caller,
            operation: mutation.operation(),
            phase,
        })
    }

    async fn query(
        &self,
        contract: ContractId,
        caller: Address,
        query: Query,
    ) -> Result<QueryValue> {
        let (_, result) = self
            .execute(
                contract,
                caller,
                query.into(),
                |controller, who| query.apply(controller, who),
                |value| CallOutcome::Value { value: *value },
            )
            .await?;
        Ok(result?)
    }

    async fn snapshot(&self, contract: ContractId) -> Result<ControllerSnapshot> {
        let slot = self.slot(contract).await?;
        let slot = slot.lock().await;
        Ok(slot.controller.snapshot())
    }
}
