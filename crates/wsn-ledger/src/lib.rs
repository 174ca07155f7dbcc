//! WSN Ledger - ordered transport for monitoring controllers
//!
//! Controllers are never called directly. A [`LedgerTransport`] hosts them,
//! assigns every call a per-contract sequence number, applies calls to one
//! contract strictly in order and journals each call with its outcome,
//! rejected calls included.
//!
//! [`InMemoryLedger`] is the reference transport. Its journal can be written
//! to disk through [`JournalStore`] and replayed into an identical ledger.

#![forbid(unsafe_code)]

/// Named calls and their outcomes
pub mod call;

/// Ledger error types
pub mod error;

/// Journal entries and JSON storage
pub mod journal;

/// In-memory reference transport
pub mod memory;

/// Transport trait and receipts
pub mod transport;

pub use call::{Call, CallOutcome, Mutation, Query, QueryValue};
pub use error::{LedgerError, Result};
pub use journal::{Deployment, JournalEntry, JournalStore, LedgerJournal};
pub use memory::InMemoryLedger;
pub use transport::{ContractId, LedgerTransport, Receipt};
