//! Per-caller audit counters for dashboard reads.

use crate::identifiers::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Monotonic count of dashboard reads per caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitLedger {
    counts: BTreeMap<Address, u64>,
}

impl VisitLedger {
    /// An empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one visit by `caller` and return the new total.
    pub fn record(&mut self, caller: Address) -> u64 {
        let count = self.counts.entry(caller).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    /// Visits by `caller` so far; zero for callers never seen.
    pub fn count(&self, caller: &Address) -> u64 {
        self.counts.get(caller).copied().unwrap_or(0)
    }

    /// Sum over all callers.
    pub fn total(&self) -> u64 {
        self.counts.values().fold(0u64, |acc, n| acc.saturating_add(*n))
    }
}
