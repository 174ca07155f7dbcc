//! Lifecycle phases
//!
//! ```text
//! Uninitialized → PlugAndPlayDeployed → EstimationStateSet
//!     → EstimateRecorded → AnomalyChecked → FullyDeployed
//! ```
//!
//! Phases form a total order and only move forward, one step at a time.
//! Alarm and confirmation are flags on top of the last two phases, not phases.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of the controller lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LifecyclePhase {
    /// Created, nothing deployed
    Uninitialized,
    /// Network live in plug-and-play mode
    PlugAndPlayDeployed,
    /// Estimation cycle open
    EstimationStateSet,
    /// Estimate stored
    EstimateRecorded,
    /// Anomaly record computed
    AnomalyChecked,
    /// Committed to production
    FullyDeployed,
}

impl LifecyclePhase {
    /// The phase a successful transition out of `self` lands in.
    pub fn successor(&self) -> Option<LifecyclePhase> {
        match self {
            Self::Uninitialized => Some(Self::PlugAndPlayDeployed),
            Self::PlugAndPlayDeployed => Some(Self::EstimationStateSet),
            Self::EstimationStateSet => Some(Self::EstimateRecorded),
            Self::EstimateRecorded => Some(Self::AnomalyChecked),
            Self::AnomalyChecked => Some(Self::FullyDeployed),
            Self::FullyDeployed => None,
        }
    }

    /// Check if this phase is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        self.successor().is_none()
    }

    /// Whether `next` is the single forward step from `self`.
    pub fn can_transition_to(&self, next: LifecyclePhase) -> bool {
        self.successor() == Some(next)
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Answer of `view_state_of_WSN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkStatus {
    /// Deployed in plug-and-play mode, not yet in production
    PlugAndPlay,
    /// Committed to production by the supervisor
    FullyDeployed,
}

/// Answer of `view_state_of_estimate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimationStatus {
    /// Cycle open, nothing recorded
    AwaitingEstimate,
    /// Estimate stored for this cycle
    Recorded,
}
