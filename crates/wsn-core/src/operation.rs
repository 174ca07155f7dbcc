//! Names and access rules of every controller call.

use crate::identifiers::{Access, Role};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Every call the controller accepts, mutating or read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// `WSN_deployment`
    DeployPlugAndPlay,
    /// `state_estimation`
    SetEstimationState,
    /// `record_state_estimate`
    RecordStateEstimate,
    /// `check_for_anomalies`
    CheckForAnomalies,
    /// `deploy_WSN_fully`
    DeployFully,
    /// `raise_alarm`
    RaiseAlarm,
    /// `confirm_anomalies`
    ConfirmAnomalies,
    /// `view_estimate`
    ViewEstimate,
    /// `view_state_of_WSN`
    ViewStateOfWsn,
    /// `view_state_of_estimate`
    ViewStateOfEstimate,
    /// `view_times_visited`
    ViewTimesVisited,
    /// `view_anomaly_detected`
    ViewAnomalyDetected,
    /// `view_anomaly_type`
    ViewAnomalyType,
}

impl Operation {
    /// All operations, mutations first.
    pub const ALL: [Operation; 13] = [
        Self::DeployPlugAndPlay,
        Self::SetEstimationState,
        Self::RecordStateEstimate,
        Self::CheckForAnomalies,
        Self::DeployFully,
        Self::RaiseAlarm,
        Self::ConfirmAnomalies,
        Self::ViewEstimate,
        Self::ViewStateOfWsn,
        Self::ViewStateOfEstimate,
        Self::ViewTimesVisited,
        Self::ViewAnomalyDetected,
        Self::ViewAnomalyType,
    ];

    /// Contract function name as the ledger exposes it.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DeployPlugAndPlay => "WSN_deployment",
            Self::SetEstimationState => "state_estimation",
            Self::RecordStateEstimate => "record_state_estimate",
            Self::CheckForAnomalies => "check_for_anomalies",
            Self::DeployFully => "deploy_WSN_fully",
            Self::RaiseAlarm => "raise_alarm",
            Self::ConfirmAnomalies => "confirm_anomalies",
            Self::ViewEstimate => "view_estimate",
            Self::ViewStateOfWsn => "view_state_of_WSN",
            Self::ViewStateOfEstimate => "view_state_of_estimate",
            Self::ViewTimesVisited => "view_times_visited",
            Self::ViewAnomalyDetected => "view_anomaly_detected",
            Self::ViewAnomalyType => "view_anomaly_type",
        }
    }

    /// Look an operation up by its contract function name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    /// Who may invoke this operation.
    pub fn access(&self) -> Access {
        match self {
            Self::DeployPlugAndPlay
            | Self::SetEstimationState
            | Self::RecordStateEstimate
            | Self::CheckForAnomalies => Access::Role(Role::Operator),
            Self::DeployFully
            | Self::RaiseAlarm
            | Self::ConfirmAnomalies
            | Self::ViewTimesVisited => Access::Role(Role::Supervisor),
            Self::ViewEstimate
            | Self::ViewStateOfWsn
            | Self::ViewStateOfEstimate
            | Self::ViewAnomalyDetected
            | Self::ViewAnomalyType => Access::AnyRole,
        }
    }

    /// Whether the call changes lifecycle, estimate, anomaly or flag state.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::DeployPlugAndPlay
                | Self::SetEstimationState
                | Self::RecordStateEstimate
                | Self::CheckForAnomalies
                | Self::DeployFully
                | Self::RaiseAlarm
                | Self::ConfirmAnomalies
        )
    }

    /// Dashboard reads count towards the caller's visit total.
    pub fn counts_visit(&self) -> bool {
        matches!(
            self,
            Self::ViewEstimate | Self::ViewStateOfWsn | Self::ViewStateOfEstimate
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for op in Operation::ALL {
            assert_eq!(Operation::from_name(op.name()), Some(op));
        }
        assert_eq!(Operation::from_name("selfdestruct"), None);
    }

    #[test]
    fn test_visit_counting_reads_are_not_mutations() {
        for op in Operation::ALL {
            if op.counts_visit() {
                assert!(!op.is_mutation(), "{op} counted as both");
                assert_eq!(op.access(), Access::AnyRole);
            }
        }
        assert!(!Operation::ViewAnomalyType.counts_visit());
        assert!(!Operation::ViewTimesVisited.counts_visit());
    }
}
