//! Named calls submitted through the ledger and their outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;
use wsn_core::{
    Address, AnomalyType, ControllerError, EstimationStatus, LifecyclePhase, MonitoringController,
    NetworkStatus, Operation,
};

/// A state-mutating controller call with its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "function", rename_all = "snake_case")]
pub enum Mutation {
    /// Operator brings the network live in plug-and-play mode
    #[serde(rename = "WSN_deployment")]
    DeployPlugAndPlay,
    /// Operator opens the estimation cycle
    #[serde(rename = "state_estimation")]
    SetEstimationState,
    /// Operator stores the cycle's estimate
    RecordStateEstimate {
        /// Estimate to record
        value: i64,
    },
    /// Operator runs the anomaly detector
    CheckForAnomalies,
    /// Supervisor commits the network to production
    #[serde(rename = "deploy_WSN_fully")]
    DeployFully,
    /// Supervisor raises the alarm
    RaiseAlarm,
    /// Supervisor confirms the anomaly
    ConfirmAnomalies,
}

impl Mutation {
    /// Controller operation this call invokes.
    pub fn operation(&self) -> Operation {
        match self {
            Self::DeployPlugAndPlay => Operation::DeployPlugAndPlay,
            Self::SetEstimationState => Operation::SetEstimationState,
            Self::RecordStateEstimate { .. } => Operation::RecordStateEstimate,
            Self::CheckForAnomalies => Operation::CheckForAnomalies,
            Self::DeployFully => Operation::DeployFully,
            Self::RaiseAlarm => Operation::RaiseAlarm,
            Self::ConfirmAnomalies => Operation::ConfirmAnomalies,
        }
    }

    /// Contract function name.
    pub fn name(&self) -> &'static str {
        self.operation().name()
    }

    /// Apply to a controller, returning the phase after commit.
    pub(crate) fn apply(
        &self,
        controller: &mut MonitoringController,
        caller: &Address,
    ) -> wsn_core::Result<LifecyclePhase> {
        match *self {
            Self::DeployPlugAndPlay => {
                controller.deploy_plug_and_play(caller)?;
            }
            Self::SetEstimationState => {
                controller.set_estimation_state(caller)?;
            }
            Self::RecordStateEstimate { value } => {
                controller.record_state_estimate(caller, value)?;
            }
            Self::CheckForAnomalies => {
                controller.check_for_anomalies(caller)?;
            }
            Self::DeployFully => {
                controller.deploy_fully(caller)?;
            }
            Self::RaiseAlarm => controller.raise_alarm(caller)?,
            Self::ConfirmAnomalies => controller.confirm_anomalies(caller)?,
        }
        Ok(controller.phase())
    }
}

/// A read call with its arguments.
///
/// Reads are sequenced like mutations: dashboard reads update the visit ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "function", rename_all = "snake_case")]
pub enum Query {
    /// Recorded estimate; counts a visit
    ViewEstimate,
    /// Network deployment state; counts a visit
    #[serde(rename = "view_state_of_WSN")]
    ViewStateOfWsn,
    /// Estimation cycle state; counts a visit
    ViewStateOfEstimate,
    /// Supervisor audit of one address's visits
    ViewTimesVisited {
        /// Address whose visits are counted
        address: Address,
    },
    /// Whether the check detected an anomaly
    ViewAnomalyDetected,
    /// Classification of the checked estimate
    ViewAnomalyType,
}

impl Query {
    /// Controller operation this call invokes.
    pub fn operation(&self) -> Operation {
        match self {
            Self::ViewEstimate => Operation::ViewEstimate,
            Self::ViewStateOfWsn => Operation::ViewStateOfWsn,
            Self::ViewStateOfEstimate => Operation::ViewStateOfEstimate,
            Self::ViewTimesVisited { .. } => Operation::ViewTimesVisited,
            Self::ViewAnomalyDetected => Operation::ViewAnomalyDetected,
            Self::ViewAnomalyType => Operation::ViewAnomalyType,
        }
    }

    /// Contract function name.
    pub fn name(&self) -> &'static str {
        self.operation().name()
    }

    pub(crate) fn apply(
        &self,
        controller: &mut MonitoringController,
        caller: &Address,
    ) -> wsn_core::Result<QueryValue> {
        Ok(match self {
            Self::ViewEstimate => QueryValue::Estimate(controller.view_estimate(caller)?),
            Self::ViewStateOfWsn => QueryValue::NetworkStatus(controller.view_state_of_wsn(caller)?),
            Self::ViewStateOfEstimate => {
                QueryValue::EstimationStatus(controller.view_state_of_estimate(caller)?)
            }
            Self::ViewTimesVisited { address } => {
                QueryValue::TimesVisited(controller.view_times_visited(caller, address)?)
            }
            Self::ViewAnomalyDetected => {
                QueryValue::AnomalyDetected(controller.view_anomaly_detected(caller)?)
            }
            Self::ViewAnomalyType => QueryValue::AnomalyType(controller.view_anomaly_type(caller)?),
        })
    }
}

/// Value returned by a read call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum QueryValue {
    /// Answer to `view_estimate`
    Estimate(i64),
    /// Answer to `view_state_of_WSN`
    NetworkStatus(NetworkStatus),
    /// Answer to `view_state_of_estimate`
    EstimationStatus(EstimationStatus),
    /// Answer to `view_times_visited`
    TimesVisited(u64),
    /// Answer to `view_anomaly_detected`
    AnomalyDetected(bool),
    /// Answer to `view_anomaly_type`
    AnomalyType(AnomalyType),
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Estimate(value) => write!(f, "{value}"),
            Self::NetworkStatus(status) => write!(f, "{status:?}"),
            Self::EstimationStatus(status) => write!(f, "{status:?}"),
            Self::TimesVisited(count) => write!(f, "{count}"),
            Self::AnomalyDetected(detected) => write!(f, "{detected}"),
            Self::AnomalyType(kind) => write!(f, "{kind}"),
        }
    }
}

/// Any call the ledger sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Call {
    /// State-mutating call
    Mutation(Mutation),
    /// Read call
    Query(Query),
}

impl Call {
    /// Controller operation this call invokes.
    pub fn operation(&self) -> Operation {
        match self {
            Self::Mutation(m) => m.operation(),
            Self::Query(q) => q.operation(),
        }
    }

    /// Run the call against a controller. Rejections leave the controller untouched.
    pub(crate) fn apply(&self, controller: &mut MonitoringController, caller: &Address) -> CallOutcome {
        let result = match self {
            Self::Mutation(m) => m
                .apply(controller, caller)
                .map(|phase| CallOutcome::Committed { phase }),
            Self::Query(q) => q
                .apply(controller, caller)
                .map(|value| CallOutcome::Value { value }),
        };
        result.unwrap_or_else(|error| CallOutcome::Rejected { error })
    }
}

impl From<Mutation> for Call {
    fn from(mutation: Mutation) -> Self {
        Self::Mutation(mutation)
    }
}

impl From<Query> for Call {
    fn from(query: Query) -> Self {
        Self::Query(query)
    }
}

/// What the ledger committed for one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CallOutcome {
    /// Mutation applied
    Committed {
        /// Phase after commit
        phase: LifecyclePhase,
    },
    /// Read answered
    Value {
        /// The value returned
        value: QueryValue,
    },
    /// Controller refused the call; state unchanged
    Rejected {
        /// Why the controller refused
        error: ControllerError,
    },
}

impl CallOutcome {
    /// Whether the controller refused the call.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_follow_contract_functions() {
        assert_eq!(Mutation::DeployPlugAndPlay.name(), "WSN_deployment");
        assert_eq!(Mutation::SetEstimationState.name(), "state_estimation");
        assert_eq!(Mutation::DeployFully.name(), "deploy_WSN_fully");
        assert_eq!(Query::ViewStateOfWsn.name(), "view_state_of_WSN");
    }

    #[test]
    fn test_call_json_shape() {
        let call = Call::from(Mutation::RecordStateEstimate { value: 83 });
        let json = serde_json::to_value(call).unwrap();
        assert_eq!(json["mutation"]["function"], "record_state_estimate");
        assert_eq!(json["mutation"]["value"], 83);

        let call = Call::from(Mutation::DeployFully);
        let json = serde_json::to_value(call).unwrap();
        assert_eq!(json["mutation"]["function"], Mutation::DeployFully.name());

        let call = Call::from(Query::ViewStateOfWsn);
        let json = serde_json::to_value(call).unwrap();
        assert_eq!(json["query"]["function"], "view_state_of_WSN");

        let value = serde_json::to_value(QueryValue::TimesVisited(3)).unwrap();
        assert_eq!(value["kind"], "times_visited");
        assert_eq!(value["value"], 3);
    }
}
