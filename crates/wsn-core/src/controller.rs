//! Monitoring controller state machine.
//!
//! Owns the lifecycle phase, the two role bindings, the recorded estimate, the
//! anomaly record with its alarm and confirmation flags, and the visit ledger.
//!
//! Every call runs its guards in a fixed order before touching state:
//! 1. caller role ([`ControllerError::Authorization`])
//! 2. lifecycle phase ([`ControllerError::Phase`])
//! 3. domain constraint ([`ControllerError::Domain`])
//!
//! Callers that share a controller must hold one lock across the whole call;
//! the controller itself has no interior mutability.

use crate::anomaly::{AnomalyDetector, AnomalyRecord, AnomalyType};
use crate::config::{ControllerConfig, EstimateBounds};
use crate::errors::{ControllerError, Result};
use crate::identifiers::{Address, Role, RoleBindings};
use crate::operation::Operation;
use crate::phase::{EstimationStatus, LifecyclePhase, NetworkStatus};
use crate::visits::VisitLedger;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Read-only image of a controller's full state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerSnapshot {
    /// Role bindings fixed at construction
    pub roles: RoleBindings,
    /// Current lifecycle phase
    pub phase: LifecyclePhase,
    /// Recorded estimate, once set
    pub estimate: Option<i64>,
    /// Anomaly check result, once run
    pub anomaly: Option<AnomalyRecord>,
    /// Supervisor alarm flag
    pub alarm_raised: bool,
    /// Supervisor confirmation flag
    pub anomalies_confirmed: bool,
    /// Dashboard visits per caller
    pub visits: VisitLedger,
}

/// Role-gated lifecycle controller for one sensor network.
#[derive(Debug, Clone)]
pub struct MonitoringController {
    roles: RoleBindings,
    bounds: EstimateBounds,
    detector: Arc<dyn AnomalyDetector>,
    phase: LifecyclePhase,
    estimate: Option<i64>,
    anomaly: Option<AnomalyRecord>,
    alarm_raised: bool,
    anomalies_confirmed: bool,
    visits: VisitLedger,
}

impl MonitoringController {
    /// Bind `operator` and `supervisor` with default bounds and detection.
    ///
    /// Fails with [`ControllerError::Config`] if the two addresses are equal.
    pub fn new(operator: Address, supervisor: Address) -> Result<Self> {
        let roles = RoleBindings::new(operator, supervisor)?;
        Self::from_config(&ControllerConfig::new(roles))
    }

    /// Build from a validated configuration, detector included.
    pub fn from_config(config: &ControllerConfig) -> Result<Self> {
        config.validate()?;
        Self::with_detector(config.roles, config.bounds, config.anomaly.build()?)
    }

    /// Construct with a caller-supplied detection strategy.
    pub fn with_detector(
        roles: RoleBindings,
        bounds: EstimateBounds,
        detector: Arc<dyn AnomalyDetector>,
    ) -> Result<Self> {
        roles.validate()?;
        bounds.validate()?;
        Ok(Self {
            roles,
            bounds,
            detector,
            phase: LifecyclePhase::Uninitialized,
            estimate: None,
            anomaly: None,
            alarm_raised: false,
            anomalies_confirmed: false,
            visits: VisitLedger::new(),
        })
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    /// Role bindings fixed at construction.
    pub fn roles(&self) -> &RoleBindings {
        &self.roles
    }

    /// Accepted estimate range.
    pub fn bounds(&self) -> &EstimateBounds {
        &self.bounds
    }

    /// Whether the supervisor raised the alarm.
    pub fn alarm_raised(&self) -> bool {
        self.alarm_raised
    }

    /// Whether the supervisor confirmed the anomaly.
    pub fn anomalies_confirmed(&self) -> bool {
        self.anomalies_confirmed
    }

    /// Copy of the full state.
    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            roles: self.roles,
            phase: self.phase,
            estimate: self.estimate,
            anomaly: self.anomaly,
            alarm_raised: self.alarm_raised,
            anomalies_confirmed: self.anomalies_confirmed,
            visits: self.visits.clone(),
        }
    }

    // ---------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------

    /// Operator: bring the network live in plug-and-play mode.
    pub fn deploy_plug_and_play(&mut self, caller: &Address) -> Result<LifecyclePhase> {
        self.step(Operation::DeployPlugAndPlay, caller, LifecyclePhase::Uninitialized)
    }

    /// Operator: open the estimation cycle.
    pub fn set_estimation_state(&mut self, caller: &Address) -> Result<LifecyclePhase> {
        self.step(
            Operation::SetEstimationState,
            caller,
            LifecyclePhase::PlugAndPlayDeployed,
        )
    }

    /// Operator: store the cycle's estimate. Write-once.
    pub fn record_state_estimate(&mut self, caller: &Address, value: i64) -> Result<LifecyclePhase> {
        let operation = Operation::RecordStateEstimate;
        self.authorize(operation, caller)?;
        let next = self.require_phase(operation, LifecyclePhase::EstimationStateSet)?;
        self.bounds.check(value)?;

        self.estimate = Some(value);
        self.commit(operation, caller, next);
        Ok(next)
    }

    /// Operator: run the detector against the recorded estimate.
    pub fn check_for_anomalies(&mut self, caller: &Address) -> Result<AnomalyRecord> {
        let operation = Operation::CheckForAnomalies;
        self.authorize(operation, caller)?;
        let next = self.require_phase(operation, LifecyclePhase::EstimateRecorded)?;
        let estimate = self
            .estimate
            .ok_or_else(|| ControllerError::not_available("estimate"))?;

        let record = self.detector.inspect(estimate);
        self.anomaly = Some(record);
        self.commit(operation, caller, next);
        debug!(
            estimate,
            detected = record.detected,
            kind = %record.kind,
            "Anomaly check recorded"
        );
        Ok(record)
    }

    /// Supervisor: commit the network to production.
    pub fn deploy_fully(&mut self, caller: &Address) -> Result<LifecyclePhase> {
        self.step(Operation::DeployFully, caller, LifecyclePhase::AnomalyChecked)
    }

    /// Supervisor: raise the alarm for a detected anomaly.
    pub fn raise_alarm(&mut self, caller: &Address) -> Result<()> {
        let operation = Operation::RaiseAlarm;
        self.authorize(operation, caller)?;
        self.require_flaggable_anomaly(operation, self.alarm_raised)?;

        self.alarm_raised = true;
        debug!(operation = %operation, caller = %caller, phase = %self.phase, "Alarm raised");
        Ok(())
    }

    /// Supervisor: confirm a detected anomaly. Independent of the alarm flag.
    pub fn confirm_anomalies(&mut self, caller: &Address) -> Result<()> {
        let operation = Operation::ConfirmAnomalies;
        self.authorize(operation, caller)?;
        self.require_flaggable_anomaly(operation, self.anomalies_confirmed)?;

        self.anomalies_confirmed = true;
        debug!(operation = %operation, caller = %caller, phase = %self.phase, "Anomalies confirmed");
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------

    /// Dashboard read of the recorded estimate. Counts a visit.
    pub fn view_estimate(&mut self, caller: &Address) -> Result<i64> {
        let operation = Operation::ViewEstimate;
        self.authorize(operation, caller)?;
        let estimate = self
            .estimate
            .ok_or_else(|| ControllerError::not_available("estimate"))?;
        self.visit(operation, caller);
        Ok(estimate)
    }

    /// Dashboard read of the network deployment state. Counts a visit.
    pub fn view_state_of_wsn(&mut self, caller: &Address) -> Result<NetworkStatus> {
        let operation = Operation::ViewStateOfWsn;
        self.authorize(operation, caller)?;
        let status = match self.phase {
            LifecyclePhase::Uninitialized => {
                return Err(ControllerError::not_available("network deployment"))
            }
            LifecyclePhase::FullyDeployed => NetworkStatus::FullyDeployed,
            _ => NetworkStatus::PlugAndPlay,
        };
        self.visit(operation, caller);
        Ok(status)
    }

    /// Dashboard read of the estimation cycle state. Counts a visit.
    pub fn view_state_of_estimate(&mut self, caller: &Address) -> Result<EstimationStatus> {
        let operation = Operation::ViewStateOfEstimate;
        self.authorize(operation, caller)?;
        let status = match self.phase {
            LifecyclePhase::Uninitialized | LifecyclePhase::PlugAndPlayDeployed => {
                return Err(ControllerError::not_available("estimation state"))
            }
            LifecyclePhase::EstimationStateSet => EstimationStatus::AwaitingEstimate,
            _ => EstimationStatus::Recorded,
        };
        self.visit(operation, caller);
        Ok(status)
    }

    /// Supervisor audit: dashboard visits made by `subject`.
    pub fn view_times_visited(&self, caller: &Address, subject: &Address) -> Result<u64> {
        self.authorize(Operation::ViewTimesVisited, caller)?;
        Ok(self.visits.count(subject))
    }

    /// Whether the anomaly check flagged the estimate.
    pub fn view_anomaly_detected(&self, caller: &Address) -> Result<bool> {
        self.authorize(Operation::ViewAnomalyDetected, caller)?;
        Ok(self.anomaly_record()?.detected)
    }

    /// Classification from the anomaly check.
    pub fn view_anomaly_type(&self, caller: &Address) -> Result<AnomalyType> {
        self.authorize(Operation::ViewAnomalyType, caller)?;
        Ok(self.anomaly_record()?.kind)
    }

    // ---------------------------------------------------------------------
    // Guards
    // ---------------------------------------------------------------------

    fn authorize(&self, operation: Operation, caller: &Address) -> Result<Role> {
        let required = operation.access();
        match self.roles.role_of(caller) {
            Some(role) if required.admits(role) => Ok(role),
            _ => Err(ControllerError::authorization(operation, required, *caller)),
        }
    }

    /// Check the current phase is `expected` and return its successor.
    fn require_phase(&self, operation: Operation, expected: LifecyclePhase) -> Result<LifecyclePhase> {
        if self.phase != expected {
            return Err(ControllerError::phase(
                operation,
                self.phase,
                format!("requires {expected}"),
            ));
        }
        expected.successor().ok_or_else(|| {
            ControllerError::phase(operation, self.phase, "no phase follows")
        })
    }

    fn require_flaggable_anomaly(&self, operation: Operation, already_set: bool) -> Result<()> {
        if self.phase < LifecyclePhase::AnomalyChecked {
            return Err(ControllerError::phase(
                operation,
                self.phase,
                "requires AnomalyChecked or FullyDeployed",
            ));
        }
        if already_set {
            return Err(ControllerError::phase(
                operation,
                self.phase,
                "flag already set",
            ));
        }
        if !self.anomaly_record()?.detected {
            return Err(ControllerError::domain(operation, "no anomaly detected"));
        }
        Ok(())
    }

    fn anomaly_record(&self) -> Result<AnomalyRecord> {
        self.anomaly
            .ok_or_else(|| ControllerError::not_available("anomaly record"))
    }

    fn step(
        &mut self,
        operation: Operation,
        caller: &Address,
        expected: LifecyclePhase,
    ) -> Result<LifecyclePhase> {
        self.authorize(operation, caller)?;
        let next = self.require_phase(operation, expected)?;
        self.commit(operation, caller, next);
        Ok(next)
    }

    fn commit(&mut self, operation: Operation, caller: &Address, next: LifecyclePhase) {
        debug!(
            operation = %operation,
            caller = %caller,
            from = %self.phase,
            to = %next,
            "Phase advanced"
        );
        self.phase = next;
    }

    fn visit(&mut self, operation: Operation, caller: &Address) {
        let count = self.visits.record(*caller);
        debug!(operation = %operation, caller = %caller, count, "Visit recorded");
    }
}
