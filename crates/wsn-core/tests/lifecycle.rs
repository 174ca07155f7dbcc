//! Lifecycle scenario tests for the monitoring controller.

use assert_matches::assert_matches;
use std::sync::Arc;
use wsn_core::{
    Address, AnomalyDetector, AnomalyPolicy, AnomalyRecord, AnomalyType, ControllerConfig,
    ControllerError, EstimateBounds, EstimationStatus, LifecyclePhase, MonitoringController,
    NetworkStatus, Operation, RoleBindings, ADDRESS_LEN,
};

fn operator() -> Address {
    "0x3deea4dc72f6735374C26AAE49939F375e790F07".parse().unwrap()
}

fn supervisor() -> Address {
    "0xFb8E7ef8453Ff07815f53D3697614bacf77dc76a".parse().unwrap()
}

fn stranger() -> Address {
    Address::from_bytes([0xAB; ADDRESS_LEN])
}

fn controller_with(policy: AnomalyPolicy) -> MonitoringController {
    let roles = RoleBindings::new(operator(), supervisor()).unwrap();
    let config = ControllerConfig::new(roles).with_anomaly_policy(policy);
    MonitoringController::from_config(&config).unwrap()
}

/// Drive a fresh controller up to the anomaly check with estimate 83.
fn checked_controller(policy: AnomalyPolicy) -> MonitoringController {
    let mut c = controller_with(policy);
    c.deploy_plug_and_play(&operator()).unwrap();
    c.set_estimation_state(&operator()).unwrap();
    c.record_state_estimate(&operator(), 83).unwrap();
    c.check_for_anomalies(&operator()).unwrap();
    c
}

#[test]
fn scripted_sequence_with_detected_anomaly() {
    let (a, b) = (operator(), supervisor());
    let mut c = MonitoringController::new(a, b).unwrap();

    assert_eq!(c.deploy_plug_and_play(&a).unwrap(), LifecyclePhase::PlugAndPlayDeployed);
    assert_matches!(c.deploy_plug_and_play(&a), Err(ControllerError::Phase { .. }));
    assert_matches!(
        c.record_state_estimate(&a, 83),
        Err(ControllerError::Phase { .. })
    );

    assert_eq!(c.set_estimation_state(&a).unwrap(), LifecyclePhase::EstimationStateSet);
    assert_eq!(c.record_state_estimate(&a, 83).unwrap(), LifecyclePhase::EstimateRecorded);
    assert_eq!(c.view_estimate(&a).unwrap(), 83);

    let record = c.check_for_anomalies(&a).unwrap();
    // Default band is [20, 80], so 83 is flagged.
    assert!(record.detected);
    assert_eq!(record.kind, AnomalyType::AboveRange);

    c.raise_alarm(&b).unwrap();
    assert!(c.alarm_raised());

    assert_matches!(
        c.deploy_fully(&a),
        Err(ControllerError::Authorization { operation: Operation::DeployFully, .. })
    );
    assert_eq!(c.deploy_fully(&b).unwrap(), LifecyclePhase::FullyDeployed);

    c.confirm_anomalies(&b).unwrap();
    assert!(c.anomalies_confirmed());
    assert_eq!(c.view_state_of_wsn(&a).unwrap(), NetworkStatus::FullyDeployed);
}

#[test]
fn raise_alarm_requires_detection() {
    let mut c = checked_controller(AnomalyPolicy::Disabled);
    assert!(!c.view_anomaly_detected(&operator()).unwrap());
    assert_eq!(c.view_anomaly_type(&operator()).unwrap(), AnomalyType::None);

    assert_matches!(c.raise_alarm(&supervisor()), Err(ControllerError::Domain { .. }));
    assert_matches!(
        c.confirm_anomalies(&supervisor()),
        Err(ControllerError::Domain { .. })
    );
    assert!(!c.alarm_raised());
    assert!(!c.anomalies_confirmed());

    // Full deployment does not depend on the anomaly outcome.
    c.deploy_fully(&supervisor()).unwrap();
}

#[test]
fn alarm_and_confirmation_are_independent_flags() {
    // Neither flag implies the other; each is set once on its own call.
    let mut c = checked_controller(AnomalyPolicy::default());
    c.confirm_anomalies(&supervisor()).unwrap();
    assert!(c.anomalies_confirmed());
    assert!(!c.alarm_raised());

    c.raise_alarm(&supervisor()).unwrap();
    assert!(c.alarm_raised());

    assert_matches!(c.raise_alarm(&supervisor()), Err(ControllerError::Phase { .. }));
    assert_matches!(
        c.confirm_anomalies(&supervisor()),
        Err(ControllerError::Phase { .. })
    );
}

#[test]
fn confirm_before_check_is_phase_error() {
    let mut c = controller_with(AnomalyPolicy::default());
    c.deploy_plug_and_play(&operator()).unwrap();
    c.set_estimation_state(&operator()).unwrap();
    c.record_state_estimate(&operator(), 83).unwrap();

    assert_matches!(
        c.confirm_anomalies(&supervisor()),
        Err(ControllerError::Phase { current: LifecyclePhase::EstimateRecorded, .. })
    );
    assert_matches!(c.raise_alarm(&supervisor()), Err(ControllerError::Phase { .. }));
}

#[test]
fn reads_before_data_exists_are_not_available() {
    let mut c = controller_with(AnomalyPolicy::default());
    let op = operator();

    assert_matches!(c.view_estimate(&op), Err(ControllerError::NotAvailable { .. }));
    assert_matches!(c.view_state_of_wsn(&op), Err(ControllerError::NotAvailable { .. }));
    assert_matches!(
        c.view_state_of_estimate(&op),
        Err(ControllerError::NotAvailable { .. })
    );
    assert_matches!(
        c.view_anomaly_detected(&op),
        Err(ControllerError::NotAvailable { .. })
    );
    assert_matches!(c.view_anomaly_type(&op), Err(ControllerError::NotAvailable { .. }));

    // Failed reads are not visits.
    assert_eq!(c.view_times_visited(&supervisor(), &op).unwrap(), 0);

    c.deploy_plug_and_play(&op).unwrap();
    assert_eq!(c.view_state_of_wsn(&op).unwrap(), NetworkStatus::PlugAndPlay);
    c.set_estimation_state(&op).unwrap();
    assert_eq!(
        c.view_state_of_estimate(&op).unwrap(),
        EstimationStatus::AwaitingEstimate
    );
    assert_matches!(c.view_estimate(&op), Err(ControllerError::NotAvailable { .. }));

    c.record_state_estimate(&op, 83).unwrap();
    assert_eq!(c.view_state_of_estimate(&op).unwrap(), EstimationStatus::Recorded);
    assert_eq!(c.view_times_visited(&supervisor(), &op).unwrap(), 3);
}

#[test]
fn visit_counts_track_dashboard_reads_only() {
    let mut c = checked_controller(AnomalyPolicy::default());
    let (op, sup) = (operator(), supervisor());

    for _ in 0..4 {
        c.view_estimate(&op).unwrap();
    }
    c.view_state_of_wsn(&op).unwrap();
    c.view_state_of_estimate(&sup).unwrap();

    c.view_anomaly_detected(&op).unwrap();
    c.view_anomaly_type(&op).unwrap();
    c.view_times_visited(&sup, &op).unwrap();

    assert_eq!(c.view_times_visited(&sup, &op).unwrap(), 5);
    assert_eq!(c.view_times_visited(&sup, &sup).unwrap(), 1);
    assert_eq!(c.view_times_visited(&sup, &stranger()).unwrap(), 0);
}

#[test]
fn visit_audit_is_supervisor_only() {
    let c = checked_controller(AnomalyPolicy::default());
    assert_matches!(
        c.view_times_visited(&operator(), &operator()),
        Err(ControllerError::Authorization { .. })
    );
}

#[test]
fn unregistered_callers_are_rejected_everywhere() {
    let mut c = checked_controller(AnomalyPolicy::default());
    let before = c.snapshot();
    let x = stranger();

    assert_matches!(c.view_estimate(&x), Err(ControllerError::Authorization { .. }));
    assert_matches!(c.view_state_of_wsn(&x), Err(ControllerError::Authorization { .. }));
    assert_matches!(c.view_anomaly_type(&x), Err(ControllerError::Authorization { .. }));
    assert_matches!(c.deploy_fully(&x), Err(ControllerError::Authorization { .. }));
    assert_matches!(c.raise_alarm(&x), Err(ControllerError::Authorization { .. }));

    assert_eq!(c.snapshot(), before);
}

#[test]
fn estimate_is_write_once() {
    let mut c = checked_controller(AnomalyPolicy::default());
    assert_matches!(
        c.record_state_estimate(&operator(), 12),
        Err(ControllerError::Phase { .. })
    );
    assert_eq!(c.view_estimate(&operator()).unwrap(), 83);
}

#[test]
fn snapshot_serializes_to_json() {
    let mut c = checked_controller(AnomalyPolicy::default());
    c.view_estimate(&operator()).unwrap();
    let snapshot = c.snapshot();

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["phase"], "AnomalyChecked");
    assert_eq!(json["estimate"], 83);
    assert_eq!(json["anomaly"]["kind"], "above_range");
    assert_eq!(
        json["visits"]["0x3deea4dc72f6735374c26aae49939f375e790f07"],
        1
    );

    let back: wsn_core::ControllerSnapshot = serde_json::from_value(json).unwrap();
    assert_eq!(back, snapshot);
}

/// Flags every even estimate as below range.
#[derive(Debug)]
struct EvenEstimates;

impl AnomalyDetector for EvenEstimates {
    fn inspect(&self, estimate: i64) -> AnomalyRecord {
        if estimate % 2 == 0 {
            AnomalyRecord::flagged(AnomalyType::BelowRange)
        } else {
            AnomalyRecord::clear()
        }
    }
}

fn checked_with_even_detector(estimate: i64) -> MonitoringController {
    let roles = RoleBindings::new(operator(), supervisor()).unwrap();
    let mut c =
        MonitoringController::with_detector(roles, EstimateBounds::default(), Arc::new(EvenEstimates))
            .unwrap();
    c.deploy_plug_and_play(&operator()).unwrap();
    c.set_estimation_state(&operator()).unwrap();
    c.record_state_estimate(&operator(), estimate).unwrap();
    c
}

#[test]
fn custom_detector_decides_the_anomaly() {
    let mut flagged = checked_with_even_detector(84);
    let record = flagged.check_for_anomalies(&operator()).unwrap();
    assert_eq!(record, AnomalyRecord::flagged(AnomalyType::BelowRange));
    assert!(flagged.view_anomaly_detected(&operator()).unwrap());
    assert_eq!(
        flagged.view_anomaly_type(&operator()).unwrap(),
        AnomalyType::BelowRange
    );
    flagged.raise_alarm(&supervisor()).unwrap();
    assert!(flagged.alarm_raised());

    // 83 is above the default band but the custom detector lets it through.
    let mut clear = checked_with_even_detector(83);
    let record = clear.check_for_anomalies(&operator()).unwrap();
    assert!(!record.detected);
    assert!(!clear.view_anomaly_detected(&operator()).unwrap());
    assert_matches!(
        clear.raise_alarm(&supervisor()),
        Err(ControllerError::Domain { operation: Operation::RaiseAlarm, .. })
    );
    assert!(!clear.alarm_raised());
}

#[test]
fn custom_detector_still_requires_valid_bounds() {
    let err = MonitoringController::with_detector(
        RoleBindings::new(operator(), supervisor()).unwrap(),
        EstimateBounds { min: 5, max: 1 },
        Arc::new(EvenEstimates),
    )
    .unwrap_err();
    assert_matches!(err, ControllerError::Config { .. });
}
