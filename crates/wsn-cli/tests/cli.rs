//! End-to-end tests for the CLI subcommands.

use assert_matches::assert_matches;
use wsn_cli::commands::{init, replay, run};
use wsn_cli::config::{LedgerSection, WsnConfig};
use wsn_core::{AnomalyPolicy, AnomalyType, LifecyclePhase, NetworkStatus};
use wsn_ledger::QueryValue;

fn read<'a>(report: &'a run::RunReport, function: &str) -> &'a QueryValue {
    &report
        .reads
        .iter()
        .find(|r| r.function == function)
        .unwrap()
        .value
}

#[tokio::test]
async fn default_run_completes_every_step() {
    let report = run::run(&WsnConfig::default(), run::DEFAULT_ESTIMATE, None)
        .await
        .unwrap();

    assert_eq!(report.snapshot.phase, LifecyclePhase::FullyDeployed);
    assert!(report.snapshot.alarm_raised);
    assert!(report.snapshot.anomalies_confirmed);
    assert!(report.journal.is_none());

    let functions: Vec<&str> = report.reads.iter().map(|r| r.function).collect();
    assert_eq!(
        functions,
        vec![
            "view_estimate",
            "view_state_of_WSN",
            "view_state_of_estimate",
            "view_times_visited",
            "view_anomaly_detected",
            "view_anomaly_type",
        ]
    );
    assert_eq!(read(&report, "view_estimate"), &QueryValue::Estimate(83));
    assert_eq!(
        read(&report, "view_state_of_WSN"),
        &QueryValue::NetworkStatus(NetworkStatus::FullyDeployed)
    );
    assert_eq!(read(&report, "view_times_visited"), &QueryValue::TimesVisited(3));
    assert_eq!(
        read(&report, "view_anomaly_type"),
        &QueryValue::AnomalyType(AnomalyType::AboveRange)
    );
}

#[tokio::test]
async fn in_range_estimate_skips_the_alarm() {
    let report = run::run(&WsnConfig::default(), 50, None).await.unwrap();

    assert_eq!(report.snapshot.phase, LifecyclePhase::FullyDeployed);
    assert!(!report.snapshot.alarm_raised);
    assert!(!report.snapshot.anomalies_confirmed);
    assert_eq!(
        read(&report, "view_anomaly_detected"),
        &QueryValue::AnomalyDetected(false)
    );
}

#[tokio::test]
async fn out_of_bounds_estimate_fails_the_run() {
    let config = WsnConfig {
        anomaly: AnomalyPolicy::Disabled,
        ..WsnConfig::default()
    };
    let err = run::run(&config, -5, None).await.unwrap_err();
    assert!(err.to_string().contains("record_state_estimate"));
}

#[tokio::test]
async fn run_journal_replays_to_the_same_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("journal.json");
    let config = WsnConfig {
        ledger: LedgerSection {
            journal: Some(path.clone()),
        },
        ..WsnConfig::default()
    };

    let report = run::run(&config, run::DEFAULT_ESTIMATE, None).await.unwrap();
    assert_eq!(report.journal.as_deref(), Some(path.as_path()));

    let snapshots = replay::run(&path).await.unwrap();
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].0, report.contract);
    assert_eq!(snapshots[0].1, report.snapshot);
}

#[tokio::test]
async fn replay_of_missing_journal_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(replay::run(&dir.path().join("nothing.json")).await.is_err());
}

#[test]
fn init_writes_loadable_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf").join("wsn.toml");

    let written = init::run(&path).unwrap();
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("[roles]"));
    assert!(content.contains("strategy = \"range\""));

    let parsed: WsnConfig = toml::from_str(&content).unwrap();
    assert_eq!(parsed, written);
    assert_eq!(parsed, WsnConfig::default());

    // A second init must not clobber the file.
    assert_matches!(init::run(&path), Err(_));
}

#[test]
fn partial_config_falls_back_to_defaults() {
    let parsed: WsnConfig = toml::from_str(
        r#"
        [anomaly]
        strategy = "range"
        low = 10
        high = 90
        "#,
    )
    .unwrap();

    assert_eq!(parsed.roles, WsnConfig::default().roles);
    assert_eq!(parsed.anomaly, AnomalyPolicy::Range { low: 10, high: 90 });
    parsed.validate().unwrap();
}
