//! WSN Core - permissioned lifecycle controller
//!
//! A monitored sensor network is driven through deployment, state estimation
//! and anomaly handling by two fixed roles. This crate holds the state machine
//! that decides who may do what, in which order, and what becomes immutable
//! once recorded. It performs no I/O; persistence and call ordering belong to
//! the ledger transport that hosts it.
//!
//! # Lifecycle
//!
//! ```text
//! operator:    deploy_plug_and_play → set_estimation_state
//!              → record_state_estimate → check_for_anomalies
//! supervisor:  deploy_fully, raise_alarm, confirm_anomalies
//! ```
//!
//! # Guards
//! - Role: each call requires the operator, the supervisor, or either
//! - Phase: transitions move forward exactly one step, never back
//! - Domain: estimates must sit inside the configured bounds, and the
//!   supervisor flags need a detected anomaly

#![forbid(unsafe_code)]

/// Anomaly detection strategies and records
pub mod anomaly;

/// Estimate bounds and controller configuration
pub mod config;

/// The controller state machine
pub mod controller;

/// Unified error handling
pub mod errors;

/// Caller addresses and roles
pub mod identifiers;

/// Call names and access rules
pub mod operation;

/// Lifecycle phases and status answers
pub mod phase;

/// Dashboard visit counters
pub mod visits;

pub use anomaly::{AnomalyDetector, AnomalyPolicy, AnomalyRecord, AnomalyType, RangeDetector};
pub use config::{ControllerConfig, EstimateBounds};
pub use controller::{ControllerSnapshot, MonitoringController};
pub use errors::{ControllerError, Result};
pub use identifiers::{Access, Address, Role, RoleBindings, ADDRESS_LEN};
pub use operation::Operation;
pub use phase::{EstimationStatus, LifecyclePhase, NetworkStatus};
pub use visits::VisitLedger;
