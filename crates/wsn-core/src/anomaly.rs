//! Anomaly detection capability
//!
//! The controller does not know how anomalies are recognised. It hands the
//! recorded estimate to an [`AnomalyDetector`] and stores whatever record comes
//! back.

use crate::errors::{ControllerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Classifier attached to an anomaly record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyType {
    /// Nothing anomalous
    None,
    /// Estimate under the accepted band
    BelowRange,
    /// Estimate over the accepted band
    AboveRange,
}

impl fmt::Display for AnomalyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::BelowRange => f.write_str("below_range"),
            Self::AboveRange => f.write_str("above_range"),
        }
    }
}

/// Outcome of one anomaly check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyRecord {
    /// Whether the estimate was judged anomalous
    pub detected: bool,
    /// Classification; [`AnomalyType::None`] when nothing was detected
    pub kind: AnomalyType,
}

impl AnomalyRecord {
    /// A record with nothing detected.
    pub fn clear() -> Self {
        Self {
            detected: false,
            kind: AnomalyType::None,
        }
    }

    /// A record flagging `kind`.
    pub fn flagged(kind: AnomalyType) -> Self {
        Self {
            detected: true,
            kind,
        }
    }
}

/// Detection strategy run by `check_for_anomalies`.
pub trait AnomalyDetector: fmt::Debug + Send + Sync {
    /// Classify a recorded estimate.
    fn inspect(&self, estimate: i64) -> AnomalyRecord;
}

/// Flags estimates outside the inclusive band `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeDetector {
    low: i64,
    high: i64,
}

impl RangeDetector {
    /// Band `[low, high]`; fails with [`ControllerError::Config`] if empty.
    pub fn new(low: i64, high: i64) -> Result<Self> {
        if low > high {
            return Err(ControllerError::config(format!(
                "anomaly band is empty: low {low} > high {high}"
            )));
        }
        Ok(Self { low, high })
    }

    /// A band covering every estimate; never detects anything.
    pub fn unbounded() -> Self {
        Self {
            low: i64::MIN,
            high: i64::MAX,
        }
    }
}

impl AnomalyDetector for RangeDetector {
    fn inspect(&self, estimate: i64) -> AnomalyRecord {
        if estimate < self.low {
            AnomalyRecord::flagged(AnomalyType::BelowRange)
        } else if estimate > self.high {
            AnomalyRecord::flagged(AnomalyType::AboveRange)
        } else {
            AnomalyRecord::clear()
        }
    }
}

/// Serializable description of the detection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum AnomalyPolicy {
    /// [`RangeDetector`] over `[low, high]`
    Range {
        /// Lowest normal estimate
        low: i64,
        /// Highest normal estimate
        high: i64,
    },
    /// Never detect
    Disabled,
}

impl Default for AnomalyPolicy {
    fn default() -> Self {
        Self::Range { low: 20, high: 80 }
    }
}

impl AnomalyPolicy {
    /// Check the policy builds a detector.
    pub fn validate(&self) -> Result<()> {
        self.build().map(|_| ())
    }

    /// Instantiate the detector this policy describes.
    pub fn build(&self) -> Result<Arc<dyn AnomalyDetector>> {
        let detector = match *self {
            Self::Range { low, high } => RangeDetector::new(low, high)?,
            Self::Disabled => RangeDetector::unbounded(),
        };
        Ok(Arc::new(detector))
    }
}
