//! Controller configuration

use crate::anomaly::AnomalyPolicy;
use crate::errors::{ControllerError, Result};
use crate::identifiers::RoleBindings;
use crate::operation::Operation;
use serde::{Deserialize, Serialize};

/// Inclusive range of accepted estimate values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateBounds {
    /// Smallest accepted estimate
    pub min: i64,
    /// Largest accepted estimate
    pub max: i64,
}

impl Default for EstimateBounds {
    fn default() -> Self {
        Self {
            min: 0,
            max: 1_000_000,
        }
    }
}

impl EstimateBounds {
    /// Bounds `[min, max]`; fails with [`ControllerError::Config`] if empty.
    pub fn new(min: i64, max: i64) -> Result<Self> {
        let bounds = Self { min, max };
        bounds.validate()?;
        Ok(bounds)
    }

    /// Reject empty bounds.
    pub fn validate(&self) -> Result<()> {
        if self.min > self.max {
            return Err(ControllerError::config(format!(
                "estimate bounds are empty: min {} > max {}",
                self.min, self.max
            )));
        }
        Ok(())
    }

    /// Whether `value` lies inside the bounds.
    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Reject `value` with a domain error if it falls outside the bounds.
    pub fn check(&self, value: i64) -> Result<()> {
        if self.contains(value) {
            Ok(())
        } else {
            Err(ControllerError::domain(
                Operation::RecordStateEstimate,
                format!(
                    "estimate {value} outside accepted range [{}, {}]",
                    self.min, self.max
                ),
            ))
        }
    }
}

/// Everything needed to construct a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Operator and supervisor addresses
    pub roles: RoleBindings,
    /// Accepted estimate range
    #[serde(default)]
    pub bounds: EstimateBounds,
    /// Detection strategy
    #[serde(default)]
    pub anomaly: AnomalyPolicy,
}

impl ControllerConfig {
    /// Config with default bounds and detection policy.
    pub fn new(roles: RoleBindings) -> Self {
        Self {
            roles,
            bounds: EstimateBounds::default(),
            anomaly: AnomalyPolicy::default(),
        }
    }

    /// Replace the estimate bounds.
    pub fn with_bounds(mut self, bounds: EstimateBounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Replace the detection strategy.
    pub fn with_anomaly_policy(mut self, anomaly: AnomalyPolicy) -> Self {
        self.anomaly = anomaly;
        self
    }

    /// Validate roles, bounds and policy.
    pub fn validate(&self) -> Result<()> {
        self.roles.validate()?;
        self.bounds.validate()?;
        self.anomaly.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_check() {
        let bounds = EstimateBounds::new(1, 100).unwrap();
        assert!(bounds.check(1).is_ok());
        assert!(bounds.check(100).is_ok());
        assert!(matches!(
            bounds.check(101),
            Err(ControllerError::Domain { .. })
        ));
        assert!(matches!(
            EstimateBounds::new(5, 4),
            Err(ControllerError::Config { .. })
        ));
    }
}
