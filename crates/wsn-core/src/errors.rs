//! Controller error taxonomy
//!
//! Every failure is local and synchronous. Guards run before any mutation, so
//! a returned error always means the controller state is exactly as it was
//! before the call.

use crate::identifiers::{Access, Address};
use crate::operation::Operation;
use crate::phase::LifecyclePhase;
use serde::{Deserialize, Serialize};

/// Error type for all controller operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ControllerError {
    /// Invalid construction or configuration
    #[error("Config error: {message}")]
    Config {
        /// What is wrong with the configuration
        message: String,
    },

    /// Caller is not bound to the role the operation requires
    #[error("Authorization error: {operation} requires {required}, called by {caller}")]
    Authorization {
        /// Operation that was attempted
        operation: Operation,
        /// Access rule the caller failed
        required: Access,
        /// Address the call was attributed to
        caller: Address,
    },

    /// Lifecycle precondition not met
    #[error("Phase error: {operation} not allowed in phase {current}: {reason}")]
    Phase {
        /// Operation that was attempted
        operation: Operation,
        /// Phase at the time of the call
        current: LifecyclePhase,
        /// Which precondition failed
        reason: String,
    },

    /// Argument or state outside the accepted domain
    #[error("Domain error: {operation}: {message}")]
    Domain {
        /// Operation that was attempted
        operation: Operation,
        /// Description of the violated constraint
        message: String,
    },

    /// Read issued before the data it asks for exists
    #[error("Not available: {what} has not been recorded yet")]
    NotAvailable {
        /// The missing datum
        what: String,
    },
}

impl ControllerError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an authorization error
    pub fn authorization(operation: Operation, required: Access, caller: Address) -> Self {
        Self::Authorization {
            operation,
            required,
            caller,
        }
    }

    /// Create a phase error
    pub fn phase(operation: Operation, current: LifecyclePhase, reason: impl Into<String>) -> Self {
        Self::Phase {
            operation,
            current,
            reason: reason.into(),
        }
    }

    /// Create a domain error
    pub fn domain(operation: Operation, message: impl Into<String>) -> Self {
        Self::Domain {
            operation,
            message: message.into(),
        }
    }

    /// Create a not-available error
    pub fn not_available(what: impl Into<String>) -> Self {
        Self::NotAvailable { what: what.into() }
    }

    /// Short category name, stable across message changes.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Authorization { .. } => "authorization",
            Self::Phase { .. } => "phase",
            Self::Domain { .. } => "domain",
            Self::NotAvailable { .. } => "not_available",
        }
    }
}

/// Standard Result type for controller operations
pub type Result<T> = std::result::Result<T, ControllerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ControllerError::phase(
            Operation::RecordStateEstimate,
            LifecyclePhase::PlugAndPlayDeployed,
            "requires EstimationStateSet",
        );
        assert_eq!(
            err.to_string(),
            "Phase error: record_state_estimate not allowed in phase PlugAndPlayDeployed: requires EstimationStateSet"
        );
        assert_eq!(err.kind(), "phase");
    }

    #[test]
    fn test_error_serializes() {
        let err = ControllerError::not_available("estimate");
        let json = serde_json::to_string(&err).unwrap();
        let back: ControllerError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, err);
    }
}
