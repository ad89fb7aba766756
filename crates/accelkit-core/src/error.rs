//! Error types for accelerator operations.
//!
//! Every failure an accelerator can report at run time is one of these
//! variants. Backend selection problems never show up here: they are
//! rejected at build time.

use std::fmt::Display;
use thiserror::Error;

/// Errors that can occur while acquiring or driving an accelerator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccError {
    /// A device, queue, module or buffer could not be obtained.
    ///
    /// Not retried internally; retry policy belongs to the caller.
    #[error("Failed to acquire {resource}: {reason}")]
    ResourceAcquisition {
        /// What was being acquired
        resource: String,
        /// Why the acquisition failed
        reason: String,
    },

    /// The backend reported a fault while executing submitted work.
    #[error("Execution failed during {stage}: {reason}")]
    Execution {
        /// Stage or operation that failed
        stage: String,
        /// Backend-provided description of the fault
        reason: String,
    },

    /// A work division does not fit the device limits.
    #[error("Invalid work division: {reason}")]
    InvalidWorkDiv {
        /// Description of the violated limit
        reason: String,
    },

    /// An extent or index does not fit the target numeric type.
    #[error("Index overflow: {value} is not representable")]
    IndexOverflow {
        /// The offending value
        value: String,
    },

    /// Caller-provided data violates a precondition.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Description of the violated precondition
        reason: String,
    },

    /// A tuning parameter is out of range.
    #[error("Invalid configuration for {parameter} = {value}: {reason}")]
    InvalidConfiguration {
        /// Name of the parameter
        parameter: String,
        /// Value that was rejected
        value: String,
        /// Why it was rejected
        reason: String,
    },
}

impl AccError {
    /// Create a ResourceAcquisition error.
    pub fn resource<S1, S2>(resource: S1, reason: S2) -> Self
    where
        S1: Into<String>,
        S2: Display,
    {
        Self::ResourceAcquisition {
            resource: resource.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an Execution error.
    pub fn execution<S1, S2>(stage: S1, reason: S2) -> Self
    where
        S1: Into<String>,
        S2: Display,
    {
        Self::Execution {
            stage: stage.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an InvalidWorkDiv error.
    pub fn invalid_work_div<S: Into<String>>(reason: S) -> Self {
        Self::InvalidWorkDiv {
            reason: reason.into(),
        }
    }

    /// Create an IndexOverflow error.
    pub fn index_overflow<V: Display>(value: V) -> Self {
        Self::IndexOverflow {
            value: value.to_string(),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input<S: Into<String>>(reason: S) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfiguration error.
    pub fn invalid_configuration<S1, S2, S3>(parameter: S1, value: S2, reason: S3) -> Self
    where
        S1: Into<String>,
        S2: Display,
        S3: Into<String>,
    {
        Self::InvalidConfiguration {
            parameter: parameter.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the failure happened while acquiring a resource rather than
    /// while running work.
    pub fn is_resource_failure(&self) -> bool {
        matches!(self, Self::ResourceAcquisition { .. })
    }
}

/// Result type alias for accelerator operations.
pub type Result<T> = std::result::Result<T, AccError>;
