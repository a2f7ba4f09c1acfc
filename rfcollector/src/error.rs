//! High-level error types

use std::time::Duration;

use rfcollector_core::StatusCode;

use crate::bootstrap::BootstrapStep;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Core protocol error: {0}")]
    Core(#[from] rfcollector_core::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] rfcollector_transport::Error),

    #[error("Type error: {0}")]
    Types(#[from] rfcollector_types::Error),

    /// The connection could not be established or was refused by the reader
    #[error("Connection failed: {0}")]
    Connection(String),

    /// No correlated response before the deadline
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// Reader answered with a non-success status
    #[error("{operation} failed: {code}: {description}")]
    Status {
        operation: &'static str,
        code: StatusCode,
        description: String,
    },

    #[error("Unexpected reader vendor: expected {expected}, reader reports {actual}")]
    VendorMismatch { expected: u32, actual: u32 },

    #[error("Bootstrap failed at {step}: {source}")]
    Bootstrap {
        step: BootstrapStep,
        #[source]
        source: Box<Error>,
    },

    #[error("Invalid definition: {0}")]
    Definition(String),

    #[error("Invalid response from reader: {0}")]
    InvalidResponse(String),

    /// Connection ended while a response was awaited
    #[error("Connection lost while waiting for {operation}")]
    Disconnected { operation: &'static str },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check whether a deadline expired, here or in a failed bootstrap step
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Bootstrap { source, .. } => source.is_timeout(),
            _ => false,
        }
    }

    /// Check whether the reader rejected an operation
    pub fn is_status(&self) -> bool {
        match self {
            Self::Status { .. } => true,
            Self::Bootstrap { source, .. } => source.is_status(),
            _ => false,
        }
    }

    /// Check whether the process cannot go on after this error
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Connection(_)
                | Self::VendorMismatch { .. }
                | Self::Bootstrap { .. }
                | Self::Definition(_)
        )
    }

    /// Failed bootstrap step, if any
    pub fn bootstrap_step(&self) -> Option<BootstrapStep> {
        match self {
            Self::Bootstrap { step, .. } => Some(*step),
            _ => None,
        }
    }
}
