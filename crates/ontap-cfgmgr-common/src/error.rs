//! Error types for cfgmgr operations.
//!
//! This module defines the error types used throughout the cfgmgr crates.
//! All errors implement `std::error::Error` via `thiserror`.

use serde::Serialize;
use thiserror::Error;

/// Result type alias for cfgmgr operations.
pub type CfgMgrResult<T> = Result<T, CfgMgrError>;

/// Errors that can occur during cfgmgr operations.
#[derive(Debug, Error)]
pub enum CfgMgrError {
    /// Configuration validation error. Raised before any remote call.
    #[error("Invalid configuration for {field}: {message}")]
    InvalidConfig {
        /// The field that failed validation.
        field: String,
        /// Error message.
        message: String,
    },

    /// The controller reported that the requested object does not exist.
    #[error("ZAPI {api}: entry not found: {reason}")]
    EntryNotFound {
        /// The ZAPI that was invoked.
        api: String,
        /// Reason text supplied by the controller.
        reason: String,
    },

    /// The controller rejected the call (auth, bad input, server fault).
    #[error("ZAPI {api} failed (errno {errno}): {reason}")]
    RemoteApi {
        /// The ZAPI that was invoked.
        api: String,
        /// Error number supplied by the controller.
        errno: String,
        /// Reason text supplied by the controller.
        reason: String,
    },

    /// The controller answered with something that is not a ZAPI response.
    #[error("Malformed ZAPI response: {message}")]
    Protocol {
        /// Error message.
        message: String,
    },

    /// The controller could not be reached.
    #[error("Failed to reach {endpoint}: {message}")]
    Transport {
        /// The URL that was being called.
        endpoint: String,
        /// Error message.
        message: String,
    },
}

impl CfgMgrError {
    /// Creates an invalid configuration error.
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an entry not found error.
    pub fn entry_not_found(api: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EntryNotFound {
            api: api.into(),
            reason: reason.into(),
        }
    }

    /// Creates a remote API error.
    pub fn remote_api(
        api: impl Into<String>,
        errno: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::RemoteApi {
            api: api.into(),
            errno: errno.into(),
            reason: reason.into(),
        }
    }

    /// Creates a protocol error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates a transport error.
    pub fn transport(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Returns true if the controller signalled that the object is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CfgMgrError::EntryNotFound { .. })
    }

    /// Returns the caller-facing error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            CfgMgrError::InvalidConfig { .. } => "ValidationError",
            CfgMgrError::EntryNotFound { .. } => "NotFoundError",
            CfgMgrError::RemoteApi { .. } | CfgMgrError::Protocol { .. } => "RemoteApiError",
            CfgMgrError::Transport { .. } => "TransportError",
        }
    }
}

/// Structured failure printed to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    /// Error kind, see [`CfgMgrError::kind`].
    pub kind: String,
    /// Human readable message.
    pub message: String,
}

impl From<&CfgMgrError> for ErrorReport {
    fn from(err: &CfgMgrError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}
