//! Driver Errors
//!
//! A single error type shared by every port and driver. Drivers never wrap
//! these values: a failure raised by a collaborator reaches the caller with
//! its original variant so upstream orchestration can tell kinds apart.

use crate::domain::value_objects::ObjectKind;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, DriverError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DriverError {
    /// Local bookkeeping miss: the logical id has no backend counterpart.
    #[error("{kind} binding not found for {id} on backend instance {instance}")]
    BindingNotFound {
        kind: ObjectKind,
        id: String,
        instance: String,
    },

    /// Transport, connection or authentication failure talking to a backend.
    /// `auth` is set when the backend refused the credentials.
    #[error("backend {endpoint} unavailable: {reason}")]
    BackendUnavailable {
        endpoint: String,
        reason: String,
        auth: bool,
    },

    /// The backend answered with an error status.
    #[error("backend rejected request with status {status}: {body}")]
    BackendRejected { status: u16, body: String },

    /// A creation call succeeded but carried no Location header.
    #[error("create response for {resource} has no location header")]
    MissingLocation { resource: String },

    #[error("no eligible agent found for pool {pool_id}")]
    NoEligibleAgent { pool_id: String },

    #[error("no active agent hosts pool {pool_id}")]
    NoActiveAgent { pool_id: String },

    #[error("port {port_id} not found")]
    PortNotFound { port_id: String },

    #[error("pool {pool_id} not found")]
    PoolNotFound { pool_id: String },

    #[error("{kind} {id} not found")]
    NetworkResourceNotFound { kind: String, id: String },

    #[error("invalid backend response: {0}")]
    InvalidResponse(String),

    #[error("binding storage error: {0}")]
    Storage(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl DriverError {
    /// Transport-level failure reaching `endpoint`.
    pub fn unavailable(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            endpoint: endpoint.into(),
            reason: reason.into(),
            auth: false,
        }
    }

    /// The backend at `endpoint` refused our credentials.
    pub fn auth_failed(endpoint: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            endpoint: endpoint.into(),
            reason: "authentication failed: invalid credentials".to_string(),
            auth: true,
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::BackendUnavailable { auth: true, .. })
    }
}

impl From<rusqlite::Error> for DriverError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Storage(e.to_string())
    }
}
