//! Shared error type across waypoint crates.

use thiserror::Error;

/// Stable failure classes exposed to embedding applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Network-layer failure or non-2xx transport status.
    Transport,
    /// Malformed or contract-violating server response.
    Protocol,
    /// Signing collaborator failed to produce a signature.
    Signing,
    /// Credentials rejected and reauthentication failed.
    AuthFailed,
    /// Redirect/auth recovery attempts exhausted.
    RecoveryExhausted,
    /// Server-provided endpoint rejected by the host allowlist.
    InvalidEndpoint,
    /// Internal invariant failure.
    Internal,
}

impl FailureClass {
    /// String representation used in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            FailureClass::Transport => "TRANSPORT",
            FailureClass::Protocol => "PROTOCOL",
            FailureClass::Signing => "SIGNING",
            FailureClass::AuthFailed => "AUTH_FAILED",
            FailureClass::RecoveryExhausted => "RECOVERY_EXHAUSTED",
            FailureClass::InvalidEndpoint => "INVALID_ENDPOINT",
            FailureClass::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, RpcError>;

/// Unified error type used by proto and client.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("transport: {0}")]
    Transport(String),
    #[error("protocol violation: {0}")]
    Protocol(String),
    #[error("signing failed: {0}")]
    Signing(String),
    #[error("auth failed")]
    AuthFailed,
    #[error("recovery exhausted after {attempts} attempts")]
    RecoveryExhausted { attempts: u32 },
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl RpcError {
    /// Map the error to a stable failure class.
    pub fn class(&self) -> FailureClass {
        match self {
            RpcError::Transport(_) => FailureClass::Transport,
            RpcError::Protocol(_) => FailureClass::Protocol,
            RpcError::Signing(_) => FailureClass::Signing,
            RpcError::AuthFailed => FailureClass::AuthFailed,
            RpcError::RecoveryExhausted { .. } => FailureClass::RecoveryExhausted,
            RpcError::InvalidEndpoint(_) => FailureClass::InvalidEndpoint,
            RpcError::Internal(_) => FailureClass::Internal,
        }
    }
}
