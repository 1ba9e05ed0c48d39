use alloy_transport::TransportError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// EIP-1193 error code returned when the user declines a wallet request.
pub const USER_REJECTED_CODE: i64 = 4001;

/// The category of an error surfaced through the session state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No wallet provider is available.
    ProviderMissing,
    /// The user declined the authorization request.
    UserRejected,
    /// The amount text could not be turned into a positive base-unit quantity.
    InvalidAmount,
    /// The wrap transaction could not be submitted.
    SubmissionFailed,
    /// The wrap transaction was submitted but never confirmed successfully.
    ConfirmationFailed,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ProviderMissing => "provider missing",
            Self::UserRejected => "user rejected",
            Self::InvalidAmount => "invalid amount",
            Self::SubmissionFailed => "submission failed",
            Self::ConfirmationFailed => "confirmation failed",
        };
        f.write_str(s)
    }
}

/// An error recorded in the session state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn provider_missing() -> Self {
        Self::new(ErrorKind::ProviderMissing, "No wallet provider is available")
    }

    pub fn not_connected() -> Self {
        Self::new(ErrorKind::SubmissionFailed, "Please connect your wallet first")
    }

    pub fn already_pending() -> Self {
        Self::new(ErrorKind::SubmissionFailed, "A wrap transaction is already pending")
    }
}

/// Errors reported by a wallet provider or its signing handle.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The user declined the request in their wallet.
    #[error("{0}")]
    Rejected(String),
    /// There is no provider, or it exposes no accounts.
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    Rpc(String),
}

impl ProviderError {
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn rpc(msg: impl Into<String>) -> Self {
        Self::Rpc(msg.into())
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

impl From<TransportError> for ProviderError {
    fn from(err: TransportError) -> Self {
        match err.as_error_resp() {
            Some(payload) if payload.code == USER_REJECTED_CODE => {
                Self::Rejected(payload.message.to_string())
            }
            Some(payload) => Self::Rpc(payload.message.to_string()),
            None => Self::Rpc(err.to_string()),
        }
    }
}
