//! Error taxonomy for the board client.
//!
//! Every failure crossing the wallet or gateway boundary is a `BoardError`.
//! Only the intent controller turns these into session or board state changes.

use thiserror::Error;

pub type BoardResult<T> = Result<T, BoardError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    /// No signing capability is present (no wallet, unreadable keypair).
    #[error("signing capability unavailable: {0}")]
    CapabilityUnavailable(String),

    /// The user declined a connect or sign prompt.
    #[error("request rejected by the user")]
    UserRejected,

    /// The remote program refused the call.
    #[error("remote program rejected {operation}: {reason}")]
    RemoteRejected { operation: String, reason: String },

    /// Network or transport failure. Never retried by the client.
    #[error("transient failure during {operation}: {reason}")]
    TransientFailure { operation: String, reason: String },

    /// A vote targets a position outside the last fetched snapshot.
    #[error("entry index {index} is out of bounds for a board of {len} entries")]
    StaleIndex { index: usize, len: usize },

    /// A vote carries an epoch token from a snapshot that has since been replaced.
    #[error("snapshot epoch {given} is stale (current epoch is {current})")]
    StaleSnapshot { given: u64, current: u64 },

    /// The intent requires a connected session.
    #[error("wallet is not connected")]
    NotConnected,

    /// Entry submission with an empty link.
    #[error("entry link must not be empty")]
    EmptyLink,

    /// Board account exists but cannot be decoded.
    #[error("board account is malformed: {0}")]
    Decode(String),

    /// Invalid configuration input.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl BoardError {
    pub fn remote_rejected(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::RemoteRejected {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    pub fn transient(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::TransientFailure {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Stable machine-readable code, used for JSON output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::CapabilityUnavailable(_) => "capability_unavailable",
            Self::UserRejected => "user_rejected",
            Self::RemoteRejected { .. } => "remote_rejected",
            Self::TransientFailure { .. } => "transient_failure",
            Self::StaleIndex { .. } => "stale_index",
            Self::StaleSnapshot { .. } => "stale_snapshot",
            Self::NotConnected => "not_connected",
            Self::EmptyLink => "empty_link",
            Self::Decode(_) => "decode",
            Self::Config(_) => "config",
        }
    }

    /// True for failures that were decided locally, before any remote call.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::StaleIndex { .. }
                | Self::StaleSnapshot { .. }
                | Self::NotConnected
                | Self::EmptyLink
                | Self::Config(_)
        )
    }
}
