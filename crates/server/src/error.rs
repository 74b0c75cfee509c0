use thiserror::Error;

/// What went wrong inside a notification transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryErrorKind {
    /// The message could not be built (bad address, template failure).
    InvalidMessage,
    /// The transport rejected the message or the connection failed.
    Transport,
    /// The bounded per-call timeout elapsed.
    Timeout,
}

/// A single failed delivery attempt on one channel for one recipient.
///
/// `transient` distinguishes retryable failures (timeouts, connection drops)
/// from permanent ones (malformed addresses, hard rejects). The dispatcher
/// currently treats every failure as terminal for the attempt, but the
/// classification is preserved in the logged outcome.
#[derive(Debug, Clone, Error)]
#[error("{kind:?} delivery failure: {message}")]
pub struct DeliveryError {
    pub kind: DeliveryErrorKind,
    pub transient: bool,
    pub message: String,
}

impl DeliveryError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: DeliveryErrorKind::Transport,
            transient: true,
            message: message.into(),
        }
    }

    pub fn timeout(after: std::time::Duration) -> Self {
        Self {
            kind: DeliveryErrorKind::Timeout,
            transient: true,
            message: format!("timed out after {after:?}"),
        }
    }

    pub fn invalid_message(message: impl Into<String>) -> Self {
        Self {
            kind: DeliveryErrorKind::InvalidMessage,
            transient: false,
            message: message.into(),
        }
    }
}

/// Errors surfaced by [`crate::alerts::AlertDispatcher::dispatch`].
///
/// Individual channel failures never appear here; they are folded into the
/// per-channel counters of the returned result. Only invalid criteria,
/// an empty donor pool, and a failing directory abort a dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Invalid alert criteria: {0}")]
    Validation(String),
    #[error("No donors are registered for this alert")]
    NoRecipients,
    #[error("Donor directory query failed: {0}")]
    Directory(String),
}

impl From<sea_orm::DbErr> for DispatchError {
    fn from(e: sea_orm::DbErr) -> Self {
        DispatchError::Directory(e.to_string())
    }
}

/// Errors surfaced by [`crate::alerts::ResponseRecorder::record`].
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("Response link is missing required parameters")]
    InvalidLink,
    #[error("No donor is registered for this contact")]
    UnknownDonor,
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Audit writes are best-effort; this error is logged and swallowed.
#[derive(Debug, Error)]
#[error("Failed to append audit record: {0}")]
pub struct AuditError(#[from] pub sea_orm::DbErr);
