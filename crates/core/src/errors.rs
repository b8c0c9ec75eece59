use thiserror::Error;

use crate::validation::RejectionReason;

#[derive(Error, Debug)]
pub enum BookingError {
    /// Expected business outcome, never logged as an error. The reason
    /// code is surfaced verbatim to the caller.
    #[error("Slot rejected: {0}")]
    Rejected(RejectionReason),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A defect in stored data (e.g. non-positive slot length). The
    /// whole operation is rejected rather than guessing a default.
    #[error("Invariant violation: {0}")]
    Invariant(String),

    /// Transient store failure. Retryable, and distinct from a
    /// validation rejection so callers can tell "try a different slot"
    /// from "try again shortly".
    #[error("Store error: {0}")]
    Store(#[from] eyre::Report),
}

pub type BookingResult<T> = Result<T, BookingError>;
