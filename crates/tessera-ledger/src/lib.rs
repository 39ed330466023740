//! # tessera-ledger
//!
//! Commission accrual and the sales ledger.
//!
//! Recording a sale computes the category commission and, when the referral
//! code resolves, credits the affiliate's balance — both inside a single
//! transaction so no observer ever sees one without the other.
//!
//! ## Modules
//!
//! - [`rates`] — category commission rates and commission arithmetic
//! - [`recorder`] — transactional sale recording (the Sale Recorder)
//! - [`affiliate`] — affiliate enrollment and referral-code issuance
//! - [`report`] — read-only ledger projections

pub mod affiliate;
pub mod rates;
pub mod recorder;
pub mod report;

/// Error types for ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Malformed or missing input; surfaced to the caller, never retried.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Duplicate identifier or uniqueness violation; indicates a
    /// generation bug, not retryable.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Arithmetic overflow in commission calculation.
    #[error("arithmetic overflow in commission calculation")]
    Overflow,

    /// Persistence failure mid-operation; the transaction was rolled back
    /// and the caller may retry.
    #[error("transaction failed: {0}")]
    Transaction(tessera_db::DbError),
}

impl From<tessera_db::DbError> for LedgerError {
    fn from(err: tessera_db::DbError) -> Self {
        match err {
            tessera_db::DbError::NotFound(what) => Self::NotFound(what),
            tessera_db::DbError::Constraint(what) => Self::Conflict(what),
            other => Self::Transaction(other),
        }
    }
}

impl From<rusqlite::Error> for LedgerError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Transaction(tessera_db::DbError::Sqlite(err))
    }
}

/// Convenience result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
