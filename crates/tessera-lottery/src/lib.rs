//! # tessera-lottery
//!
//! The lottery allocation engine: entry generation, the revenue threshold
//! gate, weighted random selection with tax withholding, and the atomic
//! drawing commit.
//!
//! ## Modules
//!
//! - [`entries`] — converts ledger balances and loyalty points into entries
//! - [`threshold`] — gates drawings on aggregate revenue
//! - [`draw`] — with-replacement weighted selection and withholding
//! - [`recorder`] — all-or-nothing drawing persistence and read-back

pub mod draw;
pub mod entries;
pub mod recorder;
pub mod threshold;

/// Error types for lottery operations.
#[derive(Debug, thiserror::Error)]
pub enum LotteryError {
    /// Malformed or missing input; surfaced to the caller, never retried.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Duplicate identifier or illegal status transition.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A draw was requested against an empty entry pool.
    #[error("cannot select {requested} winners from an empty entry pool")]
    EmptyPool {
        /// Total winner slots requested across all tiers.
        requested: u32,
    },

    /// Arithmetic overflow in prize or entry calculation.
    #[error("arithmetic overflow in lottery calculation")]
    Overflow,

    /// Persistence failure mid-commit; the whole drawing was rolled back
    /// and the caller may retry.
    #[error("transaction failed: {0}")]
    Transaction(tessera_db::DbError),
}

impl From<tessera_db::DbError> for LotteryError {
    fn from(err: tessera_db::DbError) -> Self {
        match err {
            tessera_db::DbError::NotFound(what) => Self::NotFound(what),
            tessera_db::DbError::Constraint(what) => Self::Conflict(what),
            other => Self::Transaction(other),
        }
    }
}

impl From<rusqlite::Error> for LotteryError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Transaction(tessera_db::DbError::Sqlite(err))
    }
}

impl From<tessera_ledger::LedgerError> for LotteryError {
    fn from(err: tessera_ledger::LedgerError) -> Self {
        match err {
            tessera_ledger::LedgerError::Validation(s) => Self::Validation(s),
            tessera_ledger::LedgerError::NotFound(s) => Self::NotFound(s),
            tessera_ledger::LedgerError::Conflict(s) => Self::Conflict(s),
            tessera_ledger::LedgerError::Overflow => Self::Overflow,
            tessera_ledger::LedgerError::Transaction(db) => Self::Transaction(db),
        }
    }
}

/// Convenience result type for lottery operations.
pub type Result<T> = std::result::Result<T, LotteryError>;
