//! IPC command handlers.
//!
//! Each submodule implements the commands for one category. Handlers adapt
//! JSON-RPC parameters onto the library operations and map domain errors to
//! RPC error objects.

pub mod lottery;
pub mod sales;
pub mod users;

use tessera_ledger::LedgerError;
use tessera_lottery::LotteryError;

use crate::rpc::RpcError;

/// Map a ledger error to its RPC error.
pub(crate) fn ledger_error(err: &LedgerError) -> RpcError {
    match err {
        LedgerError::Validation(detail) => RpcError::invalid_params(detail),
        LedgerError::NotFound(what) => RpcError::not_found(what),
        LedgerError::Conflict(detail) => RpcError::conflict(detail),
        LedgerError::Overflow => RpcError::invalid_params("amount overflows"),
        LedgerError::Transaction(db) => RpcError::internal_error(&format!("db error: {db}")),
    }
}

/// Map a lottery error to its RPC error.
pub(crate) fn lottery_error(err: &LotteryError) -> RpcError {
    match err {
        LotteryError::Validation(detail) => RpcError::invalid_params(detail),
        LotteryError::NotFound(what) => RpcError::not_found(what),
        LotteryError::Conflict(detail) => RpcError::conflict(detail),
        LotteryError::EmptyPool { requested } => RpcError::empty_entry_pool(*requested),
        LotteryError::Overflow => RpcError::invalid_params("amount overflows"),
        LotteryError::Transaction(db) => RpcError::internal_error(&format!("db error: {db}")),
    }
}

/// Current Unix timestamp in seconds.
pub(crate) fn now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
