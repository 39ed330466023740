//! The revenue threshold gate.
//!
//! A drawing may proceed once aggregate recorded revenue reaches a
//! caller-supplied threshold. The check and a subsequent draw are not one
//! atomic unit against concurrent sales; the draw re-derives its entry pool
//! fresh, so a sale landing between the two only widens the pool.

use rusqlite::Connection;
use serde::Serialize;

use crate::entries::{self, Entry};
use crate::{LotteryError, Result};

/// Outcome of a threshold check.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ThresholdStatus {
    /// Revenue reached the threshold; carries the full entry pool so the
    /// caller can inspect eligibility without a second query.
    Reached { entries: Vec<Entry> },
    /// Revenue has not reached the threshold; carries the current revenue
    /// for progress reporting.
    NotReached { current_revenue: u64 },
}

impl ThresholdStatus {
    /// Whether the threshold was reached.
    pub fn reached(&self) -> bool {
        matches!(self, Self::Reached { .. })
    }
}

/// Compare aggregate revenue against `threshold`, generating the entry pool
/// when reached.
///
/// # Errors
///
/// - [`LotteryError::Validation`] if the threshold is zero
pub fn check(conn: &Connection, threshold: u64) -> Result<ThresholdStatus> {
    if threshold == 0 {
        return Err(LotteryError::Validation(
            "revenue threshold must be positive".to_string(),
        ));
    }

    let current_revenue = tessera_ledger::report::total_revenue(conn)?;

    if current_revenue >= threshold {
        let entries = entries::generate(conn)?;
        tracing::info!(
            current_revenue,
            threshold,
            total_entries = entries.len(),
            "revenue threshold reached"
        );
        Ok(ThresholdStatus::Reached { entries })
    } else {
        tracing::debug!(current_revenue, threshold, "revenue threshold not reached");
        Ok(ThresholdStatus::NotReached { current_revenue })
    }
}
