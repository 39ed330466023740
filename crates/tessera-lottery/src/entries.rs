//! Lottery entry generation.
//!
//! Entries are ephemeral: generated fresh from the current ledger and user
//! state on every call, never persisted. Each entry is one unit of weight.
//!
//! ## Conversion rule
//!
//! - Every affiliate contributes `floor(commission_balance / 10_000)`
//!   entries tagged `affiliate`.
//! - Every user with at least 10 loyalty points contributes
//!   `floor(points / 10)` entries tagged `consumer`.
//!
//! A user holding both roles contributes to both pools independently.
//! The output order is deterministic within one call (affiliates by
//! affiliate id, then consumers by user id) so repeated draws from the same
//! snapshot are reproducible for audit.

use rusqlite::Connection;
use serde::Serialize;

use tessera_db::queries::{affiliates, users};
use tessera_types::lottery::EntrySource;
use tessera_types::{COMMISSION_PER_ENTRY, POINTS_PER_ENTRY};

use crate::Result;

/// One unit of weighted chance in a drawing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// The user who wins if this entry is drawn.
    pub user_id: String,
    /// Which pool the entry was derived from.
    pub source: EntrySource,
}

/// Whole entries contributed by a balance or point total at the given unit.
pub fn entries_for(value: u64, unit: u64) -> u64 {
    value / unit
}

/// Materialize the full entry pool from current affiliate balances and
/// user loyalty points.
pub fn generate(conn: &Connection) -> Result<Vec<Entry>> {
    let mut entries = Vec::new();

    for affiliate in affiliates::list(conn)? {
        let count = entries_for(affiliate.commission_balance, COMMISSION_PER_ENTRY);
        for _ in 0..count {
            entries.push(Entry {
                user_id: affiliate.user_id.clone(),
                source: EntrySource::Affiliate,
            });
        }
    }

    for user in users::with_min_points(conn, POINTS_PER_ENTRY)? {
        let count = entries_for(user.points, POINTS_PER_ENTRY);
        for _ in 0..count {
            entries.push(Entry {
                user_id: user.user_id.clone(),
                source: EntrySource::Consumer,
            });
        }
    }

    tracing::debug!(total = entries.len(), "entry pool generated");

    Ok(entries)
}
