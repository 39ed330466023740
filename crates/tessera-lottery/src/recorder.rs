//! Drawing persistence and read-back.
//!
//! The drawing header and all winner rows are written inside a single
//! transaction; a failed winner insert rolls back the whole drawing. There
//! is never a persisted drawing with a partial winner set.

use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};
use rusqlite::Connection;
use serde::Serialize;

use tessera_db::queries::drawings;
use tessera_types::id;
use tessera_types::lottery::{PrizeTier, WinnerStatus};

use crate::draw::{self, DrawnWinner};
use crate::{entries, LotteryError, Result};

/// A winner as persisted.
#[derive(Clone, Debug, Serialize)]
pub struct PersistedWinner {
    pub winner_id: String,
    pub user_id: String,
    pub prize_amount: u64,
    pub tax_withheld: u64,
    pub net_amount: u64,
    pub status: WinnerStatus,
}

/// A committed drawing with its full winner set.
#[derive(Clone, Debug, Serialize)]
pub struct PersistedDrawing {
    pub drawing_id: String,
    /// Hex-encoded RNG seed, recorded for audit replay.
    pub seed: String,
    pub created_at: u64,
    pub winners: Vec<PersistedWinner>,
}

/// Commit a drawing and its winners as one atomic unit.
///
/// # Errors
///
/// - [`LotteryError::Validation`] if the winner list is empty
/// - [`LotteryError::Transaction`] on persistence failure; nothing is
///   committed
pub fn commit(
    conn: &mut Connection,
    winners: &[DrawnWinner],
    seed: &str,
    now: u64,
) -> Result<PersistedDrawing> {
    if winners.is_empty() {
        return Err(LotteryError::Validation(
            "cannot commit a drawing with no winners".to_string(),
        ));
    }

    let drawing_id = id::generate();
    let tx = conn.transaction().map_err(LotteryError::from)?;

    drawings::insert_drawing(&tx, &drawing_id, seed, now)?;

    let mut persisted = Vec::with_capacity(winners.len());
    for winner in winners {
        let winner_id = id::generate();
        drawings::insert_winner(
            &tx,
            &winner_id,
            &drawing_id,
            &winner.user_id,
            winner.prize_amount,
            winner.tax_withheld,
            winner.net_amount,
            now,
        )?;
        persisted.push(PersistedWinner {
            winner_id,
            user_id: winner.user_id.clone(),
            prize_amount: winner.prize_amount,
            tax_withheld: winner.tax_withheld,
            net_amount: winner.net_amount,
            status: WinnerStatus::Pending,
        });
    }

    tx.commit().map_err(LotteryError::from)?;

    tracing::info!(
        drawing_id,
        winners = persisted.len(),
        "lottery drawing committed"
    );

    Ok(PersistedDrawing {
        drawing_id,
        seed: seed.to_string(),
        created_at: now,
        winners: persisted,
    })
}

/// Execute a full drawing: re-derive the entry pool fresh, select winners
/// with a recorded random seed, and commit atomically.
///
/// The entry pool is always regenerated here rather than reused from an
/// earlier threshold check, so the draw reflects the latest eligible
/// population.
pub fn execute_draw(
    conn: &mut Connection,
    tiers: &[PrizeTier],
    now: u64,
) -> Result<PersistedDrawing> {
    let pool = entries::generate(conn)?;

    let mut seed = [0u8; 32];
    OsRng.fill_bytes(&mut seed);
    let mut rng = StdRng::from_seed(seed);

    let winners = draw::select_winners(&pool, tiers, &mut rng)?;
    commit(conn, &winners, &hex::encode(seed), now)
}

/// A winner joined with the user's bot contact handle.
#[derive(Clone, Debug, Serialize)]
pub struct WinnerWithContact {
    pub winner_id: String,
    pub drawing_id: String,
    pub user_id: String,
    pub prize_amount: u64,
    pub tax_withheld: u64,
    pub net_amount: u64,
    pub status: String,
    pub created_at: u64,
    pub bot_handle: Option<String>,
}

/// All drawings' winners joined with user contact info, newest first.
pub fn winners(conn: &Connection) -> Result<Vec<WinnerWithContact>> {
    let rows = drawings::all_winners_with_contact(conn)?;
    Ok(rows
        .into_iter()
        .map(|row| WinnerWithContact {
            winner_id: row.winner.winner_id,
            drawing_id: row.winner.drawing_id,
            user_id: row.winner.user_id,
            prize_amount: row.winner.prize_amount,
            tax_withheld: row.winner.tax_withheld,
            net_amount: row.winner.net_amount,
            status: row.winner.status,
            created_at: row.winner.created_at,
            bot_handle: row.bot_handle,
        })
        .collect())
}

/// Payout-collaborator hook: transition a winner from `pending` to `paid`.
///
/// # Errors
///
/// - [`LotteryError::NotFound`] for an unknown winner
/// - [`LotteryError::Conflict`] if the winner was already paid
pub fn mark_winner_paid(conn: &Connection, winner_id: &str) -> Result<()> {
    drawings::mark_paid(conn, winner_id)?;
    tracing::info!(winner_id, "winner marked paid");
    Ok(())
}
