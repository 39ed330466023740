//! Lottery drawing and winner query functions.
//!
//! A drawing and its winners are only ever written together inside one
//! transaction (see `tessera-lottery`); these functions are the individual
//! statements that transaction is built from.

use rusqlite::Connection;

use tessera_types::lottery::WinnerStatus;

use crate::{map_constraint, DbError, Result};

/// Insert a drawing header. `seed` is the hex-encoded RNG seed kept for
/// audit replay.
pub fn insert_drawing(
    conn: &Connection,
    drawing_id: &str,
    seed: &str,
    created_at: u64,
) -> Result<()> {
    conn.execute(
        "INSERT INTO lottery_drawings (drawing_id, seed, created_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![drawing_id, seed, created_at as i64],
    )
    .map_err(|e| map_constraint(e, "duplicate drawing id"))?;
    Ok(())
}

/// Insert a winner row with status `pending`.
#[allow(clippy::too_many_arguments)]
pub fn insert_winner(
    conn: &Connection,
    winner_id: &str,
    drawing_id: &str,
    user_id: &str,
    prize_amount: u64,
    tax_withheld: u64,
    net_amount: u64,
    created_at: u64,
) -> Result<()> {
    conn.execute(
        "INSERT INTO lottery_winners
             (winner_id, drawing_id, user_id, prize_amount, tax_withheld, net_amount, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            winner_id,
            drawing_id,
            user_id,
            prize_amount as i64,
            tax_withheld as i64,
            net_amount as i64,
            WinnerStatus::Pending.as_str(),
            created_at as i64,
        ],
    )
    .map_err(|e| map_constraint(e, "winner insert violates constraint"))?;
    Ok(())
}

/// Get a drawing header by id.
pub fn get_drawing(conn: &Connection, drawing_id: &str) -> Result<DrawingRow> {
    conn.query_row(
        "SELECT drawing_id, seed, created_at FROM lottery_drawings WHERE drawing_id = ?1",
        [drawing_id],
        |row| {
            Ok(DrawingRow {
                drawing_id: row.get(0)?,
                seed: row.get(1)?,
                created_at: row.get::<_, i64>(2)? as u64,
            })
        },
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => DbError::NotFound("drawing".into()),
        other => DbError::Sqlite(other),
    })
}

/// List the winners of one drawing, in insertion (slot) order.
pub fn winners_for_drawing(conn: &Connection, drawing_id: &str) -> Result<Vec<WinnerRow>> {
    let mut stmt = conn.prepare(
        "SELECT winner_id, drawing_id, user_id, prize_amount, tax_withheld, net_amount, status, created_at
         FROM lottery_winners WHERE drawing_id = ?1 ORDER BY rowid",
    )?;

    let rows = stmt
        .query_map([drawing_id], map_winner)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// List all drawings' winners joined with the winning users' bot contact
/// handles, newest drawing first.
pub fn all_winners_with_contact(conn: &Connection) -> Result<Vec<WinnerContactRow>> {
    let mut stmt = conn.prepare(
        "SELECT w.winner_id, w.drawing_id, w.user_id, w.prize_amount, w.tax_withheld,
                w.net_amount, w.status, w.created_at, u.bot_handle
         FROM lottery_winners w
         JOIN users u ON w.user_id = u.user_id
         ORDER BY w.created_at DESC, w.rowid",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(WinnerContactRow {
                winner: WinnerRow {
                    winner_id: row.get(0)?,
                    drawing_id: row.get(1)?,
                    user_id: row.get(2)?,
                    prize_amount: row.get::<_, i64>(3)? as u64,
                    tax_withheld: row.get::<_, i64>(4)? as u64,
                    net_amount: row.get::<_, i64>(5)? as u64,
                    status: row.get(6)?,
                    created_at: row.get::<_, i64>(7)? as u64,
                },
                bot_handle: row.get(8)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Transition a winner from `pending` to `paid`.
///
/// The guarded UPDATE enforces the state machine: a winner that is already
/// paid is a [`DbError::Constraint`], an unknown winner a
/// [`DbError::NotFound`].
pub fn mark_paid(conn: &Connection, winner_id: &str) -> Result<()> {
    let updated = conn.execute(
        "UPDATE lottery_winners SET status = ?1 WHERE winner_id = ?2 AND status = ?3",
        rusqlite::params![
            WinnerStatus::Paid.as_str(),
            winner_id,
            WinnerStatus::Pending.as_str()
        ],
    )?;
    if updated == 0 {
        let exists: i64 = conn.query_row(
            "SELECT COUNT(*) FROM lottery_winners WHERE winner_id = ?1",
            [winner_id],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Err(DbError::NotFound("winner".into()));
        }
        return Err(DbError::Constraint("winner already paid".into()));
    }
    Ok(())
}

fn map_winner(row: &rusqlite::Row<'_>) -> rusqlite::Result<WinnerRow> {
    Ok(WinnerRow {
        winner_id: row.get(0)?,
        drawing_id: row.get(1)?,
        user_id: row.get(2)?,
        prize_amount: row.get::<_, i64>(3)? as u64,
        tax_withheld: row.get::<_, i64>(4)? as u64,
        net_amount: row.get::<_, i64>(5)? as u64,
        status: row.get(6)?,
        created_at: row.get::<_, i64>(7)? as u64,
    })
}

/// A raw drawing header row.
#[derive(Debug)]
pub struct DrawingRow {
    pub drawing_id: String,
    pub seed: String,
    pub created_at: u64,
}

/// A raw winner row.
#[derive(Debug, Clone)]
pub struct WinnerRow {
    pub winner_id: String,
    pub drawing_id: String,
    pub user_id: String,
    pub prize_amount: u64,
    pub tax_withheld: u64,
    pub net_amount: u64,
    pub status: String,
    pub created_at: u64,
}

/// A winner row joined with the user's contact handle.
#[derive(Debug)]
pub struct WinnerContactRow {
    pub winner: WinnerRow,
    pub bot_handle: Option<String>,
}
