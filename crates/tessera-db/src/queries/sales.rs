//! Sales ledger query functions.
//!
//! Sales are append-only. There is no update or delete; a recorded sale is
//! a permanent ledger entry.

use rusqlite::Connection;

use crate::{map_constraint, storable, DbError, Result};

/// Insert a new sale record.
///
/// A primary-key collision maps to [`DbError::Constraint`]; identifiers are
/// random, so in practice this never fires. Amounts beyond `i64::MAX` are
/// rejected rather than cast.
#[allow(clippy::too_many_arguments)]
pub fn insert(
    conn: &Connection,
    sale_id: &str,
    user_id: &str,
    amount: u64,
    category: &str,
    commission_amount: u64,
    referral_code: Option<&str>,
    created_at: u64,
) -> Result<()> {
    let amount = storable(amount, "sale amount")?;
    let commission_amount = storable(commission_amount, "commission amount")?;
    conn.execute(
        "INSERT INTO sales (sale_id, user_id, amount, category, commission_amount, referral_code, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            sale_id,
            user_id,
            amount,
            category,
            commission_amount,
            referral_code,
            created_at as i64,
        ],
    )
    .map_err(|e| map_constraint(e, "duplicate sale id"))?;
    Ok(())
}

/// Get a sale by id.
pub fn get(conn: &Connection, sale_id: &str) -> Result<SaleRow> {
    conn.query_row(
        "SELECT sale_id, user_id, amount, category, commission_amount, referral_code, created_at
         FROM sales WHERE sale_id = ?1",
        [sale_id],
        map_row,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => DbError::NotFound("sale".into()),
        other => DbError::Sqlite(other),
    })
}

/// List all sales referencing a referral code, oldest first.
pub fn list_by_referral_code(conn: &Connection, referral_code: &str) -> Result<Vec<SaleRow>> {
    let mut stmt = conn.prepare(
        "SELECT sale_id, user_id, amount, category, commission_amount, referral_code, created_at
         FROM sales WHERE referral_code = ?1 ORDER BY created_at, sale_id",
    )?;

    let rows = stmt
        .query_map([referral_code], map_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Total commission of all sales referencing a referral code.
///
/// Used to reconcile against the affiliate's stored balance.
pub fn commission_total_for_code(conn: &Connection, referral_code: &str) -> Result<u64> {
    let total: i64 = conn.query_row(
        "SELECT COALESCE(SUM(commission_amount), 0) FROM sales WHERE referral_code = ?1",
        [referral_code],
        |row| row.get(0),
    )?;
    Ok(total as u64)
}

/// Aggregate revenue: the sum of all sale amounts, regardless of affiliate
/// attribution.
pub fn total_revenue(conn: &Connection) -> Result<u64> {
    let total: i64 = conn.query_row(
        "SELECT COALESCE(SUM(amount), 0) FROM sales",
        [],
        |row| row.get(0),
    )?;
    Ok(total as u64)
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SaleRow> {
    Ok(SaleRow {
        sale_id: row.get(0)?,
        user_id: row.get(1)?,
        amount: row.get::<_, i64>(2)? as u64,
        category: row.get(3)?,
        commission_amount: row.get::<_, i64>(4)? as u64,
        referral_code: row.get(5)?,
        created_at: row.get::<_, i64>(6)? as u64,
    })
}

/// A raw sale row.
#[derive(Debug, Clone)]
pub struct SaleRow {
    pub sale_id: String,
    pub user_id: String,
    pub amount: u64,
    pub category: String,
    pub commission_amount: u64,
    pub referral_code: Option<String>,
    pub created_at: u64,
}
