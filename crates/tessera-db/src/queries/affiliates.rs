//! Affiliate query functions.
//!
//! The commission balance is the one piece of mutable shared state with
//! concurrent writers. It is only ever changed through [`credit_commission`],
//! an SQL-level atomic increment.

use rusqlite::Connection;

use crate::{map_constraint, storable, DbError, Result};

/// Insert a new affiliate with a zero commission balance.
///
/// Fails with [`DbError::Constraint`] if the user already has an affiliate
/// account or the referral code is taken.
pub fn insert(
    conn: &Connection,
    affiliate_id: &str,
    user_id: &str,
    referral_code: &str,
    created_at: u64,
) -> Result<()> {
    conn.execute(
        "INSERT INTO affiliates (affiliate_id, user_id, referral_code, commission_balance, created_at)
         VALUES (?1, ?2, ?3, 0, ?4)",
        rusqlite::params![affiliate_id, user_id, referral_code, created_at as i64],
    )
    .map_err(|e| map_constraint(e, "affiliate already enrolled"))?;
    Ok(())
}

/// Get an affiliate by the owning user id.
pub fn get_by_user(conn: &Connection, user_id: &str) -> Result<AffiliateRow> {
    query_one(
        conn,
        "SELECT affiliate_id, user_id, referral_code, commission_balance, created_at
         FROM affiliates WHERE user_id = ?1",
        user_id,
    )
}

/// Resolve a referral code to its affiliate.
pub fn get_by_referral_code(conn: &Connection, referral_code: &str) -> Result<AffiliateRow> {
    query_one(
        conn,
        "SELECT affiliate_id, user_id, referral_code, commission_balance, created_at
         FROM affiliates WHERE referral_code = ?1",
        referral_code,
    )
}

/// Atomically increment an affiliate's commission balance.
///
/// The increment happens inside SQLite, never as an application-level
/// read-modify-write, so concurrent sales cannot lose updates.
pub fn credit_commission(conn: &Connection, affiliate_id: &str, amount: u64) -> Result<()> {
    let amount = storable(amount, "commission credit")?;
    let updated = conn.execute(
        "UPDATE affiliates SET commission_balance = commission_balance + ?1
         WHERE affiliate_id = ?2",
        rusqlite::params![amount, affiliate_id],
    )?;
    if updated == 0 {
        return Err(DbError::NotFound("affiliate".into()));
    }
    Ok(())
}

/// List all affiliates, ordered by id.
///
/// The ordering makes entry generation deterministic within one call.
pub fn list(conn: &Connection) -> Result<Vec<AffiliateRow>> {
    let mut stmt = conn.prepare(
        "SELECT affiliate_id, user_id, referral_code, commission_balance, created_at
         FROM affiliates ORDER BY affiliate_id",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(AffiliateRow {
                affiliate_id: row.get(0)?,
                user_id: row.get(1)?,
                referral_code: row.get(2)?,
                commission_balance: row.get::<_, i64>(3)? as u64,
                created_at: row.get::<_, i64>(4)? as u64,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn query_one(conn: &Connection, sql: &str, param: &str) -> Result<AffiliateRow> {
    conn.query_row(sql, [param], |row| {
        Ok(AffiliateRow {
            affiliate_id: row.get(0)?,
            user_id: row.get(1)?,
            referral_code: row.get(2)?,
            commission_balance: row.get::<_, i64>(3)? as u64,
            created_at: row.get::<_, i64>(4)? as u64,
        })
    })
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => DbError::NotFound("affiliate".into()),
        other => DbError::Sqlite(other),
    })
}

/// A raw affiliate row.
#[derive(Debug)]
pub struct AffiliateRow {
    pub affiliate_id: String,
    pub user_id: String,
    pub referral_code: String,
    pub commission_balance: u64,
    pub created_at: u64,
}
