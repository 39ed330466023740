//! Read-only ledger projections.
//!
//! These queries read committed state directly at call time; there is no
//! caching layer between the ledger and its readers.

use rusqlite::Connection;
use serde::Serialize;

use tessera_db::queries::{affiliates, sales};

use crate::Result;

/// One itemized sale on an affiliate's statement.
#[derive(Clone, Debug, Serialize)]
pub struct ReportedSale {
    pub sale_id: String,
    pub amount: u64,
    pub category: String,
    pub commission_amount: u64,
    pub created_at: u64,
}

/// Per-affiliate commission statement.
#[derive(Clone, Debug, Serialize)]
pub struct AffiliateReport {
    pub affiliate_id: String,
    pub referral_code: String,
    pub sales: Vec<ReportedSale>,
    /// Sum of the itemized sales' commissions.
    pub total_commissions: u64,
    /// The affiliate's stored balance. Equals `total_commissions` whenever
    /// the reconciliation invariant holds.
    pub commission_balance: u64,
}

/// Build the commission statement for the affiliate owned by `user_id`.
///
/// # Errors
///
/// - [`crate::LedgerError::NotFound`] if the user has no affiliate account
pub fn affiliate_report(conn: &Connection, user_id: &str) -> Result<AffiliateReport> {
    let affiliate = affiliates::get_by_user(conn, user_id)?;
    let rows = sales::list_by_referral_code(conn, &affiliate.referral_code)?;

    let total_commissions = rows.iter().map(|s| s.commission_amount).sum();
    let sales = rows
        .into_iter()
        .map(|s| ReportedSale {
            sale_id: s.sale_id,
            amount: s.amount,
            category: s.category,
            commission_amount: s.commission_amount,
            created_at: s.created_at,
        })
        .collect();

    Ok(AffiliateReport {
        affiliate_id: affiliate.affiliate_id,
        referral_code: affiliate.referral_code,
        sales,
        total_commissions,
        commission_balance: affiliate.commission_balance,
    })
}

/// Aggregate revenue across all recorded sales, attributed or not.
pub fn total_revenue(conn: &Connection) -> Result<u64> {
    Ok(sales::total_revenue(conn)?)
}
