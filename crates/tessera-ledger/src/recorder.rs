//! The Sale Recorder.
//!
//! Persisting the sale and crediting the affiliate happen inside one
//! rusqlite transaction: both commit or neither does. The balance credit is
//! an SQL-level atomic increment, so concurrent sales for the same
//! affiliate cannot lose updates.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use tessera_db::queries::{affiliates, sales};
use tessera_db::DbError;
use tessera_types::id;

use crate::{rates, LedgerError, Result};

/// Input for recording a sale.
#[derive(Clone, Debug, Deserialize)]
pub struct SaleRequest {
    /// The purchasing user's id (from the external shop).
    pub buyer_id: String,
    /// Sale amount in minor units; must be positive.
    pub amount: u64,
    /// Product category string; unrecognized values take the default rate.
    pub category: String,
    /// Referral code the buyer arrived with, if any.
    pub referral_code: Option<String>,
}

/// Outcome of a recorded sale.
#[derive(Clone, Debug, Serialize)]
pub struct SaleReceipt {
    /// The persisted sale's id.
    pub sale_id: String,
    /// The computed commission amount in minor units.
    pub commission_amount: u64,
    /// Whether an affiliate's balance was credited. False when no referral
    /// code was supplied or the code did not resolve.
    pub affiliate_credited: bool,
    /// Whether the default commission rate was applied because the category
    /// was unrecognized.
    pub rate_fallback: bool,
}

/// Record a sale and credit the referring affiliate, atomically.
///
/// A referral code that does not resolve is not an error: the sale is still
/// committed and `affiliate_credited` is false.
///
/// # Errors
///
/// - [`LedgerError::Validation`] if the buyer id is empty or the amount is zero
/// - [`LedgerError::Conflict`] on a duplicate sale id
/// - [`LedgerError::Overflow`] if the commission calculation overflows
/// - [`LedgerError::Transaction`] on persistence failure; nothing is committed
pub fn record_sale(conn: &mut Connection, request: &SaleRequest, now: u64) -> Result<SaleReceipt> {
    if request.buyer_id.is_empty() {
        return Err(LedgerError::Validation("buyer id is empty".to_string()));
    }
    if request.amount == 0 {
        return Err(LedgerError::Validation("amount must be positive".to_string()));
    }

    let lookup = rates::lookup(&request.category);
    let commission_amount = rates::commission_for(request.amount, lookup.rate_bp)?;
    let category = lookup
        .category
        .map_or_else(|| request.category.clone(), |c| c.as_str().to_string());

    let sale_id = id::generate();
    let tx = conn.transaction().map_err(LedgerError::from)?;

    sales::insert(
        &tx,
        &sale_id,
        &request.buyer_id,
        request.amount,
        &category,
        commission_amount,
        request.referral_code.as_deref(),
        now,
    )?;

    let affiliate_credited = match request.referral_code.as_deref() {
        Some(code) => match affiliates::get_by_referral_code(&tx, code) {
            Ok(affiliate) => {
                affiliates::credit_commission(&tx, &affiliate.affiliate_id, commission_amount)?;
                true
            }
            Err(DbError::NotFound(_)) => {
                tracing::info!(
                    referral_code = code,
                    sale_id,
                    "referral code did not resolve, sale recorded without affiliate credit"
                );
                false
            }
            Err(other) => return Err(other.into()),
        },
        None => false,
    };

    tx.commit().map_err(LedgerError::from)?;

    tracing::info!(
        sale_id,
        amount = request.amount,
        commission = commission_amount,
        affiliate_credited,
        "sale recorded"
    );

    Ok(SaleReceipt {
        sale_id,
        commission_amount,
        affiliate_credited,
        rate_fallback: lookup.fell_back,
    })
}
