//! Affiliate enrollment and referral-code issuance.
//!
//! A user enrolls at most once. The referral code is derived from the user
//! id plus a random suffix and is immutable once issued.

use rusqlite::Connection;
use serde::Serialize;

use tessera_db::queries::affiliates;
use tessera_types::id;

use crate::{LedgerError, Result};

/// Length of the user-id prefix embedded in a referral code.
const CODE_PREFIX_LEN: usize = 8;

/// Random hex characters appended to a referral code.
const CODE_SUFFIX_LEN: usize = 8;

/// A newly enrolled affiliate.
#[derive(Clone, Debug, Serialize)]
pub struct EnrolledAffiliate {
    pub affiliate_id: String,
    pub user_id: String,
    pub referral_code: String,
}

/// Build a referral code for a user: an id prefix for recognizability plus
/// a random suffix for uniqueness.
fn referral_code_for(user_id: &str) -> String {
    let prefix: String = user_id.chars().take(CODE_PREFIX_LEN).collect();
    let suffix: String = id::generate().chars().take(CODE_SUFFIX_LEN).collect();
    format!("{prefix}-{suffix}")
}

/// Enroll a user as an affiliate, issuing their referral code.
///
/// # Errors
///
/// - [`LedgerError::Validation`] if the user id is empty
/// - [`LedgerError::Conflict`] if the user is already enrolled
pub fn enroll(conn: &Connection, user_id: &str, now: u64) -> Result<EnrolledAffiliate> {
    if user_id.is_empty() {
        return Err(LedgerError::Validation("user id is empty".to_string()));
    }

    let affiliate_id = id::generate();
    let referral_code = referral_code_for(user_id);

    affiliates::insert(conn, &affiliate_id, user_id, &referral_code, now)?;

    tracing::info!(user_id, referral_code, "affiliate enrolled");

    Ok(EnrolledAffiliate {
        affiliate_id,
        user_id: user_id.to_string(),
        referral_code,
    })
}
