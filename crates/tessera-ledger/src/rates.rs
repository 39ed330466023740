//! Category commission rates and commission arithmetic.
//!
//! Rates are expressed in basis points (1% = 100 bp) so the commission is
//! pure integer math on minor units:
//!
//! ```text
//! commission = round_half_up(amount * rate_bp / 10_000)
//! ```
//!
//! An unrecognized category falls back to [`DEFAULT_RATE_BP`]. The fallback
//! is explicit: it is logged and reported to the caller, never silent.

use tessera_types::category::ProductCategory;

use crate::{LedgerError, Result};

/// Basis points per whole (10_000 bp = 100%).
pub const BASIS_POINTS: u64 = 10_000;

/// Commission rate for `products` (8%).
pub const RATE_PRODUCTS_BP: u64 = 800;

/// Commission rate for `services` (15%).
pub const RATE_SERVICES_BP: u64 = 1_500;

/// Commission rate for `courses` (12%).
pub const RATE_COURSES_BP: u64 = 1_200;

/// Default rate applied to unrecognized categories (8%).
pub const DEFAULT_RATE_BP: u64 = RATE_PRODUCTS_BP;

/// The outcome of a rate lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLookup {
    /// The commission rate in basis points.
    pub rate_bp: u64,
    /// The recognized category, or `None` when the default rate applied.
    pub category: Option<ProductCategory>,
    /// Whether the default-rate fallback was taken.
    pub fell_back: bool,
}

/// Commission rate for a recognized category.
pub fn rate_bp(category: ProductCategory) -> u64 {
    match category {
        ProductCategory::Products => RATE_PRODUCTS_BP,
        ProductCategory::Services => RATE_SERVICES_BP,
        ProductCategory::Courses => RATE_COURSES_BP,
    }
}

/// Look up the rate for a category string, falling back to the default rate
/// for unrecognized categories. The fallback is logged.
pub fn lookup(category: &str) -> RateLookup {
    match ProductCategory::parse(category) {
        Some(cat) => RateLookup {
            rate_bp: rate_bp(cat),
            category: Some(cat),
            fell_back: false,
        },
        None => {
            tracing::warn!(
                category,
                rate_bp = DEFAULT_RATE_BP,
                "unrecognized product category, applying default commission rate"
            );
            RateLookup {
                rate_bp: DEFAULT_RATE_BP,
                category: None,
                fell_back: true,
            }
        }
    }
}

/// Compute the commission for an amount at a rate, rounded half-up to the
/// minor unit.
///
/// # Errors
///
/// - [`LedgerError::Overflow`] on arithmetic overflow
pub fn commission_for(amount: u64, rate_bp: u64) -> Result<u64> {
    let scaled = amount.checked_mul(rate_bp).ok_or(LedgerError::Overflow)?;
    let rounded = scaled
        .checked_add(BASIS_POINTS / 2)
        .ok_or(LedgerError::Overflow)?;
    Ok(rounded / BASIS_POINTS)
}
