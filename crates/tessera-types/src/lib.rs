//! # tessera-types
//!
//! Shared domain types used across the Tessera workspace.
//!
//! All currency amounts are unsigned integers in minor units (two fractional
//! digits); all timestamps are Unix epoch seconds (UTC).

pub mod category;
pub mod id;
pub mod lottery;

/// Common type aliases.
pub type UserId = String;
pub type AffiliateId = String;
pub type SaleId = String;
pub type DrawingId = String;
pub type WinnerId = String;
pub type ReferralCode = String;

/// Minor currency units per whole unit (two fractional digits).
pub const MINOR_UNITS_PER_UNIT: u64 = 100;

/// Commission balance (minor units) required per affiliate lottery entry.
pub const COMMISSION_PER_ENTRY: u64 = 10_000;

/// Loyalty points required per consumer lottery entry.
pub const POINTS_PER_ENTRY: u64 = 10;

/// Prizes at or below this amount carry no tax withholding.
pub const TAX_FREE_PRIZE_LIMIT: u64 = 20_000;

/// Withholding rate applied above [`TAX_FREE_PRIZE_LIMIT`], in percent.
pub const WITHHOLDING_RATE_PCT: u64 = 10;
