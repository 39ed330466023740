//! Lottery domain types: prize tiers, entry sources, winner status.

use serde::{Deserialize, Serialize};

/// A prize specification within one drawing: the prize amount (minor units)
/// and how many winner slots to fill at that amount.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeTier {
    /// Gross prize amount per winner, in minor units.
    pub amount: u64,
    /// Number of winner slots for this tier.
    pub count: u32,
}

/// The pool an entry was derived from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySource {
    /// Derived from an affiliate's commission balance.
    Affiliate,
    /// Derived from a user's loyalty points.
    Consumer,
}

impl EntrySource {
    /// Canonical string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Affiliate => "affiliate",
            Self::Consumer => "consumer",
        }
    }
}

/// Payout status of a persisted winner.
///
/// The only legal transition is `Pending` → `Paid`, triggered by the
/// external payout collaborator. There is no cancelled state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WinnerStatus {
    Pending,
    Paid,
}

impl WinnerStatus {
    /// Parse the stored string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "paid" => Some(Self::Paid),
            _ => None,
        }
    }

    /// Canonical string form, as stored in the winners table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_source_strings() {
        assert_eq!(EntrySource::Affiliate.as_str(), "affiliate");
        assert_eq!(EntrySource::Consumer.as_str(), "consumer");
    }

    #[test]
    fn test_winner_status_round_trip() {
        assert_eq!(WinnerStatus::parse("pending"), Some(WinnerStatus::Pending));
        assert_eq!(WinnerStatus::parse("paid"), Some(WinnerStatus::Paid));
        assert_eq!(WinnerStatus::parse("cancelled"), None);
    }

    #[test]
    fn test_prize_tier_serde() {
        let tier = PrizeTier { amount: 50_000, count: 2 };
        let json = serde_json::to_string(&tier).expect("serialize");
        assert!(json.contains("50000"));
    }
}
