//! Weighted random selection and tax withholding.
//!
//! Each slot draws one entry uniformly from the full pool, WITH replacement
//! across slots and tiers: a winning entry stays in the pool, so the same
//! user (even the same entry) may win multiple slots. That is the fairness
//! model; changing it to without-replacement sampling changes the product's
//! semantics and is out of scope here.
//!
//! Withholding: prizes strictly above [`TAX_FREE_PRIZE_LIMIT`] have
//! [`WITHHOLDING_RATE_PCT`] percent withheld; the boundary value itself is
//! exempt.

use rand::Rng;
use serde::Serialize;

use tessera_types::lottery::PrizeTier;
use tessera_types::{TAX_FREE_PRIZE_LIMIT, WITHHOLDING_RATE_PCT};

use crate::entries::Entry;
use crate::{LotteryError, Result};

/// A selected winner, not yet persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DrawnWinner {
    pub user_id: String,
    /// Gross prize in minor units.
    pub prize_amount: u64,
    /// Tax withheld from the prize.
    pub tax_withheld: u64,
    /// Prize minus withholding.
    pub net_amount: u64,
}

/// Tax withheld for a gross prize amount.
///
/// # Errors
///
/// - [`LotteryError::Overflow`] if the withholding calculation overflows
pub fn withholding_for(prize: u64) -> Result<u64> {
    if prize > TAX_FREE_PRIZE_LIMIT {
        let scaled = prize
            .checked_mul(WITHHOLDING_RATE_PCT)
            .ok_or(LotteryError::Overflow)?;
        Ok(scaled / 100)
    } else {
        Ok(0)
    }
}

/// Total winner slots requested across all tiers.
fn total_slots(tiers: &[PrizeTier]) -> Result<u32> {
    tiers.iter().try_fold(0u32, |total, tier| {
        total.checked_add(tier.count).ok_or(LotteryError::Overflow)
    })
}

/// Select winners for every tier slot from the entry pool.
///
/// Output order follows tier order, then slot order within each tier.
///
/// # Errors
///
/// - [`LotteryError::Validation`] if no tiers are given, or a tier has a
///   zero prize amount or zero count
/// - [`LotteryError::Overflow`] if the slot count or a tier's withholding
///   calculation overflows
/// - [`LotteryError::EmptyPool`] if winners were requested and the entry
///   pool is empty
pub fn select_winners<R: Rng>(
    entries: &[Entry],
    tiers: &[PrizeTier],
    rng: &mut R,
) -> Result<Vec<DrawnWinner>> {
    if tiers.is_empty() {
        return Err(LotteryError::Validation("no prize tiers given".to_string()));
    }
    for tier in tiers {
        if tier.amount == 0 {
            return Err(LotteryError::Validation(
                "prize amount must be positive".to_string(),
            ));
        }
        if tier.count == 0 {
            return Err(LotteryError::Validation(
                "winner count must be positive".to_string(),
            ));
        }
    }

    let requested = total_slots(tiers)?;
    if entries.is_empty() {
        return Err(LotteryError::EmptyPool { requested });
    }

    let mut winners = Vec::with_capacity(requested as usize);
    for tier in tiers {
        let tax_withheld = withholding_for(tier.amount)?;
        for _ in 0..tier.count {
            let entry = &entries[rng.gen_range(0..entries.len())];
            winners.push(DrawnWinner {
                user_id: entry.user_id.clone(),
                prize_amount: tier.amount,
                tax_withheld,
                net_amount: tier.amount - tax_withheld,
            });
        }
    }

    Ok(winners)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tessera_types::lottery::EntrySource;

    fn entry(user_id: &str) -> Entry {
        Entry {
            user_id: user_id.to_string(),
            source: EntrySource::Consumer,
        }
    }

    fn rng() -> StdRng {
        StdRng::from_seed([7u8; 32])
    }

    #[test]
    fn test_withholding_boundary() {
        assert_eq!(withholding_for(20_000).expect("tax"), 0);
        assert_eq!(withholding_for(20_001).expect("tax"), 2_000);
        assert_eq!(withholding_for(50_000).expect("tax"), 5_000);
        assert_eq!(withholding_for(1).expect("tax"), 0);
    }

    #[test]
    fn test_withholding_overflow() {
        assert!(matches!(
            withholding_for(u64::MAX),
            Err(LotteryError::Overflow)
        ));
        // Largest prize whose withholding still fits
        let limit = u64::MAX / WITHHOLDING_RATE_PCT;
        assert_eq!(withholding_for(limit).expect("tax"), limit / 10);
        assert!(matches!(
            withholding_for(limit + 1),
            Err(LotteryError::Overflow)
        ));
    }

    #[test]
    fn test_oversized_prize_rejected_not_mistaxed() {
        let entries = vec![entry("u-only")];
        let tiers = vec![PrizeTier { amount: u64::MAX, count: 1 }];
        let result = select_winners(&entries, &tiers, &mut rng());
        assert!(matches!(result, Err(LotteryError::Overflow)));
    }

    #[test]
    fn test_slot_count_overflow_rejected() {
        let entries = vec![entry("u-only")];
        let tiers = vec![
            PrizeTier { amount: 1_000, count: u32::MAX },
            PrizeTier { amount: 1_000, count: 1 },
        ];
        let result = select_winners(&entries, &tiers, &mut rng());
        assert!(matches!(result, Err(LotteryError::Overflow)));
    }

    #[test]
    fn test_single_entry_pool_wins_every_slot() {
        let entries = vec![entry("u-only")];
        let tiers = vec![PrizeTier { amount: 50_000, count: 2 }];

        let winners = select_winners(&entries, &tiers, &mut rng()).expect("draw");
        assert_eq!(winners.len(), 2);
        for w in &winners {
            assert_eq!(w.user_id, "u-only");
            assert_eq!(w.prize_amount, 50_000);
            assert_eq!(w.tax_withheld, 5_000);
            assert_eq!(w.net_amount, 45_000);
        }
    }

    #[test]
    fn test_empty_pool_rejected() {
        let tiers = vec![PrizeTier { amount: 1_000, count: 1 }];
        let result = select_winners(&[], &tiers, &mut rng());
        assert!(matches!(result, Err(LotteryError::EmptyPool { requested: 1 })));
    }

    #[test]
    fn test_tier_validation() {
        let entries = vec![entry("u-1")];
        let zero_amount = vec![PrizeTier { amount: 0, count: 1 }];
        assert!(matches!(
            select_winners(&entries, &zero_amount, &mut rng()),
            Err(LotteryError::Validation(_))
        ));

        let zero_count = vec![PrizeTier { amount: 100, count: 0 }];
        assert!(matches!(
            select_winners(&entries, &zero_count, &mut rng()),
            Err(LotteryError::Validation(_))
        ));

        assert!(matches!(
            select_winners(&entries, &[], &mut rng()),
            Err(LotteryError::Validation(_))
        ));
    }

    #[test]
    fn test_slot_counts_follow_tier_order() {
        let entries = vec![entry("u-1"), entry("u-2")];
        let tiers = vec![
            PrizeTier { amount: 50_000, count: 1 },
            PrizeTier { amount: 10_000, count: 3 },
        ];

        let winners = select_winners(&entries, &tiers, &mut rng()).expect("draw");
        assert_eq!(winners.len(), 4);
        assert_eq!(winners[0].prize_amount, 50_000);
        assert!(winners[1..].iter().all(|w| w.prize_amount == 10_000));
        // No withholding at or below the boundary
        assert!(winners[1..].iter().all(|w| w.tax_withheld == 0));
    }

    #[test]
    fn test_same_seed_reproduces_draw() {
        let entries: Vec<Entry> = (0..50).map(|i| entry(&format!("u-{i}"))).collect();
        let tiers = vec![PrizeTier { amount: 30_000, count: 5 }];

        let first = select_winners(&entries, &tiers, &mut StdRng::from_seed([42u8; 32]))
            .expect("draw");
        let second = select_winners(&entries, &tiers, &mut StdRng::from_seed([42u8; 32]))
            .expect("draw");
        assert_eq!(first, second);
    }

    #[test]
    fn test_weighted_entries_favor_heavier_actor() {
        // 9 entries for u-heavy, 1 for u-light: over many draws u-heavy
        // must win the large majority of slots.
        let mut entries: Vec<Entry> = (0..9).map(|_| entry("u-heavy")).collect();
        entries.push(entry("u-light"));
        let tiers = vec![PrizeTier { amount: 1_000, count: 1_000 }];

        let winners = select_winners(&entries, &tiers, &mut rng()).expect("draw");
        let heavy = winners.iter().filter(|w| w.user_id == "u-heavy").count();
        assert!(heavy > 800, "expected ~900 heavy wins, got {heavy}");
    }
}
