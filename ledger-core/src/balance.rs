//! Incremental balance cache
//!
//! Keeps a running total of the log up to a watermark index. A refresh
//! folds only the entries appended after the watermark, so the cost of a
//! balance query is proportional to the number of new transactions since
//! the previous query, not to the length of the history.
//!
//! # Invariants
//!
//! - `watermark < log.len()` whenever it is set
//! - `total == Σ log[0..=watermark].amount`, with no rounding and no overflow

use crate::log::TransactionLog;
use num_bigint::{BigInt, Sign};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt;
use std::ops::AddAssign;

/// Exact sum of decimal amounts.
///
/// Held as an integer count of `10^-28` units, the finest scale a `Decimal`
/// can carry. Any sum of `Decimal`s is therefore representable, however far
/// it grows past `Decimal::MAX` or however many significant digits it needs.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Balance {
    units: BigInt,
}

impl Balance {
    /// Fractional digits of one unit
    pub const SCALE: u32 = 28;

    /// Zero balance
    pub fn zero() -> Self {
        Self::default()
    }

    /// Whether the balance is below zero
    pub fn is_negative(&self) -> bool {
        self.units.sign() == Sign::Minus
    }

    /// The same value as a `Decimal`, when it fits without rounding
    pub fn to_decimal(&self) -> Option<Decimal> {
        Decimal::from_str_exact(&self.to_string()).ok()
    }
}

impl AddAssign<Decimal> for Balance {
    fn add_assign(&mut self, amount: Decimal) {
        // Decimal scales never exceed 28
        let shift = Self::SCALE.saturating_sub(amount.scale());
        self.units += BigInt::from(amount.mantissa()) * BigInt::from(10u8).pow(shift);
    }
}

impl From<Decimal> for Balance {
    fn from(amount: Decimal) -> Self {
        let mut balance = Self::zero();
        balance += amount;
        balance
    }
}

impl PartialEq<Decimal> for Balance {
    fn eq(&self, other: &Decimal) -> bool {
        *self == Balance::from(*other)
    }
}

/// Normalised decimal text: no trailing fractional zeros, `0` for zero
impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scale = Self::SCALE as usize;
        let magnitude = self.units.magnitude().to_string();
        let digits = format!("{magnitude:0>width$}", width = scale + 1);
        let (whole, fraction) = digits.split_at(digits.len() - scale);
        let fraction = fraction.trim_end_matches('0');

        if self.is_negative() {
            f.write_str("-")?;
        }
        f.write_str(whole)?;
        if !fraction.is_empty() {
            write!(f, ".{fraction}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Balance({self})")
    }
}

impl Serialize for Balance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Running total plus the highest log index it covers
#[derive(Debug, Clone, Default)]
pub struct BalanceCache {
    total: Balance,
    watermark: Option<usize>,
}

impl BalanceCache {
    /// Empty cache: nothing folded, total zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached total
    pub fn total(&self) -> Balance {
        self.total.clone()
    }

    /// Highest folded index (`None` = nothing folded yet)
    pub fn watermark(&self) -> Option<usize> {
        self.watermark
    }

    /// Index of the first entry not yet folded
    fn next_index(&self) -> usize {
        self.watermark.map_or(0, |w| w + 1)
    }

    /// Whether the total already covers every entry of `log`
    pub fn is_current(&self, log: &TransactionLog) -> bool {
        self.next_index() >= log.len()
    }

    /// Fold the unseen tail of `log` into the total.
    ///
    /// Returns how many entries were folded.
    pub fn refresh(&mut self, log: &TransactionLog) -> usize {
        let start = self.next_index();
        debug_assert!(start <= log.len(), "watermark past end of log");

        let tail = log.since(start);
        if tail.is_empty() {
            return 0;
        }

        for tx in tail {
            self.total += tx.amount();
        }
        self.watermark = Some(log.len() - 1);

        tail.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_cache() {
        let cache = BalanceCache::new();
        assert_eq!(cache.total(), Decimal::ZERO);
        assert_eq!(cache.watermark(), None);
        assert!(cache.is_current(&TransactionLog::new()));
    }

    #[test]
    fn test_refresh_on_empty_log_folds_nothing() {
        let mut cache = BalanceCache::new();
        let log = TransactionLog::new();

        assert_eq!(cache.refresh(&log), 0);
        assert_eq!(cache.watermark(), None);
        assert_eq!(cache.total(), Decimal::ZERO);
    }

    #[test]
    fn test_refresh_folds_everything_first_time() {
        let mut log = TransactionLog::new();
        log.append(dec!(100.50));
        log.append(dec!(-50.25));

        let mut cache = BalanceCache::new();
        assert!(!cache.is_current(&log));
        assert_eq!(cache.refresh(&log), 2);
        assert_eq!(cache.total(), dec!(50.25));
        assert_eq!(cache.watermark(), Some(1));
        assert!(cache.is_current(&log));
    }

    #[test]
    fn test_refresh_folds_only_new_entries() {
        let mut log = TransactionLog::new();
        let mut cache = BalanceCache::new();

        log.append(dec!(10));
        log.append(dec!(20));
        assert_eq!(cache.refresh(&log), 2);

        log.append(dec!(30));
        assert_eq!(cache.refresh(&log), 1);
        assert_eq!(cache.total(), dec!(60));
        assert_eq!(cache.watermark(), Some(2));

        // Nothing new
        assert_eq!(cache.refresh(&log), 0);
        assert_eq!(cache.total(), dec!(60));
    }

    #[test]
    fn test_refresh_is_exact_for_binary_unfriendly_fractions() {
        let mut log = TransactionLog::new();
        log.append(dec!(0.1));
        log.append(dec!(0.2));
        log.append(dec!(0.3));

        let mut cache = BalanceCache::new();
        cache.refresh(&log);
        assert_eq!(cache.total(), dec!(0.6));
        assert_eq!(cache.total().to_string(), "0.6");
    }

    #[test]
    fn test_refresh_past_decimal_max_stays_exact() {
        let mut log = TransactionLog::new();
        log.append(Decimal::MAX);
        log.append(Decimal::MAX);

        let mut cache = BalanceCache::new();
        assert_eq!(cache.refresh(&log), 2);
        assert_eq!(cache.total().to_string(), "158456325028528675187087900670");
        assert_eq!(cache.total().to_decimal(), None);

        // Folding back into range recovers a plain Decimal
        log.append(Decimal::MIN);
        cache.refresh(&log);
        assert_eq!(cache.total(), Decimal::MAX);
        assert_eq!(cache.total().to_decimal(), Some(Decimal::MAX));
    }

    #[test]
    fn test_refresh_keeps_digits_beyond_decimal_precision() {
        let mut log = TransactionLog::new();
        log.append(dec!(10000000000000000000000000000));
        log.append(dec!(0.1));

        let mut cache = BalanceCache::new();
        cache.refresh(&log);
        assert_eq!(cache.total().to_string(), "10000000000000000000000000000.1");
        assert_ne!(cache.total(), dec!(10000000000000000000000000000));

        log.append(dec!(-0.1));
        cache.refresh(&log);
        assert_eq!(cache.total(), dec!(10000000000000000000000000000));
    }

    #[test]
    fn test_refresh_at_finest_scale() {
        let mut log = TransactionLog::new();
        let smallest = Decimal::new(1, 28);
        for _ in 0..3 {
            log.append(smallest);
        }
        log.append(Decimal::new(-1, 0));

        let mut cache = BalanceCache::new();
        cache.refresh(&log);
        assert!(cache.total().is_negative());
        assert_eq!(cache.total().to_string(), "-0.9999999999999999999999999997");
        assert_eq!(
            cache.total().to_decimal(),
            Some(Decimal::from_i128_with_scale(-9999999999999999999999999997, 28))
        );
    }

    #[test]
    fn test_balance_display_and_serialize() {
        assert_eq!(Balance::zero().to_string(), "0");
        assert_eq!(Balance::from(dec!(100.50)).to_string(), "100.5");
        assert_eq!(Balance::from(dec!(-0.25)).to_string(), "-0.25");
        assert_eq!(Balance::from(dec!(-0.0)).to_string(), "0");
        assert_eq!(Balance::from(dec!(1000)).to_string(), "1000");
        assert_eq!(format!("{:?}", Balance::from(dec!(2.5))), "Balance(2.5)");
        assert_eq!(
            serde_json::to_value(Balance::from(dec!(50.25))).unwrap(),
            serde_json::json!("50.25")
        );
    }

    #[test]
    fn test_refresh_with_negative_total() {
        let mut log = TransactionLog::new();
        log.append(dec!(100.00));
        log.append(dec!(-130.00));

        let mut cache = BalanceCache::new();
        cache.refresh(&log);
        assert_eq!(cache.total(), dec!(-30));
    }
}
