use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Sub, SubAssign};
use std::str::FromStr;

/// Money type, stored with 8 decimal places
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);
    pub const ONE: Money = Money(Decimal::ONE);

    /// storage precision for every money value
    pub const SCALE: u32 = 8;

    /// create from decimal
    pub fn from_decimal(d: Decimal) -> Self {
        Money(d.round_dp(Self::SCALE))
    }

    /// create from string with exact parsing
    pub fn from_str_exact(s: &str) -> Result<Self, rust_decimal::Error> {
        Ok(Money(Decimal::from_str(s)?.round_dp(Self::SCALE)))
    }

    /// create from integer amount (rupees, dollars, euros)
    pub fn from_major(amount: i64) -> Self {
        Money(Decimal::from(amount))
    }

    /// create from minor amount (paise, cents)
    pub fn from_minor(amount: i64, scale: u32) -> Self {
        let d = Decimal::from(amount) / Decimal::from(10_u64.pow(scale));
        Money(d.round_dp(Self::SCALE))
    }

    /// get underlying decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// round to specified decimal places
    pub fn round_dp(&self, dp: u32) -> Self {
        Money(self.0.round_dp(dp))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// strictly greater than zero
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// strictly less than zero
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    pub fn min(self, other: Self) -> Self {
        Money(self.0.min(other.0))
    }

    pub fn max(self, other: Self) -> Self {
        Money(self.0.max(other.0))
    }

    /// subtraction floored at zero
    pub fn saturating_sub(self, other: Self) -> Self {
        (self - other).max(Money::ZERO)
    }

    /// apply a rate to this amount (e.g. 8% of 1200 = 96)
    pub fn apply_rate(&self, rate: Rate) -> Self {
        Money((self.0 * rate.as_decimal()).round_dp(Self::SCALE))
    }

    /// addition that returns `None` instead of overflowing
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Money::from_decimal)
    }

    /// `apply_rate` that returns `None` instead of overflowing
    pub fn checked_apply_rate(&self, rate: Rate) -> Option<Self> {
        self.0.checked_mul(rate.as_decimal()).map(Money::from_decimal)
    }

    /// split into `parts` equal shares rounded to `dp` places
    pub fn split_even(&self, parts: u32, dp: u32) -> Self {
        Money((self.0 / Decimal::from(parts)).round_dp(dp))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::from_str_exact(s)
    }
}

impl From<Decimal> for Money {
    fn from(d: Decimal) -> Self {
        Money::from_decimal(d)
    }
}

impl From<i32> for Money {
    fn from(i: i32) -> Self {
        Money::from_major(i as i64)
    }
}

impl From<u32> for Money {
    fn from(i: u32) -> Self {
        Money::from_major(i as i64)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money((self.0 + other.0).round_dp(Self::SCALE))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        self.0 = (self.0 + other.0).round_dp(Self::SCALE);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money((self.0 - other.0).round_dp(Self::SCALE))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Money) {
        self.0 = (self.0 - other.0).round_dp(Self::SCALE);
    }
}

impl Mul<Decimal> for Money {
    type Output = Money;

    fn mul(self, other: Decimal) -> Money {
        Money((self.0 * other).round_dp(Self::SCALE))
    }
}

impl Div<Decimal> for Money {
    type Output = Money;

    fn div(self, other: Decimal) -> Money {
        Money((self.0 / other).round_dp(Self::SCALE))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, x| acc + x)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, x| acc + *x)
    }
}

/// rate type for interest and fine rates, stored as a fraction (0.08 == 8%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Rate(Decimal);

impl Rate {
    pub const ZERO: Rate = Rate(Decimal::ZERO);

    /// create from fraction (e.g., 0.05 for 5%)
    pub fn from_decimal(d: Decimal) -> Self {
        Rate(d)
    }

    /// create from whole percentage (e.g., 5 for 5%)
    pub fn from_percentage(p: u32) -> Self {
        Rate(Decimal::from(p) / Decimal::from(100))
    }

    /// create from a fractional percentage (e.g., 2.5 for 2.5%)
    pub fn from_percentage_decimal(p: Decimal) -> Self {
        Rate(p / Decimal::from(100))
    }

    /// create from basis points (e.g., 500 for 5%)
    pub fn from_bps(bps: u32) -> Self {
        Rate(Decimal::from(bps) / Decimal::from(10000))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn as_percentage(&self) -> Decimal {
        self.0 * Decimal::from(100)
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage().normalize())
    }
}

impl From<Decimal> for Rate {
    fn from(d: Decimal) -> Self {
        Rate::from_decimal(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_precision() {
        let m = Money::from_str_exact("100.123456789").unwrap();
        assert_eq!(m.to_string(), "100.12345679"); // rounded to 8 places
    }

    #[test]
    fn test_minor_units() {
        let m = Money::from_minor(10_850, 2);
        assert_eq!(m, Money::from_decimal(dec!(108.50)));
    }

    #[test]
    fn test_apply_rate() {
        let principal = Money::from_major(1_200);
        let rate = Rate::from_percentage(8);
        assert_eq!(principal.apply_rate(rate), Money::from_major(96));

        let fractional = Rate::from_percentage_decimal(dec!(2.5));
        assert_eq!(Money::from_major(100).apply_rate(fractional), Money::from_decimal(dec!(2.5)));
    }

    #[test]
    fn test_checked_arithmetic_reports_overflow() {
        let max = Money::from_decimal(Decimal::MAX);
        assert_eq!(max.checked_add(Money::ONE), None);
        assert_eq!(max.checked_apply_rate(Rate::from_percentage(200)), None);

        let principal = Money::from_major(1_200);
        assert_eq!(principal.checked_apply_rate(Rate::from_percentage(8)), Some(Money::from_major(96)));
        assert_eq!(principal.checked_add(Money::from_major(96)), Some(Money::from_major(1_296)));
    }

    #[test]
    fn test_split_even_rounds_to_precision() {
        let total = Money::from_major(1_000);
        assert_eq!(total.split_even(3, 2), Money::from_decimal(dec!(333.33)));
        assert_eq!(Money::from_major(1_296).split_even(12, 2), Money::from_major(108));
    }

    #[test]
    fn test_saturating_sub_and_sum() {
        let a = Money::from_major(50);
        let b = Money::from_major(80);
        assert_eq!(a.saturating_sub(b), Money::ZERO);
        assert_eq!(b.saturating_sub(a), Money::from_major(30));

        let total: Money = vec![a, b].into_iter().sum();
        assert_eq!(total, Money::from_major(130));
    }

    #[test]
    fn test_rate_display_and_bps() {
        assert_eq!(Rate::from_percentage(8).to_string(), "8%");
        assert_eq!(Rate::from_bps(800), Rate::from_percentage(8));
    }

    #[test]
    fn test_money_serializes_as_string() {
        let json = serde_json::to_string(&Money::from_decimal(dec!(108.5))).unwrap();
        assert_eq!(json, "\"108.5\"");
    }
}
