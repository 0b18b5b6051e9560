//! Fixed-point numeric value objects.
//!
//! - [`Money`]: integer count of minor currency units (centavos).
//! - [`Rate`]: non-negative decimal with 4 fractional digits (tax, margin,
//!   labor multiplier).
//! - [`Quantity`]: non-negative decimal with 2 fractional digits (material
//!   quantity, days, hours).
//!
//! Arithmetic across these types is done by callers on exact `i128`
//! numerators; [`round_half_even`] brings a numerator back to a published
//! scale exactly once.

use core::fmt;
use core::ops::{Add, Sub};
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DomainError;
use crate::value_object::ValueObject;

/// Minor units per currency unit.
pub const MONEY_SCALE: i128 = 100;
/// Ten-thousandths per unit of a [`Rate`].
pub const RATE_SCALE: i128 = 10_000;
/// Hundredths per unit of a [`Quantity`].
pub const QUANTITY_SCALE: i128 = 100;

/// Divide `numerator` by `divisor`, rounding half to even.
///
/// `divisor` must be positive.
pub fn round_half_even(numerator: i128, divisor: i128) -> i128 {
    debug_assert!(divisor > 0);
    let negative = numerator < 0;
    let magnitude = numerator.unsigned_abs();
    let divisor = divisor.unsigned_abs();

    let mut quotient = magnitude / divisor;
    let twice_remainder = (magnitude % divisor) * 2;
    if twice_remainder > divisor || (twice_remainder == divisor && quotient % 2 == 1) {
        quotient += 1;
    }

    let quotient = quotient as i128;
    if negative { -quotient } else { quotient }
}

/// Monetary amount in minor units (centavos).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);
    pub const MAX: Money = Money(i64::MAX);

    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Whole currency units, e.g. `Money::from_major(10)` is 10.00.
    pub const fn from_major(major: i64) -> Self {
        Self(major * MONEY_SCALE as i64)
    }

    pub const fn minor(self) -> i64 {
        self.0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Round an exact numerator expressed in `minor / scale` units to whole
    /// minor units. `None` when the result does not fit.
    pub fn from_scaled(numerator: i128, scale: i128) -> Option<Self> {
        i64::try_from(round_half_even(numerator, scale)).ok().map(Self)
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Divide by a count, rounding half to even. Zero when `count` is zero.
    pub fn split_even(self, count: u64) -> Money {
        if count == 0 {
            return Money::ZERO;
        }
        Money(round_half_even(self.0 as i128, count as i128) as i64)
    }
}

impl ValueObject for Money {}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl core::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> core::iter::Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, digits) = match s.trim().strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.trim()),
        };
        let minor = parse_fixed(digits, 2).ok_or_else(|| invalid_decimal("money", s, 2))?;
        let minor = i64::try_from(minor).map_err(|_| invalid_decimal("money", s, 2))?;
        Ok(Money(if negative { -minor } else { minor }))
    }
}

/// Non-negative decimal rate with 4 fractional digits.
///
/// `0.30` margin is `Rate::from_ten_thousandths(3_000)`; a `1.5` labor
/// multiplier is `Rate::from_ten_thousandths(15_000)`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rate(u64);

impl Rate {
    pub const ZERO: Rate = Rate(0);
    pub const ONE: Rate = Rate(RATE_SCALE as u64);

    pub const fn from_ten_thousandths(value: u64) -> Self {
        Self(value)
    }

    /// Percentage points, e.g. `Rate::from_percent(30)` is 0.30.
    pub const fn from_percent(percent: u64) -> Self {
        Self(percent * 100)
    }

    pub const fn ten_thousandths(self) -> u64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / RATE_SCALE as f64
    }
}

impl ValueObject for Rate {}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_trimmed(f, self.0 as u128, 4)
    }
}

impl FromStr for Rate {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_fixed(s.trim(), 4)
            .and_then(|v| u64::try_from(v).ok())
            .map(Rate)
            .ok_or_else(|| invalid_decimal("rate", s, 4))
    }
}

/// Non-negative decimal measure with 2 fractional digits.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quantity(u64);

impl Quantity {
    pub const ZERO: Quantity = Quantity(0);

    pub const fn from_hundredths(value: u64) -> Self {
        Self(value)
    }

    pub const fn whole(units: u64) -> Self {
        Self(units * QUANTITY_SCALE as u64)
    }

    pub const fn hundredths(self) -> u64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl ValueObject for Quantity {}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_trimmed(f, self.0 as u128, 2)
    }
}

impl FromStr for Quantity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_fixed(s.trim(), 2)
            .and_then(|v| u64::try_from(v).ok())
            .map(Quantity)
            .ok_or_else(|| invalid_decimal("quantity", s, 2))
    }
}

/// Decimal values are written as strings in config/JSON so no binary float
/// ever touches a price. Plain integers are accepted on input.
#[derive(Deserialize)]
#[serde(untagged)]
enum DecimalRepr {
    Text(String),
    Integer(u64),
}

macro_rules! impl_decimal_serde {
    ($t:ident, $scale:expr) => {
        impl Serialize for $t {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $t {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                match DecimalRepr::deserialize(deserializer)? {
                    DecimalRepr::Text(s) => s.parse().map_err(serde::de::Error::custom),
                    DecimalRepr::Integer(n) => n
                        .checked_mul($scale as u64)
                        .map($t)
                        .ok_or_else(|| serde::de::Error::custom("decimal out of range")),
                }
            }
        }
    };
}

impl_decimal_serde!(Rate, RATE_SCALE);
impl_decimal_serde!(Quantity, QUANTITY_SCALE);

/// Parse an unsigned decimal into an integer scaled by `10^frac_digits`.
fn parse_fixed(s: &str, frac_digits: u32) -> Option<u128> {
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, f),
        None => (s, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if frac_part.len() > frac_digits as usize {
        return None;
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit()) || !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let int_value: u128 = if int_part.is_empty() { 0 } else { int_part.parse().ok()? };
    let mut frac_value: u128 = if frac_part.is_empty() { 0 } else { frac_part.parse().ok()? };
    for _ in frac_part.len()..frac_digits as usize {
        frac_value *= 10;
    }

    int_value
        .checked_mul(10u128.pow(frac_digits))?
        .checked_add(frac_value)
}

fn write_trimmed(f: &mut fmt::Formatter<'_>, value: u128, frac_digits: u32) -> fmt::Result {
    let scale = 10u128.pow(frac_digits);
    let frac = format!("{:0width$}", value % scale, width = frac_digits as usize);
    let trimmed = frac.trim_end_matches('0');
    let shown = if trimmed.len() < 2 { &frac[..2] } else { trimmed };
    write!(f, "{}.{}", value / scale, shown)
}

fn invalid_decimal(kind: &str, raw: &str, frac_digits: u32) -> DomainError {
    DomainError::invalid_input(
        kind,
        format!("`{raw}` is not a non-negative decimal with at most {frac_digits} fractional digits"),
    )
}
