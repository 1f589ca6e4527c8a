use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Money amount in integer minor units (e.g. kobo, cents) to keep all
/// order arithmetic exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money {
    minor: i64,
}

impl Money {
    /// Creates a new Money amount from minor units.
    pub fn from_minor(minor: i64) -> Self {
        Self { minor }
    }

    /// Converts a major-unit price (as stored by the catalog) to minor
    /// units, rounding to the nearest unit with ties away from zero.
    ///
    /// Returns `None` when the scaled value does not fit in an `i64`.
    pub fn from_major(major: Decimal) -> Option<Self> {
        let minor = (major * Decimal::from(100))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()?;
        Some(Self { minor })
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { minor: 0 }
    }

    /// Returns the amount in minor units.
    pub fn minor(&self) -> i64 {
        self.minor
    }

    /// Returns the amount in major units as a float, for presentation
    /// payloads only; internal arithmetic stays in minor units.
    pub fn as_major_f64(&self) -> f64 {
        self.minor as f64 / 100.0
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.minor > 0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.minor == 0
    }

    /// Adds another amount, `None` on overflow.
    pub fn checked_add(&self, other: Money) -> Option<Money> {
        self.minor.checked_add(other.minor).map(Money::from_minor)
    }

    /// Multiplies by a quantity, `None` on overflow.
    pub fn checked_mul(&self, quantity: u32) -> Option<Money> {
        self.minor
            .checked_mul(i64::from(quantity))
            .map(Money::from_minor)
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.minor < 0 {
            write!(f, "-{}.{:02}", (self.minor / 100).abs(), self.minor.abs() % 100)
        } else {
            write!(f, "{}.{:02}", self.minor / 100, self.minor % 100)
        }
    }
}
