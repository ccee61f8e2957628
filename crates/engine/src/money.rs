use std::fmt;

use crate::{EngineError, ResultEngine};

/// Signed money amount represented as **integer cents**.
///
/// Use this type for **all** monetary values in the engine (incomes,
/// allocations, targets, contributions) to avoid floating-point drift.
///
/// The value is signed:
/// - positive = income / deposit
/// - negative = withdrawal
///
/// Arithmetic is checked: sums that leave the `i64` range are reported as
/// [`EngineError::Validation`] instead of wrapping.
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "12.34€");
///
/// let total = MoneyCents::try_sum([amount, MoneyCents::new(-34)]).unwrap();
/// assert_eq!(total, MoneyCents::new(1200));
/// assert!(MoneyCents::new(i64::MAX).try_add(amount).is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Largest magnitude accepted for a single stored amount (100 billion).
    pub const MAX_AMOUNT: MoneyCents = MoneyCents(10_000_000_000_000);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Returns `true` when `|self| <= MAX_AMOUNT`.
    #[must_use]
    pub const fn within_limit(self) -> bool {
        self.0.unsigned_abs() <= Self::MAX_AMOUNT.0.unsigned_abs()
    }

    /// Returns `percentage`% of this amount, rounded to the cent.
    ///
    /// Ties are rounded half away from zero (`f64::round`), so `0.5` cents
    /// become `1` and `-0.5` cents become `-1`.
    #[must_use]
    pub fn percent(self, percentage: f64) -> MoneyCents {
        let raw = self.0 as f64 * percentage / 100.0;
        MoneyCents(raw.round() as i64)
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_add(rhs.0).map(MoneyCents)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_sub(rhs.0).map(MoneyCents)
    }

    pub fn try_add(self, rhs: MoneyCents) -> ResultEngine<MoneyCents> {
        self.checked_add(rhs).ok_or_else(overflow)
    }

    pub fn try_sub(self, rhs: MoneyCents) -> ResultEngine<MoneyCents> {
        self.checked_sub(rhs).ok_or_else(overflow)
    }

    /// Sums `amounts`, failing on the first overflow.
    pub fn try_sum<I>(amounts: I) -> ResultEngine<MoneyCents>
    where
        I: IntoIterator<Item = MoneyCents>,
    {
        amounts
            .into_iter()
            .try_fold(MoneyCents::ZERO, MoneyCents::try_add)
    }
}

fn overflow() -> EngineError {
    EngineError::validation("amount", "total out of range")
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let euros = abs / 100;
        let cents = abs % 100;
        write!(f, "{sign}{euros}.{cents:02}€")
    }
}
