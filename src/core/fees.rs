//! Fee calculation - tuition compounding, book fees and balances.
//!
//! Tuition for year `y` is the base amount raised by a fixed percentage for
//! every completed year, floored to a whole amount: `⌊base × 1.1^(y−1)⌋` with
//! the default 10%. Book fees come from a fixed table indexed by year. Paid
//! amounts are stored as sheet text and parsed defensively: anything that is
//! not a number counts as zero.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};

/// Highest study year.
pub const MAX_YEAR: u8 = 4;

/// Tuition and book-fee settings.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct FeeSchedule {
    /// Tuition due in year 1
    pub base_tuition: i64,
    /// Percentage added on top of the previous year's tuition
    pub annual_increase_percent: u32,
    /// Book fee for each year, year 1 first
    pub book_fees: Vec<i64>,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            base_tuition: 20_000,
            annual_increase_percent: 10,
            book_fees: vec![1_500, 1_750, 2_000, 2_250],
        }
    }
}

/// Due, paid and remaining amounts for one kind of fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Balance {
    /// Amount owed for the year
    pub due: i64,
    /// Amount paid so far
    pub paid: i64,
    /// `due - paid`; negative when overpaid
    pub remaining: i64,
}

impl Balance {
    /// Builds a balance from the amount due and the amount paid.
    ///
    /// Paid amounts come straight from sheet cells, so they can hold any
    /// `i64`. The remaining amount saturates at the `i64` bounds instead of
    /// overflowing.
    #[must_use]
    pub const fn new(due: i64, paid: i64) -> Self {
        Self {
            due,
            paid,
            remaining: due.saturating_sub(paid),
        }
    }
}

/// Fee position of one student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeeSummary {
    /// Study year the amounts apply to
    pub year: u8,
    /// Tuition balance
    pub tuition: Balance,
    /// Book-fee balance
    pub books: Balance,
}

impl FeeSchedule {
    /// Checks that the schedule covers every year with non-negative amounts.
    ///
    /// The final-year tuition is computed once, so a base amount or rate
    /// too large to represent is rejected here rather than on first use.
    pub fn validate(&self) -> Result<()> {
        if self.base_tuition < 0 {
            return Err(Error::validation("base_tuition cannot be negative"));
        }
        if self.book_fees.len() != usize::from(MAX_YEAR) {
            return Err(Error::validation(format!(
                "book_fees must list exactly {MAX_YEAR} amounts"
            )));
        }
        if self.book_fees.iter().any(|fee| *fee < 0) {
            return Err(Error::validation("book_fees cannot be negative"));
        }
        self.tuition_due(MAX_YEAR)?;
        Ok(())
    }

    /// Tuition due in `year`.
    ///
    /// Compounded one year at a time with exact integer arithmetic, then
    /// floored, so the result equals `⌊base × (1 + p/100)^(year−1)⌋`.
    ///
    /// # Errors
    /// Returns a validation error for a year outside 1 to [`MAX_YEAR`], or
    /// when the amount does not fit in an `i64`.
    pub fn tuition_due(&self, year: u8) -> Result<i64> {
        check_year(year)?;
        let overflow = || Error::validation("tuition amount overflows");
        let rate = 100 + i128::from(self.annual_increase_percent);
        let mut numerator = i128::from(self.base_tuition);
        let mut denominator: i128 = 1;
        for _ in 1..year {
            numerator = numerator.checked_mul(rate).ok_or_else(overflow)?;
            denominator *= 100;
        }
        i64::try_from(numerator / denominator).map_err(|_| overflow())
    }

    /// Book fee due in `year`.
    pub fn book_fee(&self, year: u8) -> Result<i64> {
        check_year(year)?;
        self.book_fees
            .get(usize::from(year - 1))
            .copied()
            .ok_or_else(|| Error::validation(format!("no book fee configured for year {year}")))
    }

    /// Fee position for a student in `year` given the stored paid amounts.
    pub fn summarize(&self, year: u8, paid_tuition: &str, paid_books: &str) -> Result<FeeSummary> {
        Ok(FeeSummary {
            year,
            tuition: Balance::new(self.tuition_due(year)?, parse_money(paid_tuition)),
            books: Balance::new(self.book_fee(year)?, parse_money(paid_books)),
        })
    }
}

/// Fails unless `year` is between 1 and [`MAX_YEAR`].
pub fn check_year(year: u8) -> Result<()> {
    if (1..=MAX_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(Error::validation(format!("year must be between 1 and {MAX_YEAR}, got {year}")))
    }
}

/// Parses a stored year cell, `None` when it is not a valid year.
#[must_use]
pub fn parse_year(raw: &str) -> Option<u8> {
    raw.trim()
        .parse::<u8>()
        .ok()
        .filter(|y| (1..=MAX_YEAR).contains(y))
}

/// Parses a stored monetary amount.
///
/// Accepts plain integers, thousands separators (`1,500`) and decimal text
/// (`1500.75`, truncated). Anything else, including blank cells, is 0.
#[must_use]
pub fn parse_money(raw: &str) -> i64 {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return 0;
    }
    if let Ok(amount) = cleaned.parse::<i64>() {
        return amount;
    }
    match cleaned.split_once('.') {
        Some((whole, fraction))
            if !fraction.is_empty() && fraction.chars().all(|c| c.is_ascii_digit()) =>
        {
            whole.parse::<i64>().unwrap_or(0)
        }
        _ => 0,
    }
}
