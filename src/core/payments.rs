//! Payment business logic - tuition and book-fee payments per student.
//!
//! A payment adds to the paid amount stored on the student's row and leaves a
//! receipt line in the student's private sheet. The read, the write-back and
//! the receipt happen in one database transaction, so concurrent payments for
//! the same student cannot overwrite each other.

use crate::{
    config::portal::PortalConfig,
    core::{
        accounts::{Student, get_student},
        fees::{Balance, FeeSummary},
        notes::{add_entry, ensure_private_sheet},
        records,
    },
    errors::{Error, Result},
    sheet::Workbook,
};
use sea_orm::{ConnectionTrait, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Which fee a payment goes towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeKind {
    /// Tuition
    Tuition,
    /// Books
    Books,
}

impl FeeKind {
    /// Students-sheet column holding the paid amount.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Tuition => "Paid_Tuition",
            Self::Books => "Paid_Books",
        }
    }
}

impl std::fmt::Display for FeeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tuition => write!(f, "tuition"),
            Self::Books => write!(f, "books"),
        }
    }
}

/// Outcome of a recorded payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentReceipt {
    /// Student code
    pub code: String,
    /// Fee the payment went towards
    pub kind: FeeKind,
    /// Amount of this payment
    pub amount: i64,
    /// Balance of that fee after the payment
    pub balance: Balance,
}

/// Fee position of a student.
///
/// Amounts due come from the configured schedule for the student's year;
/// paid amounts are the parsed cells of the student's row.
///
/// # Errors
/// Returns a validation error when the stored year is not 1 to 4.
pub fn fee_summary(config: &PortalConfig, student: &Student) -> Result<FeeSummary> {
    let year = student.year.ok_or_else(|| {
        Error::validation(format!("student {} has no valid study year", student.code))
    })?;
    Ok(FeeSummary {
        year,
        tuition: Balance::new(config.fees.tuition_due(year)?, student.paid_tuition),
        books: Balance::new(config.fees.book_fee(year)?, student.paid_books),
    })
}

/// Fee position of the student with `code`.
pub async fn fee_summary_for<C>(db: &C, config: &PortalConfig, code: &str) -> Result<FeeSummary>
where
    C: ConnectionTrait,
{
    let student = get_student(db, config, code).await?;
    fee_summary(config, &student)
}

/// Records a payment of `amount` towards `kind` for the student `code`.
pub async fn record_payment(
    workbook: &Workbook,
    config: &PortalConfig,
    code: &str,
    kind: FeeKind,
    amount: i64,
) -> Result<PaymentReceipt> {
    if amount <= 0 {
        return Err(Error::validation("payment amount must be greater than zero"));
    }

    let txn = workbook.connection().begin().await?;

    let student = get_student(&txn, config, code).await?;
    let before = fee_summary(config, &student)?;
    let paid = match kind {
        FeeKind::Tuition => before.tuition.paid,
        FeeKind::Books => before.books.paid,
    }
    .checked_add(amount)
    .ok_or_else(|| Error::validation("payment amount is too large"))?;

    records::update_by_key(
        &txn,
        &config.sheets.students,
        &student.code,
        kind.column(),
        &paid.to_string(),
    )
    .await?;

    let balance = match kind {
        FeeKind::Tuition => Balance::new(before.tuition.due, paid),
        FeeKind::Books => Balance::new(before.books.due, paid),
    };

    ensure_private_sheet(&txn, config, &student.code).await?;
    add_entry(
        &txn,
        config,
        &student.code,
        &format!("Payment ({kind})"),
        &format!(
            "Paid {amount}; total paid {}, remaining {}",
            balance.paid, balance.remaining
        ),
        None,
    )
    .await?;

    txn.commit().await?;

    info!(
        "Recorded {} payment of {} for {} (remaining {})",
        kind, amount, student.code, balance.remaining
    );
    Ok(PaymentReceipt {
        code: student.code,
        kind,
        amount,
        balance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::notes::read_private_log;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_payments_accumulate() -> Result<()> {
        let (workbook, config) = setup_portal().await?;
        let student = register_test_student(&workbook, &config, 2).await?;
        let code = student.code.as_str();

        let receipt = record_payment(&workbook, &config, code, FeeKind::Tuition, 5_000).await?;
        assert_eq!(receipt.balance, Balance::new(22_000, 5_000));

        let receipt = record_payment(&workbook, &config, code, FeeKind::Tuition, 7_000).await?;
        assert_eq!(receipt.balance.paid, 12_000);
        assert_eq!(receipt.balance.remaining, 10_000);

        record_payment(&workbook, &config, code, FeeKind::Books, 1_750).await?;

        let summary = fee_summary_for(workbook.connection(), &config, code).await?;
        assert_eq!(summary.tuition.paid, 12_000);
        assert_eq!(summary.books.remaining, 0);

        // One receipt line per payment in the private sheet
        let log = read_private_log(workbook.connection(), &config, code).await?;
        assert_eq!(log.entries.len(), 3);
        assert_eq!(log.entries[2][0].as_deref(), Some("Payment (books)"));
        Ok(())
    }

    #[tokio::test]
    async fn test_garbage_paid_cell_counts_as_zero() -> Result<()> {
        let (workbook, config) = setup_portal().await?;
        let student = register_test_student(&workbook, &config, 1).await?;
        let code = student.code.as_str();
        let db = workbook.connection();

        records::update_by_key(db, "Students", code, "Paid_Tuition", "n/a").await?;

        let summary = fee_summary_for(db, &config, code).await?;
        assert_eq!(summary.tuition.paid, 0);
        assert_eq!(summary.tuition.remaining, 20_000);

        let receipt = record_payment(&workbook, &config, code, FeeKind::Tuition, 100).await?;
        assert_eq!(receipt.balance.paid, 100);
        Ok(())
    }

    #[tokio::test]
    async fn test_extreme_paid_cell_does_not_overflow() -> Result<()> {
        let (workbook, config) = setup_portal().await?;
        let student = register_test_student(&workbook, &config, 1).await?;
        let code = student.code.as_str();
        let db = workbook.connection();

        records::update_by_key(db, "Students", code, "Paid_Tuition", "-9223372036854775808").await?;

        let summary = fee_summary_for(db, &config, code).await?;
        assert_eq!(summary.tuition.paid, i64::MIN);
        assert_eq!(summary.tuition.remaining, i64::MAX);
        Ok(())
    }

    #[tokio::test]
    async fn test_payment_keeps_custom_private_columns() -> Result<()> {
        let (workbook, config) = setup_portal().await?;
        let student = register_test_student(&workbook, &config, 1).await?;
        let code = student.code.as_str();
        let db = workbook.connection();

        let sheet = workbook.worksheet(code).await?;
        sheet.update_cell(db, 1, 5, "Grade").await?;
        sheet.update_cell(db, 2, 1, "Quiz").await?;
        sheet.update_cell(db, 2, 5, "A+").await?;

        record_payment(&workbook, &config, code, FeeKind::Books, 10).await?;

        let log = read_private_log(db, &config, code).await?;
        assert_eq!(log.headers, vec!["Topic", "Notes", "Date", "Link", "Grade"]);
        assert_eq!(log.entries[0][4].as_deref(), Some("A+"));
        assert_eq!(log.entries[1][0].as_deref(), Some("Payment (books)"));
        Ok(())
    }

    #[tokio::test]
    async fn test_payment_validation() -> Result<()> {
        let (workbook, config) = setup_portal().await?;
        let student = register_test_student(&workbook, &config, 1).await?;
        let code = student.code.as_str();

        let result = record_payment(&workbook, &config, code, FeeKind::Books, 0).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = record_payment(&workbook, &config, "Z00000", FeeKind::Books, 10).await;
        assert!(matches!(result, Err(Error::RecordNotFound { .. })));

        // A broken year cell blocks payments instead of guessing the fee
        records::update_by_key(workbook.connection(), "Students", code, "Year", "senior").await?;
        let result = record_payment(&workbook, &config, code, FeeKind::Books, 10).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }
}
