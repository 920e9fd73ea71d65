//! Record access - read a whole table, append a record, update one field by key.
//!
//! Records are addressed by header name rather than column position, so the
//! callers never depend on column order. The key of a record is its first
//! column (`Code` in the account sheets).

use crate::{
    errors::{Error, Result},
    sheet::{Table, workbook},
};
use sea_orm::ConnectionTrait;
use tracing::debug;

/// Reads the tab `title` into a [`Table`].
pub async fn read_table<C>(db: &C, title: &str) -> Result<Table>
where
    C: ConnectionTrait,
{
    workbook::worksheet(db, title).await?.get_table(db).await
}

/// Appends one record to `title`, laying the fields out in header order.
///
/// Headers without a field are left blank. A field naming no header is a
/// validation error. Returns the new row number.
pub async fn append_record<C>(db: &C, title: &str, fields: &[(&str, String)]) -> Result<usize>
where
    C: ConnectionTrait,
{
    let sheet = workbook::worksheet(db, title).await?;
    let headers = sheet.row_values(db, 1).await?;
    if headers.is_empty() {
        return Err(Error::validation(format!("sheet '{title}' has no header row")));
    }

    let mut row = vec![String::new(); headers.len()];
    for (name, value) in fields {
        let index = headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::validation(format!("'{title}' has no column '{name}'")))?;
        row[index].clone_from(value);
    }

    let row_number = sheet.append_row(db, &row).await?;
    debug!("Appended record at row {} of '{}'", row_number, title);
    Ok(row_number)
}

/// Sets `column` of the record whose first column equals `key`.
///
/// The key is compared exactly against the first column. When several rows
/// share a key, the topmost one is written. Only the one cell changes; the rest
/// of the row is left as it is.
///
/// # Returns
/// The row number that was written.
///
/// # Errors
/// - [`Error::SheetNotFound`] when the tab does not exist
/// - [`Error::Validation`] when the tab has no such column
/// - [`Error::RecordNotFound`] when no row has the key
pub async fn update_by_key<C>(
    db: &C,
    title: &str,
    key: &str,
    column: &str,
    value: &str,
) -> Result<usize>
where
    C: ConnectionTrait,
{
    let sheet = workbook::worksheet(db, title).await?;
    let table = sheet.get_table(db).await?;

    let col = table
        .column_index(column)
        .ok_or_else(|| Error::validation(format!("'{title}' has no column '{column}'")))?;
    let row = table
        .records()
        .find(|r| r.value_at(0) == key)
        .map(|r| r.row_number())
        .ok_or_else(|| Error::RecordNotFound {
            table: title.to_string(),
            code: key.to_string(),
        })?;

    sheet.update_cell(db, row, col + 1, value).await?;
    debug!("Set {}.{} for '{}' (row {})", title, column, key, row);
    Ok(row)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::schema::{TableSpec, ensure_table};
    use crate::test_utils::*;

    const HEADERS: &[&str] = &["Code", "Name", "Paid"];

    #[tokio::test]
    async fn test_append_orders_fields_by_header() -> Result<()> {
        let workbook = setup_test_workbook().await?;
        let db = workbook.connection();
        ensure_table(db, &TableSpec::main("People", HEADERS)).await?;

        let row = append_record(
            db,
            "People",
            &[("Paid", "100".to_string()), ("Code", "A12345".to_string())],
        )
        .await?;
        assert_eq!(row, 2);

        let table = read_table(db, "People").await?;
        let record = table.find("Code", "A12345").unwrap();
        assert_eq!(record.get("Name"), Some(""));
        assert_eq!(record.get("Paid"), Some("100"));
        Ok(())
    }

    #[tokio::test]
    async fn test_append_unknown_field_rejected() -> Result<()> {
        let workbook = setup_test_workbook().await?;
        let db = workbook.connection();
        ensure_table(db, &TableSpec::main("People", HEADERS)).await?;

        let result = append_record(db, "People", &[("Age", "30".to_string())]).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = append_record(db, "Nobody", &[]).await;
        assert!(matches!(result, Err(Error::SheetNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_by_key() -> Result<()> {
        let workbook = setup_test_workbook().await?;
        let db = workbook.connection();
        ensure_table(db, &TableSpec::main("People", HEADERS)).await?;
        append_record(db, "People", &[("Code", "A1".to_string())]).await?;
        append_record(db, "People", &[("Code", "B2".to_string())]).await?;

        let row = update_by_key(db, "People", "B2", "Paid", "250").await?;
        assert_eq!(row, 3);

        let table = read_table(db, "People").await?;
        assert_eq!(table.find("Code", "B2").unwrap().get("Paid"), Some("250"));
        assert_eq!(table.find("Code", "A1").unwrap().get("Paid"), Some(""));

        let result = update_by_key(db, "People", "C3", "Paid", "1").await;
        assert!(matches!(result, Err(Error::RecordNotFound { code, .. }) if code == "C3"));

        let result = update_by_key(db, "People", "A1", "Balance", "1").await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }
}
