//! Private sheets - the free-form log kept for every account.
//!
//! Each account owns a tab titled by its code, created together with the
//! account. Admins and teachers add lines (notes, grades, payment receipts);
//! the owner reads them back. Admins may add their own columns to the tab, so
//! reading keeps whatever headers it finds and ensuring the tab only ever
//! touches the leading `Topic, Notes, Date, Link` columns. Columns whose name
//! mentions a link carry URLs, which are normalised on the way out.
//!
//! Every operation first checks that the code belongs to a registered student
//! or teacher, so a main table can never be mistaken for a private sheet.

use crate::{
    config::portal::PortalConfig,
    core::{
        accounts::account_role,
        schema::{PRIVATE_HEADERS, TableSpec, ensure_table},
    },
    errors::{Error, Result},
    sheet::{Worksheet, workbook},
};
use chrono::Utc;
use sea_orm::ConnectionTrait;
use serde::Serialize;
use tracing::{debug, warn};

/// Contents of a private sheet, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrivateLog {
    /// Code of the owning account
    pub code: String,
    /// Header row as found in the sheet
    pub headers: Vec<String>,
    /// Names of the columns holding links
    pub link_columns: Vec<String>,
    /// Entries in sheet order, one value per header; empty links are `None`
    pub entries: Vec<Vec<Option<String>>>,
}

/// Creates the private sheet of `code` unless it already exists.
///
/// Returns the sheet and whether it was created now. For an existing sheet
/// only the leading standard headers are checked: when they differ they are
/// rewritten in place, and any columns the admin added after them are kept.
///
/// # Errors
/// Returns [`Error::RecordNotFound`] when `code` is not a registered account.
pub async fn ensure_private_sheet<C>(
    db: &C,
    config: &PortalConfig,
    code: &str,
) -> Result<(Worksheet, bool)>
where
    C: ConnectionTrait,
{
    let code = code.trim();
    account_role(db, config, code).await?;

    let Some(sheet) = workbook::find_worksheet(db, code).await? else {
        let (sheet, _) = ensure_table(db, &TableSpec::private(code)).await?;
        return Ok((sheet, true));
    };

    let current = sheet.row_values(db, 1).await?;
    let standard = TableSpec::private(code).header_row();
    if current.starts_with(&standard) {
        return Ok((sheet, false));
    }

    let mut repaired = standard;
    repaired.extend(current.into_iter().skip(PRIVATE_HEADERS.len()));
    warn!("Rewriting standard headers of private sheet '{}'", code);
    let grid = sheet.grid(db).await?;
    if grid.cols < repaired.len() {
        sheet.resize(db, grid.rows, repaired.len()).await?;
    }
    sheet.update_row(db, 1, &repaired).await?;
    Ok((sheet, false))
}

/// Appends an entry to the private sheet of `code`, stamped with today's date.
///
/// The sheet must already exist. Cells beyond the standard four columns stay
/// blank.
pub async fn add_entry<C>(
    db: &C,
    config: &PortalConfig,
    code: &str,
    topic: &str,
    notes: &str,
    link: Option<&str>,
) -> Result<usize>
where
    C: ConnectionTrait,
{
    if topic.trim().is_empty() {
        return Err(Error::validation("topic cannot be empty"));
    }
    let code = code.trim();
    account_role(db, config, code).await?;

    let sheet = workbook::worksheet(db, code).await?;
    let date = Utc::now().format("%Y-%m-%d %H:%M").to_string();
    let row = vec![
        topic.trim().to_string(),
        notes.trim().to_string(),
        date,
        link.map(str::trim).unwrap_or_default().to_string(),
    ];
    let row_number = sheet.append_row(db, &row).await?;
    debug!("Added private entry for {} at row {}", code, row_number);
    Ok(row_number)
}

/// Reads the private sheet of `code` with link columns normalised.
pub async fn read_private_log<C>(db: &C, config: &PortalConfig, code: &str) -> Result<PrivateLog>
where
    C: ConnectionTrait,
{
    let code = code.trim();
    account_role(db, config, code).await?;

    let table = workbook::worksheet(db, code).await?.get_table(db).await?;
    let headers = table.headers().to_vec();
    let is_link: Vec<bool> = headers.iter().map(|h| is_link_column(h)).collect();

    let entries = table
        .records()
        .map(|record| {
            headers
                .iter()
                .enumerate()
                .map(|(i, _)| {
                    let value = record.value_at(i);
                    if is_link[i] {
                        normalize_link(value)
                    } else {
                        Some(value.to_string())
                    }
                })
                .collect()
        })
        .collect();

    Ok(PrivateLog {
        code: code.to_string(),
        link_columns: headers
            .iter()
            .zip(&is_link)
            .filter(|(_, link)| **link)
            .map(|(h, _)| h.clone())
            .collect(),
        headers,
        entries,
    })
}

/// True for column names that hold links ("Link", "CV link", "رابط").
#[must_use]
pub fn is_link_column(name: &str) -> bool {
    name.to_lowercase().contains("link") || name.contains("رابط")
}

/// Turns a stored link into a clickable URL.
///
/// Blank values give `None`; values without an `http://` or `https://` scheme
/// get `https://` prepended.
#[must_use]
pub fn normalize_link(raw: &str) -> Option<String> {
    let url = raw.trim();
    if url.is_empty() {
        return None;
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        Some(url.to_string())
    } else {
        Some(format!("https://{url}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{records, schema::TEACHER_HEADERS};
    use crate::test_utils::*;

    #[test]
    fn test_normalize_link() {
        assert_eq!(normalize_link(""), None);
        assert_eq!(normalize_link("   "), None);
        assert_eq!(
            normalize_link("drive.google.com/file/1"),
            Some("https://drive.google.com/file/1".to_string())
        );
        assert_eq!(
            normalize_link(" http://example.com "),
            Some("http://example.com".to_string())
        );
        assert_eq!(
            normalize_link("https://example.com"),
            Some("https://example.com".to_string())
        );
    }

    #[test]
    fn test_is_link_column() {
        assert!(is_link_column("Link"));
        assert!(is_link_column("CV_link"));
        assert!(is_link_column("رابط الملف"));
        assert!(!is_link_column("Notes"));
    }

    #[tokio::test]
    async fn test_private_sheet_lifecycle() -> Result<()> {
        let (workbook, config) = setup_portal().await?;
        let student = register_test_student(&workbook, &config, 1).await?;
        let db = workbook.connection();
        let code = student.code.as_str();

        // Registration already created the sheet
        let (_, created) = ensure_private_sheet(db, &config, code).await?;
        assert!(!created);

        let link = Some("example.com/sheet");
        add_entry(db, &config, code, "Midterm", "A+", link).await?;
        add_entry(db, &config, code, "Advice", "read more", None).await?;

        let log = read_private_log(db, &config, code).await?;
        assert_eq!(log.headers, vec!["Topic", "Notes", "Date", "Link"]);
        assert_eq!(log.link_columns, vec!["Link".to_string()]);
        assert_eq!(log.entries.len(), 2);
        assert_eq!(log.entries[0][0].as_deref(), Some("Midterm"));
        assert_eq!(
            log.entries[0][3].as_deref(),
            Some("https://example.com/sheet")
        );
        assert_eq!(log.entries[1][3], None);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_sheet_is_recreated_for_existing_account() -> Result<()> {
        let (workbook, config) = setup_portal().await?;
        let db = workbook.connection();
        let fields = [("Code", "A12345".to_string()), ("Name", "Mona".to_string())];
        records::append_record(db, "Students", &fields).await?;

        let result = add_entry(db, &config, "A12345", "x", "y", None).await;
        assert!(matches!(result, Err(Error::SheetNotFound { .. })));

        let (_, created) = ensure_private_sheet(db, &config, "A12345").await?;
        assert!(created);
        let result = add_entry(db, &config, "A12345", "  ", "y", None).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        add_entry(db, &config, "A12345", "Welcome", "", None).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_main_tables_are_not_private_sheets() -> Result<()> {
        let (workbook, config) = setup_portal().await?;
        register_test_teacher(&workbook, &config, "Hany").await?;
        let db = workbook.connection();

        for title in ["Students", "Teachers", "Subjects", "Z99999"] {
            let result = ensure_private_sheet(db, &config, title).await;
            assert!(matches!(result, Err(Error::RecordNotFound { .. })), "{title}");
            let result = add_entry(db, &config, title, "Z99999", "hacked", None).await;
            assert!(matches!(result, Err(Error::RecordNotFound { .. })), "{title}");
            let result = read_private_log(db, &config, title).await;
            assert!(matches!(result, Err(Error::RecordNotFound { .. })), "{title}");
        }

        let teachers = workbook.worksheet("Teachers").await?;
        let expected = TableSpec::main("Teachers", TEACHER_HEADERS).header_row();
        assert_eq!(teachers.row_values(db, 1).await?, expected);
        let students = records::read_table(db, "Students").await?;
        assert!(students.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_ensure_keeps_extra_columns() -> Result<()> {
        let (workbook, config) = setup_portal().await?;
        let student = register_test_student(&workbook, &config, 1).await?;
        let db = workbook.connection();
        let code = student.code.as_str();
        let sheet = workbook.worksheet(code).await?;

        // Admin adds a column, and someone mistypes a standard header
        sheet.update_cell(db, 1, 5, "Grade").await?;
        let row = add_entry(db, &config, code, "Final", "", None).await?;
        sheet.update_cell(db, row, 5, "A+").await?;
        ensure_private_sheet(db, &config, code).await?;
        assert_eq!(sheet.row_values(db, 1).await?[4], "Grade");

        sheet.update_cell(db, 1, 2, "Note").await?;
        let (_, created) = ensure_private_sheet(db, &config, code).await?;
        assert!(!created);
        assert_eq!(
            sheet.row_values(db, 1).await?,
            vec!["Topic", "Notes", "Date", "Link", "Grade"]
        );

        let log = read_private_log(db, &config, code).await?;
        assert_eq!(log.entries[0][4].as_deref(), Some("A+"));
        Ok(())
    }
}
