//! Schema initialisation - every table tab with its exact header row.
//!
//! The header row is the only schema a spreadsheet has. Each table is described
//! by a [`TableSpec`]; [`ensure_table`] creates the tab when it is missing and
//! rewrites row 1 whenever it differs from the expected headers, leaving the
//! data rows alone.

use crate::{
    config::portal::PortalConfig,
    errors::Result,
    sheet::{Workbook, Worksheet, workbook},
};
use sea_orm::ConnectionTrait;
use serde::Serialize;
use tracing::{info, warn};

/// Headers of the students main sheet.
pub const STUDENT_HEADERS: &[&str] = &[
    "Code",
    "Password",
    "Name",
    "National_ID",
    "Date_Of_Birth",
    "Phone",
    "Email",
    "Major",
    "Year",
    "Paid_Tuition",
    "Paid_Books",
    "Created_At",
    "Link",
];

/// Headers of the teachers main sheet.
pub const TEACHER_HEADERS: &[&str] = &[
    "Code",
    "Password",
    "Name",
    "National_ID",
    "Phone",
    "Email",
    "Specialization",
    "Created_At",
    "Link",
];

/// Headers of the subject assignment sheet.
pub const SUBJECT_HEADERS: &[&str] = &["Subject", "Teacher_Code", "Teacher_Name", "Year", "Term"];

/// Headers of a per-account private sheet.
pub const PRIVATE_HEADERS: &[&str] = &["Topic", "Notes", "Date", "Link"];

/// A table tab: title, headers and the grid it is created with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    /// Tab title
    pub title: String,
    /// Exact ordered header row
    pub headers: &'static [&'static str],
    /// Rows of a freshly created tab
    pub rows: usize,
    /// Columns of a freshly created tab
    pub cols: usize,
}

impl TableSpec {
    /// A main table tab (1000×20 grid).
    #[must_use]
    pub fn main(title: &str, headers: &'static [&'static str]) -> Self {
        Self {
            title: title.to_string(),
            headers,
            rows: 1000,
            cols: 20,
        }
    }

    /// The private tab of the account `code` (100×10 grid).
    #[must_use]
    pub fn private(code: &str) -> Self {
        Self {
            title: code.to_string(),
            headers: PRIVATE_HEADERS,
            rows: 100,
            cols: 10,
        }
    }

    /// Header row as owned cell values.
    #[must_use]
    pub fn header_row(&self) -> Vec<String> {
        self.headers.iter().map(ToString::to_string).collect()
    }
}

/// What [`ensure_table`] had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderStatus {
    /// The tab did not exist and was created
    Created,
    /// The header row differed and was rewritten
    Repaired,
    /// Nothing to do
    Intact,
}

/// Specs of the three main tables under the configured titles.
#[must_use]
pub fn main_tables(config: &PortalConfig) -> Vec<TableSpec> {
    vec![
        TableSpec::main(&config.sheets.students, STUDENT_HEADERS),
        TableSpec::main(&config.sheets.teachers, TEACHER_HEADERS),
        TableSpec::main(&config.sheets.subjects, SUBJECT_HEADERS),
    ]
}

/// Makes sure the tab described by `spec` exists and its first row equals the headers.
pub async fn ensure_table<C>(db: &C, spec: &TableSpec) -> Result<(Worksheet, HeaderStatus)>
where
    C: ConnectionTrait,
{
    let expected = spec.header_row();

    let Some(sheet) = workbook::find_worksheet(db, &spec.title).await? else {
        let cols = spec.cols.max(expected.len());
        let sheet = workbook::add_worksheet(db, &spec.title, spec.rows, cols).await?;
        sheet.update_row(db, 1, &expected).await?;
        info!(
            "Created sheet '{}' with {} headers",
            spec.title,
            expected.len()
        );
        return Ok((sheet, HeaderStatus::Created));
    };

    let current = sheet.row_values(db, 1).await?;
    if current == expected {
        return Ok((sheet, HeaderStatus::Intact));
    }

    warn!(
        "Header row of '{}' is {:?}, rewriting to {:?}",
        spec.title, current, expected
    );
    let grid = sheet.grid(db).await?;
    if grid.cols < expected.len() {
        sheet.resize(db, grid.rows, expected.len()).await?;
    }
    sheet.update_row(db, 1, &expected).await?;
    Ok((sheet, HeaderStatus::Repaired))
}

/// Ensures every main table of the portal, returning what happened to each.
pub async fn ensure_schema(
    workbook: &Workbook,
    config: &PortalConfig,
) -> Result<Vec<(String, HeaderStatus)>> {
    let mut report = Vec::new();
    for spec in main_tables(config) {
        let (_, status) = ensure_table(workbook.connection(), &spec).await?;
        report.push((spec.title, status));
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn test_ensure_schema_creates_then_stays_intact() -> Result<()> {
        let workbook = setup_test_workbook().await?;
        let config = PortalConfig::default();

        let report = ensure_schema(&workbook, &config).await?;
        assert_eq!(
            report,
            vec![
                ("Students".to_string(), HeaderStatus::Created),
                ("Teachers".to_string(), HeaderStatus::Created),
                ("Subjects".to_string(), HeaderStatus::Created),
            ]
        );

        let students = workbook.worksheet("Students").await?;
        let db = workbook.connection();
        assert_eq!(students.row_values(db, 1).await?, cells(STUDENT_HEADERS));

        let report = ensure_schema(&workbook, &config).await?;
        assert!(report.iter().all(|(_, s)| *s == HeaderStatus::Intact));
        Ok(())
    }

    #[tokio::test]
    async fn test_header_repair_yields_exact_headers() -> Result<()> {
        let workbook = setup_test_workbook().await?;
        let db = workbook.connection();
        let spec = TableSpec::main("Subjects", SUBJECT_HEADERS);

        let broken_rows: Vec<Vec<String>> = vec![
            Vec::new(),
            cells(&["Subject", "Teacher"]),
            cells(&["Term", "Year", "Teacher_Name", "Teacher_Code", "Subject"]),
            cells(&["Subject", "Teacher_Code", "Teacher_Name", "Year", "Term", "Extra", "More"]),
        ];

        for (i, broken) in broken_rows.into_iter().enumerate() {
            let title = format!("Subjects{i}");
            let spec = TableSpec {
                title: title.clone(),
                ..spec.clone()
            };
            let sheet = workbook.add_worksheet(&title, 10, 3).await?;
            if !broken.is_empty() {
                sheet.append_row(db, &broken).await?;
            }
            sheet.update_cell(db, 2, 1, "Math").await?;

            let (_, status) = ensure_table(db, &spec).await?;
            assert_eq!(status, HeaderStatus::Repaired);
            assert_eq!(sheet.row_values(db, 1).await?, cells(SUBJECT_HEADERS));
            // Data rows survive the repair
            assert_eq!(sheet.row_values(db, 2).await?, cells(&["Math"]));
        }
        Ok(())
    }

    #[test]
    fn test_private_table_layout() {
        let spec = TableSpec::private("A12345");
        assert_eq!(spec.title, "A12345");
        assert_eq!(spec.header_row(), cells(PRIVATE_HEADERS));
    }
}
