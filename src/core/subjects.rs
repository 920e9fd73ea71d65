//! Subject assignments - which teacher teaches which subject, per year and term.
//!
//! Each row links one subject (for a given study year and term) to one
//! teacher. Assigning a subject that already has a teacher for that year and
//! term moves it to the new teacher instead of adding a second row.

use crate::{
    config::portal::PortalConfig,
    core::{
        accounts::get_teacher,
        fees::{check_year, parse_year},
        records,
        schema::{SUBJECT_HEADERS, TableSpec, ensure_table},
    },
    errors::{Error, Result},
    sheet::{Record, Workbook},
};
use sea_orm::{ConnectionTrait, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::info;

/// One row of the subjects sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectAssignment {
    /// Subject name
    pub subject: String,
    /// Code of the teaching teacher
    pub teacher_code: String,
    /// Name of the teaching teacher
    pub teacher_name: String,
    /// Study year, `None` when the stored value is not 1 to 4
    pub year: Option<u8>,
    /// Term label (e.g. "1", "Fall")
    pub term: String,
}

impl SubjectAssignment {
    fn from_record(record: &Record<'_>) -> Self {
        Self {
            subject: record.text("Subject"),
            teacher_code: record.text("Teacher_Code"),
            teacher_name: record.text("Teacher_Name"),
            year: parse_year(&record.text("Year")),
            term: record.text("Term"),
        }
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.subject.clone(),
            self.teacher_code.clone(),
            self.teacher_name.clone(),
            self.year.map(|y| y.to_string()).unwrap_or_default(),
            self.term.clone(),
        ]
    }
}

/// Request to assign a subject.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAssignment {
    /// Subject name
    pub subject: String,
    /// Code of the teacher taking the subject
    pub teacher_code: String,
    /// Study year, 1 to 4
    pub year: u8,
    /// Term label
    pub term: String,
}

/// Filters for [`list_subjects`]; unset fields match everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubjectFilter {
    /// Only subjects of this teacher
    #[serde(default)]
    pub teacher_code: Option<String>,
    /// Only subjects of this study year
    #[serde(default)]
    pub year: Option<u8>,
}

/// Assigns a subject to a teacher, re-pointing an existing assignment of the
/// same subject, year and term.
pub async fn assign_subject(
    workbook: &Workbook,
    config: &PortalConfig,
    new: NewAssignment,
) -> Result<SubjectAssignment> {
    let subject = new.subject.trim();
    let term = new.term.trim();
    if subject.is_empty() {
        return Err(Error::validation("subject cannot be empty"));
    }
    if term.is_empty() {
        return Err(Error::validation("term cannot be empty"));
    }
    check_year(new.year)?;

    let txn = workbook.connection().begin().await?;
    let teacher = get_teacher(&txn, config, &new.teacher_code).await?;

    let (sheet, _) = ensure_table(
        &txn,
        &TableSpec::main(&config.sheets.subjects, SUBJECT_HEADERS),
    )
    .await?;
    let table = sheet.get_table(&txn).await?;

    let assignment = SubjectAssignment {
        subject: subject.to_string(),
        teacher_code: teacher.code,
        teacher_name: teacher.name,
        year: Some(new.year),
        term: term.to_string(),
    };

    let existing = table.records().find(|r| {
        r.text("Subject").eq_ignore_ascii_case(subject)
            && parse_year(&r.text("Year")) == Some(new.year)
            && r.text("Term") == term
    });
    if let Some(record) = existing {
        sheet
            .update_row(&txn, record.row_number(), &assignment.row())
            .await?;
    } else {
        let fields: Vec<(&str, String)> = SUBJECT_HEADERS
            .iter()
            .copied()
            .zip(assignment.row())
            .collect();
        records::append_record(&txn, &config.sheets.subjects, &fields).await?;
    }
    txn.commit().await?;

    info!(
        "Assigned {} (year {}, term {}) to {}",
        assignment.subject, new.year, assignment.term, assignment.teacher_code
    );
    Ok(assignment)
}

/// Subject assignments matching `filter`, in sheet order.
pub async fn list_subjects<C>(
    db: &C,
    config: &PortalConfig,
    filter: &SubjectFilter,
) -> Result<Vec<SubjectAssignment>>
where
    C: ConnectionTrait,
{
    let table = records::read_table(db, &config.sheets.subjects).await?;
    Ok(table
        .records()
        .map(|r| SubjectAssignment::from_record(&r))
        .filter(|a| {
            filter
                .teacher_code
                .as_deref()
                .is_none_or(|code| a.teacher_code == code.trim())
        })
        .filter(|a| filter.year.is_none_or(|year| a.year == Some(year)))
        .collect())
}
