//! Shared test utilities for the portal.
//!
//! This module provides helpers for setting up in-memory workbooks and
//! registering accounts with sensible defaults.

use crate::{
    config::portal::PortalConfig,
    core::{
        accounts::{NewStudent, NewTeacher, Student, Teacher, register_student, register_teacher},
        schema::ensure_schema,
    },
    errors::Result,
    sheet::Workbook,
};
use chrono::NaiveDate;

/// Creates an in-memory workbook with all tables initialized and no tabs.
/// This is the standard setup for sheet-level tests.
pub async fn setup_test_workbook() -> Result<Workbook> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(Workbook::from_connection("test", db))
}

/// Sets up a workbook with the main tabs in place and the default settings.
/// Returns (workbook, config) for account-level tests.
pub async fn setup_portal() -> Result<(Workbook, PortalConfig)> {
    let workbook = setup_test_workbook().await?;
    let config = PortalConfig::default();
    ensure_schema(&workbook, &config).await?;
    Ok((workbook, config))
}

/// Student registration form with sensible defaults.
///
/// # Defaults
/// * `email`: derived from the name, `@example.com`
/// * `date_of_birth`: 2004-03-01
/// * `major`: "Computer Science"
pub fn test_new_student(name: &str, year: u8) -> NewStudent {
    NewStudent {
        name: name.to_string(),
        national_id: "29801011234567".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(2004, 3, 1),
        phone: "01000000000".to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        major: "Computer Science".to_string(),
        year,
        link: None,
    }
}

/// Teacher registration form with sensible defaults.
pub fn test_new_teacher(name: &str) -> NewTeacher {
    NewTeacher {
        name: name.to_string(),
        national_id: "27501011234567".to_string(),
        phone: "01100000000".to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        specialization: "Mathematics".to_string(),
        link: None,
    }
}

/// Registers a student named "Test Student" in `year`.
pub async fn register_test_student(
    workbook: &Workbook,
    config: &PortalConfig,
    year: u8,
) -> Result<Student> {
    let form = test_new_student("Test Student", year);
    let registration = register_student(workbook, config, form).await?;
    Ok(registration.account)
}

/// Registers a teacher called `name`.
pub async fn register_test_teacher(
    workbook: &Workbook,
    config: &PortalConfig,
    name: &str,
) -> Result<Teacher> {
    let registration = register_teacher(workbook, config, test_new_teacher(name)).await?;
    Ok(registration.account)
}
