//! Account business logic - registration, login and lookup of students and teachers.
//!
//! Accounts live as rows of their role's main sheet, keyed by a generated code.
//! Registration reads the existing codes, draws a fresh code and password,
//! appends the row and creates the account's private sheet, all inside one
//! database transaction so two registrations can never end up with the same
//! code. Admin is not stored in any sheet; see [`crate::config::admin`].

use crate::{
    config::{admin, portal::PortalConfig},
    core::{
        fees::{check_year, parse_money, parse_year},
        identity::{generate_password, generate_unique_code},
        notes::{ensure_private_sheet, normalize_link},
        records,
        schema::{STUDENT_HEADERS, TEACHER_HEADERS, TableSpec, ensure_table},
    },
    errors::{Error, Result},
    sheet::{Record, Workbook, workbook},
};
use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::{ConnectionTrait, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Who an account belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Portal administrator
    Admin,
    /// Teaching staff
    Teacher,
    /// Enrolled student
    Student,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let token = match self {
            Self::Admin => "admin",
            Self::Teacher => "teacher",
            Self::Student => "student",
        };
        write!(f, "{token}")
    }
}

impl std::str::FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "teacher" => Ok(Self::Teacher),
            "student" => Ok(Self::Student),
            _ => Err(Error::validation(format!("{s:?} is not a valid role"))),
        }
    }
}

/// A student row of the students main sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Student {
    /// Account code
    pub code: String,
    /// Full name
    pub name: String,
    /// National identity number
    pub national_id: String,
    /// Date of birth, when recorded and well-formed
    pub date_of_birth: Option<NaiveDate>,
    /// Age in whole years today, derived from `date_of_birth`
    pub age: Option<u32>,
    /// Phone number
    pub phone: String,
    /// Email address
    pub email: String,
    /// Academic major
    pub major: String,
    /// Study year, `None` when the stored value is not 1 to 4
    pub year: Option<u8>,
    /// Tuition paid so far
    pub paid_tuition: i64,
    /// Book fees paid so far
    pub paid_books: i64,
    /// Registration timestamp as stored
    pub created_at: String,
    /// Profile link
    pub link: Option<String>,
}

impl Student {
    /// Reads a student from a students-sheet record.
    #[must_use]
    pub fn from_record(record: &Record<'_>) -> Self {
        let date_of_birth = parse_date(&record.text("Date_Of_Birth"));
        Self {
            code: record.text("Code"),
            name: record.text("Name"),
            national_id: record.text("National_ID"),
            date_of_birth,
            age: date_of_birth.map(|dob| calculate_age(dob, Utc::now().date_naive())),
            phone: record.text("Phone"),
            email: record.text("Email"),
            major: record.text("Major"),
            year: parse_year(&record.text("Year")),
            paid_tuition: parse_money(&record.text("Paid_Tuition")),
            paid_books: parse_money(&record.text("Paid_Books")),
            created_at: record.text("Created_At"),
            link: normalize_link(&record.text("Link")),
        }
    }
}

/// A teacher row of the teachers main sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Teacher {
    /// Account code
    pub code: String,
    /// Full name
    pub name: String,
    /// National identity number
    pub national_id: String,
    /// Phone number
    pub phone: String,
    /// Email address
    pub email: String,
    /// Subject area
    pub specialization: String,
    /// Registration timestamp as stored
    pub created_at: String,
    /// Profile link
    pub link: Option<String>,
}

impl Teacher {
    /// Reads a teacher from a teachers-sheet record.
    #[must_use]
    pub fn from_record(record: &Record<'_>) -> Self {
        Self {
            code: record.text("Code"),
            name: record.text("Name"),
            national_id: record.text("National_ID"),
            phone: record.text("Phone"),
            email: record.text("Email"),
            specialization: record.text("Specialization"),
            created_at: record.text("Created_At"),
            link: normalize_link(&record.text("Link")),
        }
    }
}

/// Registration form of a student.
#[derive(Debug, Clone, Deserialize)]
pub struct NewStudent {
    /// Full name
    pub name: String,
    /// National identity number
    #[serde(default)]
    pub national_id: String,
    /// Date of birth
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    /// Phone number
    #[serde(default)]
    pub phone: String,
    /// Email address
    pub email: String,
    /// Academic major
    #[serde(default)]
    pub major: String,
    /// Study year, 1 to 4
    pub year: u8,
    /// Optional profile link
    #[serde(default)]
    pub link: Option<String>,
}

/// Registration form of a teacher.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTeacher {
    /// Full name
    pub name: String,
    /// National identity number
    #[serde(default)]
    pub national_id: String,
    /// Phone number
    #[serde(default)]
    pub phone: String,
    /// Email address
    pub email: String,
    /// Subject area
    #[serde(default)]
    pub specialization: String,
    /// Optional profile link
    #[serde(default)]
    pub link: Option<String>,
}

/// A freshly registered account together with its generated password.
#[derive(Debug, Clone, Serialize)]
pub struct Registration<T> {
    /// The stored account
    pub account: T,
    /// Generated password; only ever returned here
    pub password: String,
}

/// The account a login resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "role", content = "profile", rename_all = "lowercase")]
pub enum Account {
    /// The administrator
    Admin,
    /// A teacher
    Teacher(Teacher),
    /// A student
    Student(Student),
}

impl Account {
    /// Role of the account.
    #[must_use]
    pub const fn role(&self) -> Role {
        match self {
            Self::Admin => Role::Admin,
            Self::Teacher(_) => Role::Teacher,
            Self::Student(_) => Role::Student,
        }
    }

    /// Code the account logs in with.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Admin => admin::ADMIN_CODE,
            Self::Teacher(t) => &t.code,
            Self::Student(s) => &s.code,
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Admin => "Administrator",
            Self::Teacher(t) => &t.name,
            Self::Student(s) => &s.name,
        }
    }
}

fn check_contact(name: &str, email: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::validation("name cannot be empty"));
    }
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(Error::validation("a valid email is required"));
    }
    Ok(())
}

/// Reads the existing codes of `title` (header excluded).
async fn existing_codes<C>(db: &C, title: &str) -> Result<Vec<String>>
where
    C: ConnectionTrait,
{
    let sheet = workbook::worksheet(db, title).await?;
    let codes = sheet.col_values(db, 1).await?;
    Ok(codes.into_iter().skip(1).collect())
}

fn timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Registers a student and creates their private sheet.
pub async fn register_student(
    workbook: &Workbook,
    config: &PortalConfig,
    new: NewStudent,
) -> Result<Registration<Student>> {
    check_contact(&new.name, &new.email)?;
    check_year(new.year)?;

    let title = &config.sheets.students;
    let txn = workbook.connection().begin().await?;
    ensure_table(&txn, &TableSpec::main(title, STUDENT_HEADERS)).await?;

    let existing = existing_codes(&txn, title).await?;
    let (code, password) = {
        let mut rng = rand::thread_rng();
        let code = generate_unique_code(&mut rng, config.codes.student, &existing)?;
        (code, generate_password(&mut rng, config.password_length))
    };

    let fields = [
        ("Code", code.clone()),
        ("Password", password.clone()),
        ("Name", new.name.trim().to_string()),
        ("National_ID", new.national_id.trim().to_string()),
        (
            "Date_Of_Birth",
            new.date_of_birth
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        ),
        ("Phone", new.phone.trim().to_string()),
        ("Email", new.email.trim().to_string()),
        ("Major", new.major.trim().to_string()),
        ("Year", new.year.to_string()),
        ("Paid_Tuition", "0".to_string()),
        ("Paid_Books", "0".to_string()),
        ("Created_At", timestamp()),
        ("Link", new.link.unwrap_or_default().trim().to_string()),
    ];
    records::append_record(&txn, title, &fields).await?;
    ensure_private_sheet(&txn, config, &code).await?;

    let student = get_student(&txn, config, &code).await?;
    txn.commit().await?;

    info!("Registered student {} ({})", student.code, student.name);
    Ok(Registration {
        account: student,
        password,
    })
}

/// Registers a teacher and creates their private sheet.
pub async fn register_teacher(
    workbook: &Workbook,
    config: &PortalConfig,
    new: NewTeacher,
) -> Result<Registration<Teacher>> {
    check_contact(&new.name, &new.email)?;

    let title = &config.sheets.teachers;
    let txn = workbook.connection().begin().await?;
    ensure_table(&txn, &TableSpec::main(title, TEACHER_HEADERS)).await?;

    let existing = existing_codes(&txn, title).await?;
    let (code, password) = {
        let mut rng = rand::thread_rng();
        let code = generate_unique_code(&mut rng, config.codes.teacher, &existing)?;
        (code, generate_password(&mut rng, config.password_length))
    };

    let fields = [
        ("Code", code.clone()),
        ("Password", password.clone()),
        ("Name", new.name.trim().to_string()),
        ("National_ID", new.national_id.trim().to_string()),
        ("Phone", new.phone.trim().to_string()),
        ("Email", new.email.trim().to_string()),
        ("Specialization", new.specialization.trim().to_string()),
        ("Created_At", timestamp()),
        ("Link", new.link.unwrap_or_default().trim().to_string()),
    ];
    records::append_record(&txn, title, &fields).await?;
    ensure_private_sheet(&txn, config, &code).await?;

    let teacher = get_teacher(&txn, config, &code).await?;
    txn.commit().await?;

    info!("Registered teacher {} ({})", teacher.code, teacher.name);
    Ok(Registration {
        account: teacher,
        password,
    })
}

/// Checks a login attempt for `role`.
///
/// Any mismatch, including an unknown code or a missing sheet, is reported
/// as [`Error::InvalidCredentials`].
pub async fn verify_login(
    workbook: &Workbook,
    config: &PortalConfig,
    role: Role,
    code: &str,
    password: &str,
) -> Result<Account> {
    let code = code.trim();
    let Some(title) = config.main_sheet(role) else {
        return if admin::check_admin(config.admin_password.as_deref(), code, password) {
            Ok(Account::Admin)
        } else {
            warn!("Failed admin login");
            Err(Error::InvalidCredentials)
        };
    };

    let table = match records::read_table(workbook.connection(), title).await {
        Ok(table) => table,
        Err(Error::SheetNotFound { .. }) => return Err(Error::InvalidCredentials),
        Err(e) => return Err(e),
    };

    let matched = table
        .records()
        .find(|r| r.text("Code") == code && r.get("Password").map(str::trim) == Some(password));
    match (role, matched) {
        (Role::Student, Some(record)) => Ok(Account::Student(Student::from_record(&record))),
        (Role::Teacher, Some(record)) => Ok(Account::Teacher(Teacher::from_record(&record))),
        _ => {
            warn!("Failed {} login for code {:?}", role, code);
            Err(Error::InvalidCredentials)
        }
    }
}

/// Looks up a student by code.
pub async fn get_student<C>(db: &C, config: &PortalConfig, code: &str) -> Result<Student>
where
    C: ConnectionTrait,
{
    let title = &config.sheets.students;
    let table = records::read_table(db, title).await?;
    table
        .find("Code", code.trim())
        .map(|r| Student::from_record(&r))
        .ok_or_else(|| Error::RecordNotFound {
            table: title.clone(),
            code: code.to_string(),
        })
}

/// Looks up a teacher by code.
pub async fn get_teacher<C>(db: &C, config: &PortalConfig, code: &str) -> Result<Teacher>
where
    C: ConnectionTrait,
{
    let title = &config.sheets.teachers;
    let table = records::read_table(db, title).await?;
    table
        .find("Code", code.trim())
        .map(|r| Teacher::from_record(&r))
        .ok_or_else(|| Error::RecordNotFound {
            table: title.clone(),
            code: code.to_string(),
        })
}

/// Role of the registered account `code`.
///
/// The code must have the shape of a student or teacher code and appear in
/// that role's main sheet. Tab titles such as the main sheets themselves can
/// never pass, which keeps private-sheet operations off the main tables.
///
/// # Errors
/// Returns [`Error::RecordNotFound`] when no account has this code.
pub async fn account_role<C>(db: &C, config: &PortalConfig, code: &str) -> Result<Role>
where
    C: ConnectionTrait,
{
    let code = code.trim();
    for role in [Role::Student, Role::Teacher] {
        let (Some(format), Some(title)) = (config.code_format(role), config.main_sheet(role))
        else {
            continue;
        };
        if !format.matches(code) {
            continue;
        }
        let table = match records::read_table(db, title).await {
            Ok(table) => table,
            Err(Error::SheetNotFound { .. }) => continue,
            Err(e) => return Err(e),
        };
        if table.find("Code", code).is_some() {
            return Ok(role);
        }
    }
    Err(Error::RecordNotFound {
        table: "accounts".to_string(),
        code: code.to_string(),
    })
}

/// All students, in sheet order.
pub async fn list_students<C>(db: &C, config: &PortalConfig) -> Result<Vec<Student>>
where
    C: ConnectionTrait,
{
    let table = records::read_table(db, &config.sheets.students).await?;
    Ok(table.records().map(|r| Student::from_record(&r)).collect())
}

/// All teachers, in sheet order.
pub async fn list_teachers<C>(db: &C, config: &PortalConfig) -> Result<Vec<Teacher>>
where
    C: ConnectionTrait,
{
    let table = records::read_table(db, &config.sheets.teachers).await?;
    Ok(table.records().map(|r| Teacher::from_record(&r)).collect())
}

/// Age in whole years on `today` of someone born on `birth_date`.
#[must_use]
pub fn calculate_age(birth_date: NaiveDate, today: NaiveDate) -> u32 {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    u32::try_from(age).unwrap_or(0)
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}
