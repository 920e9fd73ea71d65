//! Portal settings loading from portal.toml
//!
//! This module loads the tab names, fee schedule and code formats from a TOML
//! file. Every field has a default, so a partial file (or no file at all) still
//! yields a complete configuration. The result is validated before use.

use crate::{
    config::admin,
    core::{accounts::Role, fees::FeeSchedule, identity::CodeFormat},
    errors::{Error, Result},
};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire portal.toml file
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PortalConfig {
    /// Name of the workbook, used in logs
    pub workbook: String,
    /// Titles of the main tabs
    pub sheets: SheetNames,
    /// Tuition and book fees
    pub fees: FeeSchedule,
    /// Account code formats per role
    pub codes: CodeFormats,
    /// Length of generated passwords
    pub password_length: usize,
    /// Admin password; `PORTAL_ADMIN_PASSWORD` takes precedence
    pub admin_password: Option<String>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            workbook: "portal_database".to_string(),
            sheets: SheetNames::default(),
            fees: FeeSchedule::default(),
            codes: CodeFormats::default(),
            password_length: 8,
            admin_password: None,
        }
    }
}

/// Titles of the tabs acting as tables
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SheetNames {
    /// Main sheet of student accounts
    pub students: String,
    /// Main sheet of teacher accounts
    pub teachers: String,
    /// Subject assignments
    pub subjects: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            students: "Students".to_string(),
            teachers: "Teachers".to_string(),
            subjects: "Subjects".to_string(),
        }
    }
}

/// Code format for each role that owns a main sheet
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct CodeFormats {
    /// Student codes, e.g. `K40217`
    pub student: CodeFormat,
    /// Teacher codes, e.g. `TR5820`
    pub teacher: CodeFormat,
}

impl Default for CodeFormats {
    fn default() -> Self {
        Self {
            student: CodeFormat {
                letters: 1,
                digits: 5,
            },
            teacher: CodeFormat {
                letters: 2,
                digits: 4,
            },
        }
    }
}

impl PortalConfig {
    /// Title of the main sheet holding accounts of `role`, if it has one.
    #[must_use]
    pub fn main_sheet(&self, role: Role) -> Option<&str> {
        match role {
            Role::Student => Some(&self.sheets.students),
            Role::Teacher => Some(&self.sheets.teachers),
            Role::Admin => None,
        }
    }

    /// Code format for accounts of `role`, if it has one.
    #[must_use]
    pub const fn code_format(&self, role: Role) -> Option<CodeFormat> {
        match role {
            Role::Student => Some(self.codes.student),
            Role::Teacher => Some(self.codes.teacher),
            Role::Admin => None,
        }
    }

    /// Checks that the settings are usable.
    ///
    /// Sheet titles must be non-blank, free of surrounding whitespace and
    /// distinct. The fee schedule must cover every study year, and the two
    /// code formats must differ so a code identifies its role.
    ///
    /// # Returns
    /// `Ok(())` when every check passes.
    ///
    /// # Errors
    /// Returns [`Error::Config`] naming the first failed check.
    pub fn validate(&self) -> Result<()> {
        let titles = [
            &self.sheets.students,
            &self.sheets.teachers,
            &self.sheets.subjects,
        ];
        if titles.iter().any(|t| t.trim().is_empty()) {
            return Err(config_error("sheet titles cannot be empty"));
        }
        if titles.iter().any(|t| t.trim() != t.as_str()) {
            return Err(config_error("sheet titles cannot have surrounding spaces"));
        }
        if titles[0] == titles[1] || titles[0] == titles[2] || titles[1] == titles[2] {
            return Err(config_error("sheet titles must be distinct"));
        }

        self.fees
            .validate()
            .map_err(|e| config_error(e.to_string()))?;
        self.codes
            .student
            .validate()
            .map_err(|e| config_error(format!("student codes: {e}")))?;
        self.codes
            .teacher
            .validate()
            .map_err(|e| config_error(format!("teacher codes: {e}")))?;
        if self.codes.student.letters == self.codes.teacher.letters
            && self.codes.student.digits == self.codes.teacher.digits
        {
            return Err(config_error("student and teacher code formats must differ"));
        }

        if self.password_length < 4 {
            return Err(config_error("password_length must be at least 4"));
        }

        Ok(())
    }
}

fn config_error(message: impl Into<String>) -> Error {
    Error::Config {
        message: message.into(),
    }
}

/// Loads and validates portal configuration from a TOML file
///
/// # Arguments
/// * `path` - Path to the portal.toml file
///
/// # Returns
/// The parsed configuration, with defaults filled in for unset fields.
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - The settings fail validation
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PortalConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path_ref:?}: {e}"),
    })?;

    parse_config(&contents)
}

/// Parses and validates portal configuration from TOML text
pub fn parse_config(contents: &str) -> Result<PortalConfig> {
    let config: PortalConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse portal.toml: {e}"),
    })?;
    config.validate()?;
    Ok(config)
}

/// Loads portal configuration from `PORTAL_CONFIG` or `./portal.toml`.
///
/// A missing file is not an error: the defaults are used instead. The admin
/// password from the environment is applied last.
pub fn load_default_config() -> Result<PortalConfig> {
    let path = std::env::var("PORTAL_CONFIG").unwrap_or_else(|_| "portal.toml".to_string());
    let mut config = if Path::new(&path).exists() {
        load_config(&path)?
    } else {
        tracing::warn!("No configuration file at {}, using defaults", path);
        PortalConfig::default()
    };

    if let Some(password) = admin::get_admin_password() {
        config.admin_password = Some(password);
    }
    if config.admin_password.is_none() {
        tracing::warn!("No admin password configured, admin login is disabled");
    }
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_portal_config() {
        let toml_str = r#"
            workbook = "school_2024"
            password_length = 10

            [sheets]
            students = "Learners"

            [fees]
            base_tuition = 15000
            annual_increase_percent = 10
            book_fees = [1000, 1200, 1400, 1600]

            [codes.teacher]
            letters = 2
            digits = 3
        "#;

        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.workbook, "school_2024");
        assert_eq!(config.password_length, 10);
        assert_eq!(config.sheets.students, "Learners");
        // Unset fields keep their defaults
        assert_eq!(config.sheets.teachers, "Teachers");
        assert_eq!(config.fees.base_tuition, 15000);
        assert_eq!(config.fees.book_fees, vec![1000, 1200, 1400, 1600]);
        assert_eq!(config.codes.student, CodeFormats::default().student);
        assert_eq!(config.codes.teacher.digits, 3);
    }

    #[test]
    fn test_shipped_portal_toml_matches_defaults() {
        let config = parse_config(include_str!("../../portal.toml")).unwrap();
        assert_eq!(config, PortalConfig::default());
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, PortalConfig::default());
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let result = parse_config("password_length = 2");
        assert!(matches!(result, Err(Error::Config { .. })));

        let result = parse_config("[fees]\nbook_fees = [100, 200]");
        assert!(matches!(result, Err(Error::Config { .. })));

        let result = parse_config("[sheets]\nstudents = \"Teachers\"");
        assert!(matches!(result, Err(Error::Config { .. })));

        let result = parse_config("[codes.student]\nletters = 3\ndigits = 5");
        assert!(matches!(result, Err(Error::Config { .. })));

        let result = parse_config("[fees]\nbase_tuition = 9000000000000000000");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_padded_sheet_titles_rejected() {
        let result = parse_config("[sheets]\nstudents = \" Students\"");
        assert!(matches!(result, Err(Error::Config { .. })));

        let result = parse_config("[sheets]\nsubjects = \"Subjects \"");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let result = parse_config("workbook = ");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
