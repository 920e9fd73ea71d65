//! Admin credential loading from environment variables.
//!
//! The admin account does not live in any sheet. Its password comes from
//! `PORTAL_ADMIN_PASSWORD` (usually set in `.env`), which overrides any
//! `admin_password` in portal.toml; with neither, admin login is disabled.

/// Code the admin logs in with.
pub const ADMIN_CODE: &str = "admin";

/// Gets the configured admin password, if any.
///
/// Blank values count as unset.
#[must_use]
pub fn get_admin_password() -> Option<String> {
    std::env::var("PORTAL_ADMIN_PASSWORD")
        .ok()
        .filter(|password| !password.trim().is_empty())
}

/// Checks a code/password pair against the configured admin password.
#[must_use]
pub fn check_admin(expected: Option<&str>, code: &str, password: &str) -> bool {
    code == ADMIN_CODE && expected.is_some_and(|expected| expected == password)
}
