/// Admin credentials from environment variables
pub mod admin;

/// Workbook storage connection and table creation
pub mod database;

/// Portal settings loading from portal.toml
pub mod portal;
