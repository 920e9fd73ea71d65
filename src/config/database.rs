//! Workbook storage configuration for `SheetPortal`.
//!
//! The local workbook is a `SQLite` file. This module opens it and creates the
//! two storage tables (worksheets and their rows) from the entity definitions
//! with `SeaORM`'s `Schema::create_table_from_entity`, so the storage layout
//! always matches the Rust structs.

use crate::entities::{SheetRow, Worksheet};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::{Path, PathBuf};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/portal.sqlite?mode=rwc";

/// Gets the workbook URL from the `DATABASE_URL` environment variable or the default path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// File path of a `SQLite` URL, `None` for in-memory databases.
#[must_use]
pub fn sqlite_file_path(database_url: &str) -> Option<PathBuf> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(PathBuf::from(path))
}

/// Establishes a connection to the workbook named by `database_url`.
///
/// The directory of a file-backed workbook is created first.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    if let Some(parent) = sqlite_file_path(database_url)
        .as_deref()
        .and_then(Path::parent)
        .filter(|dir| !dir.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent)?;
    }
    tracing::debug!("Connecting to workbook storage at {}", database_url);
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates the storage tables if they do not exist yet.
///
/// Safe to call on every start: existing tables and their contents are left alone.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut worksheet_table = schema.create_table_from_entity(Worksheet);
    worksheet_table.if_not_exists();
    let mut row_table = schema.create_table_from_entity(SheetRow);
    row_table.if_not_exists();

    db.execute(builder.build(&worksheet_table)).await?;
    db.execute(builder.build(&row_table)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{SheetRowModel, WorksheetModel};
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = create_connection("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<WorksheetModel> = Worksheet::find().limit(1).all(&db).await?;
        let _: Vec<SheetRowModel> = SheetRow::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = create_connection("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;

        let _: Vec<WorksheetModel> = Worksheet::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[test]
    fn test_sqlite_file_path() {
        assert_eq!(
            sqlite_file_path("sqlite://data/portal.sqlite?mode=rwc"),
            Some(PathBuf::from("data/portal.sqlite"))
        );
        assert_eq!(
            sqlite_file_path("sqlite:portal.sqlite"),
            Some(PathBuf::from("portal.sqlite"))
        );
        assert_eq!(sqlite_file_path("sqlite::memory:"), None);
        assert_eq!(sqlite_file_path("postgres://localhost/db"), None);
    }
}
