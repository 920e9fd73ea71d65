//! Workbook client - the named spreadsheet holding every portal tab.
//!
//! The workbook is a local `SQLite` file. [`Workbook::open`] connects and makes
//! sure the storage tables exist; the resulting value is created once at start
//! and shared for the lifetime of the process. Tab lookups are also available
//! as free functions generic over the connection, for use inside transactions.

use crate::{
    config::database,
    entities::{Worksheet as WorksheetEntity, worksheet},
    errors::{Error, Result},
    sheet::worksheet::Worksheet,
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{debug, info};

/// An open workbook.
#[derive(Debug, Clone)]
pub struct Workbook {
    name: String,
    db: DatabaseConnection,
}

impl Workbook {
    /// Opens the workbook stored at `database_url`, creating its storage if needed.
    pub async fn open(name: &str, database_url: &str) -> Result<Self> {
        let db = database::create_connection(database_url).await?;
        database::create_tables(&db).await?;
        info!("Opened workbook '{}'", name);
        Ok(Self::from_connection(name, db))
    }

    /// Wraps an existing connection whose storage tables already exist.
    #[must_use]
    pub fn from_connection(name: &str, db: DatabaseConnection) -> Self {
        Self {
            name: name.to_string(),
            db,
        }
    }

    /// Workbook name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Underlying connection, for starting transactions.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Looks up a tab by title, failing when it does not exist.
    pub async fn worksheet(&self, title: &str) -> Result<Worksheet> {
        worksheet(&self.db, title).await
    }

    /// Looks up a tab by title.
    pub async fn find_worksheet(&self, title: &str) -> Result<Option<Worksheet>> {
        find_worksheet(&self.db, title).await
    }

    /// Adds an empty tab with the given grid size.
    pub async fn add_worksheet(&self, title: &str, rows: usize, cols: usize) -> Result<Worksheet> {
        add_worksheet(&self.db, title, rows, cols).await
    }

    /// All tabs, oldest first.
    pub async fn worksheets(&self) -> Result<Vec<Worksheet>> {
        let models = WorksheetEntity::find()
            .order_by_asc(worksheet::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Worksheet::from).collect())
    }
}

/// Looks up a tab by title.
///
/// Surrounding whitespace is ignored, the same way [`add_worksheet`] strips
/// it before storing a title. Lookups are otherwise exact and case-sensitive.
pub async fn find_worksheet<C>(db: &C, title: &str) -> Result<Option<Worksheet>>
where
    C: ConnectionTrait,
{
    let model = WorksheetEntity::find()
        .filter(worksheet::Column::Title.eq(title.trim()))
        .one(db)
        .await?;
    Ok(model.map(Worksheet::from))
}

/// Looks up a tab by title, failing when it does not exist.
pub async fn worksheet<C>(db: &C, title: &str) -> Result<Worksheet>
where
    C: ConnectionTrait,
{
    find_worksheet(db, title)
        .await?
        .ok_or_else(|| Error::SheetNotFound {
            title: title.to_string(),
        })
}

/// Adds an empty tab with the given grid size.
///
/// Titles are unique within the workbook and cannot be blank.
pub async fn add_worksheet<C>(db: &C, title: &str, rows: usize, cols: usize) -> Result<Worksheet>
where
    C: ConnectionTrait,
{
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::validation("sheet title cannot be empty"));
    }
    if rows == 0 || cols == 0 {
        return Err(Error::OutOfRange {
            row: rows,
            col: cols,
        });
    }
    if find_worksheet(db, title).await?.is_some() {
        return Err(Error::SheetExists {
            title: title.to_string(),
        });
    }

    let out_of_range = || Error::OutOfRange {
        row: rows,
        col: cols,
    };
    let row_count = i32::try_from(rows).map_err(|_| out_of_range())?;
    let col_count = i32::try_from(cols).map_err(|_| out_of_range())?;

    let model = worksheet::ActiveModel {
        title: Set(title.to_string()),
        row_count: Set(row_count),
        col_count: Set(col_count),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    debug!("Added worksheet '{}' ({}x{})", title, rows, cols);
    Ok(Worksheet::from(model))
}
