//! Worksheet handle - cell-level operations on one tab.
//!
//! Rows and columns are 1-based, as in any spreadsheet. Every operation is
//! generic over the connection so it can run inside a database transaction
//! begun by the caller.

use crate::{
    entities::{SheetRow, Worksheet as WorksheetEntity, sheet_row, worksheet},
    errors::{Error, Result},
    sheet::table::Table,
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{debug, trace};

/// A handle to one tab of the workbook.
///
/// The handle only names the tab; grid size and contents are read from storage
/// on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worksheet {
    id: i64,
    title: String,
}

/// Grid size of a worksheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    /// Number of rows
    pub rows: usize,
    /// Number of columns
    pub cols: usize,
}

impl From<worksheet::Model> for Worksheet {
    fn from(model: worksheet::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
        }
    }
}

impl Worksheet {
    /// Tab title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Storage identifier.
    #[must_use]
    pub const fn id(&self) -> i64 {
        self.id
    }

    async fn model<C>(&self, db: &C) -> Result<worksheet::Model>
    where
        C: ConnectionTrait,
    {
        WorksheetEntity::find_by_id(self.id)
            .one(db)
            .await?
            .ok_or_else(|| Error::SheetNotFound {
                title: self.title.clone(),
            })
    }

    async fn stored_rows<C>(&self, db: &C) -> Result<Vec<sheet_row::Model>>
    where
        C: ConnectionTrait,
    {
        SheetRow::find()
            .filter(sheet_row::Column::WorksheetId.eq(self.id))
            .order_by_asc(sheet_row::Column::RowIndex)
            .all(db)
            .await
            .map_err(Into::into)
    }

    async fn stored_row<C>(&self, db: &C, row: usize) -> Result<Option<sheet_row::Model>>
    where
        C: ConnectionTrait,
    {
        SheetRow::find()
            .filter(sheet_row::Column::WorksheetId.eq(self.id))
            .filter(sheet_row::Column::RowIndex.eq(to_i32(row)?))
            .one(db)
            .await
            .map_err(Into::into)
    }

    /// Current grid size.
    pub async fn grid<C>(&self, db: &C) -> Result<Grid>
    where
        C: ConnectionTrait,
    {
        let model = self.model(db).await?;
        Ok(Grid {
            rows: to_usize(model.row_count),
            cols: to_usize(model.col_count),
        })
    }

    /// Every row from 1 up to the last row holding data.
    ///
    /// Rows without data inside that range come back empty; each row has its
    /// trailing empty cells trimmed.
    pub async fn get_all_values<C>(&self, db: &C) -> Result<Vec<Vec<String>>>
    where
        C: ConnectionTrait,
    {
        let stored = self.stored_rows(db).await?;
        let last = stored.last().map_or(0, |r| to_usize(r.row_index));
        let mut values = vec![Vec::new(); last];
        for row in stored {
            let index = to_usize(row.row_index);
            if index >= 1 {
                values[index - 1] = decode_cells(&row.cells)?;
            }
        }
        trace!("Read {} rows from '{}'", values.len(), self.title);
        Ok(values)
    }

    /// Reads the whole tab into a [`Table`], taking row 1 as the header.
    pub async fn get_table<C>(&self, db: &C) -> Result<Table>
    where
        C: ConnectionTrait,
    {
        Ok(Table::from_values(self.get_all_values(db).await?))
    }

    /// Values of one row, trailing empty cells trimmed.
    pub async fn row_values<C>(&self, db: &C, row: usize) -> Result<Vec<String>>
    where
        C: ConnectionTrait,
    {
        check_index(row, 1)?;
        match self.stored_row(db, row).await? {
            Some(stored) => decode_cells(&stored.cells),
            None => Ok(Vec::new()),
        }
    }

    /// Values of one column from row 1 down to its last non-empty cell.
    ///
    /// Empty cells above the last value are kept as empty strings, so index
    /// `i` of the result is always row `i + 1`. The account sheets use this on
    /// column 1 to collect every code already handed out.
    ///
    /// # Errors
    /// Returns [`Error::OutOfRange`] for column 0.
    pub async fn col_values<C>(&self, db: &C, col: usize) -> Result<Vec<String>>
    where
        C: ConnectionTrait,
    {
        check_index(1, col)?;
        let mut values = Vec::new();
        for row in self.get_all_values(db).await? {
            values.push(row.get(col - 1).cloned().unwrap_or_default());
        }
        while values.last().is_some_and(String::is_empty) {
            values.pop();
        }
        Ok(values)
    }

    /// Appends a row after the last row holding data and returns its row number.
    ///
    /// The grid grows when the new row or its width does not fit.
    pub async fn append_row<C>(&self, db: &C, values: &[String]) -> Result<usize>
    where
        C: ConnectionTrait,
    {
        let model = self.model(db).await?;
        let last = SheetRow::find()
            .filter(sheet_row::Column::WorksheetId.eq(self.id))
            .order_by_desc(sheet_row::Column::RowIndex)
            .one(db)
            .await?
            .map_or(0, |r| to_usize(r.row_index));
        let row = last + 1;

        let rows = to_usize(model.row_count).max(row);
        let cols = to_usize(model.col_count).max(values.len());
        if rows != to_usize(model.row_count) || cols != to_usize(model.col_count) {
            let mut grid: worksheet::ActiveModel = model.into();
            grid.row_count = Set(to_i32(rows)?);
            grid.col_count = Set(to_i32(cols)?);
            grid.update(db).await?;
        }

        self.write_row(db, row, values.to_vec()).await?;
        debug!("Appended row {} to '{}'", row, self.title);
        Ok(row)
    }

    /// Overwrites a single cell.
    ///
    /// Both indices are 1-based and must lie inside the current grid; the grid
    /// is never grown implicitly here, unlike [`Worksheet::append_row`].
    pub async fn update_cell<C>(&self, db: &C, row: usize, col: usize, value: &str) -> Result<()>
    where
        C: ConnectionTrait,
    {
        check_index(row, col)?;
        let grid = self.grid(db).await?;
        if row > grid.rows || col > grid.cols {
            return Err(Error::OutOfRange { row, col });
        }

        let mut cells = self.row_values(db, row).await?;
        if cells.len() < col {
            cells.resize(col, String::new());
        }
        cells[col - 1] = value.to_string();
        self.write_row(db, row, cells).await?;
        trace!("Updated cell ({}, {}) of '{}'", row, col, self.title);
        Ok(())
    }

    /// Replaces a whole row; cells beyond `values` are cleared.
    pub async fn update_row<C>(&self, db: &C, row: usize, values: &[String]) -> Result<()>
    where
        C: ConnectionTrait,
    {
        check_index(row, 1)?;
        let grid = self.grid(db).await?;
        if row > grid.rows {
            return Err(Error::OutOfRange { row, col: 1 });
        }
        if values.len() > grid.cols {
            return Err(Error::OutOfRange {
                row,
                col: values.len(),
            });
        }
        self.write_row(db, row, values.to_vec()).await
    }

    /// Changes the grid size, discarding data outside the new bounds.
    ///
    /// Shrinking drops stored rows past the new row count and truncates the
    /// remaining rows to the new column count. Growing only updates the grid
    /// size; new cells read as empty.
    ///
    /// # Arguments
    /// * `rows` - New row count, at least 1
    /// * `cols` - New column count, at least 1
    pub async fn resize<C>(&self, db: &C, rows: usize, cols: usize) -> Result<()>
    where
        C: ConnectionTrait,
    {
        check_index(rows, cols)?;
        let model = self.model(db).await?;
        let mut grid: worksheet::ActiveModel = model.into();
        grid.row_count = Set(to_i32(rows)?);
        grid.col_count = Set(to_i32(cols)?);
        grid.update(db).await?;

        SheetRow::delete_many()
            .filter(sheet_row::Column::WorksheetId.eq(self.id))
            .filter(sheet_row::Column::RowIndex.gt(to_i32(rows)?))
            .exec(db)
            .await?;

        for stored in self.stored_rows(db).await? {
            let cells = decode_cells(&stored.cells)?;
            if cells.len() > cols {
                let row = to_usize(stored.row_index);
                self.write_row(db, row, cells[..cols].to_vec()).await?;
            }
        }

        debug!("Resized '{}' to {}x{}", self.title, rows, cols);
        Ok(())
    }

    /// Stores `cells` as row `row`, deleting the stored row when nothing is left.
    async fn write_row<C>(&self, db: &C, row: usize, mut cells: Vec<String>) -> Result<()>
    where
        C: ConnectionTrait,
    {
        while cells.last().is_some_and(String::is_empty) {
            cells.pop();
        }

        let existing = self.stored_row(db, row).await?;
        match (existing, cells.is_empty()) {
            (Some(stored), true) => {
                stored.delete(db).await?;
            }
            (Some(stored), false) => {
                let mut active: sheet_row::ActiveModel = stored.into();
                active.cells = Set(serde_json::to_string(&cells)?);
                active.update(db).await?;
            }
            (None, false) => {
                let active = sheet_row::ActiveModel {
                    worksheet_id: Set(self.id),
                    row_index: Set(to_i32(row)?),
                    cells: Set(serde_json::to_string(&cells)?),
                    ..Default::default()
                };
                active.insert(db).await?;
            }
            (None, true) => {}
        }
        Ok(())
    }
}

fn decode_cells(raw: &str) -> Result<Vec<String>> {
    serde_json::from_str(raw).map_err(Into::into)
}

fn check_index(row: usize, col: usize) -> Result<()> {
    if row == 0 || col == 0 {
        return Err(Error::OutOfRange { row, col });
    }
    Ok(())
}

fn to_i32(value: usize) -> Result<i32> {
    i32::try_from(value).map_err(|_| Error::OutOfRange {
        row: value,
        col: value,
    })
}

fn to_usize(value: i32) -> usize {
    usize::try_from(value).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn test_append_and_read_back() -> Result<()> {
        let workbook = setup_test_workbook().await?;
        let sheet = workbook.add_worksheet("Log", 10, 4).await?;
        let db = workbook.connection();

        assert_eq!(sheet.append_row(db, &row(&["Topic", "Notes"])).await?, 1);
        assert_eq!(sheet.append_row(db, &row(&["Exam", "passed", ""])).await?, 2);

        let values = sheet.get_all_values(db).await?;
        assert_eq!(values, vec![row(&["Topic", "Notes"]), row(&["Exam", "passed"])]);
        assert_eq!(sheet.row_values(db, 2).await?, row(&["Exam", "passed"]));
        assert_eq!(sheet.col_values(db, 1).await?, row(&["Topic", "Exam"]));
        assert!(sheet.row_values(db, 7).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_append_grows_grid() -> Result<()> {
        let workbook = setup_test_workbook().await?;
        let sheet = workbook.add_worksheet("Tiny", 1, 1).await?;
        let db = workbook.connection();

        sheet.append_row(db, &row(&["a"])).await?;
        sheet.append_row(db, &row(&["b", "c", "d"])).await?;

        assert_eq!(sheet.grid(db).await?, Grid { rows: 2, cols: 3 });
        Ok(())
    }

    #[tokio::test]
    async fn test_update_cell_within_and_outside_grid() -> Result<()> {
        let workbook = setup_test_workbook().await?;
        let sheet = workbook.add_worksheet("Cells", 5, 3).await?;
        let db = workbook.connection();

        sheet.update_cell(db, 4, 3, "x").await?;
        assert_eq!(sheet.row_values(db, 4).await?, row(&["", "", "x"]));
        assert_eq!(sheet.get_all_values(db).await?.len(), 4);

        let result = sheet.update_cell(db, 6, 1, "y").await;
        assert!(matches!(result, Err(Error::OutOfRange { row: 6, col: 1 })));
        let result = sheet.update_cell(db, 1, 0, "y").await;
        assert!(matches!(result, Err(Error::OutOfRange { .. })));

        // Clearing the only value removes the row entirely
        sheet.update_cell(db, 4, 3, "").await?;
        assert!(sheet.get_all_values(db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_row_clears_trailing_cells() -> Result<()> {
        let workbook = setup_test_workbook().await?;
        let sheet = workbook.add_worksheet("Rows", 5, 5).await?;
        let db = workbook.connection();

        sheet.append_row(db, &row(&["a", "b", "c", "d"])).await?;
        sheet.update_row(db, 1, &row(&["x", "y"])).await?;
        assert_eq!(sheet.row_values(db, 1).await?, row(&["x", "y"]));

        let result = sheet.update_row(db, 1, &row(&["1", "2", "3", "4", "5", "6"])).await;
        assert!(matches!(result, Err(Error::OutOfRange { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_resize_truncates_data() -> Result<()> {
        let workbook = setup_test_workbook().await?;
        let sheet = workbook.add_worksheet("Shrink", 10, 5).await?;
        let db = workbook.connection();

        sheet.append_row(db, &row(&["a", "b", "c"])).await?;
        sheet.append_row(db, &row(&["d", "e", "f"])).await?;
        sheet.append_row(db, &row(&["g", "h", "i"])).await?;

        sheet.resize(db, 2, 2).await?;

        assert_eq!(sheet.grid(db).await?, Grid { rows: 2, cols: 2 });
        assert_eq!(
            sheet.get_all_values(db).await?,
            vec![row(&["a", "b"]), row(&["d", "e"])]
        );
        Ok(())
    }
}
