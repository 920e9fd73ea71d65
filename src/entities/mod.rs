//! Entity module - Contains the `SeaORM` entity definitions backing the workbook.
//! A workbook is a set of worksheets; each worksheet stores its non-empty rows.

pub mod sheet_row;
pub mod worksheet;

// Re-export specific types to avoid conflicts
pub use sheet_row::{Column as SheetRowColumn, Entity as SheetRow, Model as SheetRowModel};
pub use worksheet::{Column as WorksheetColumn, Entity as Worksheet, Model as WorksheetModel};
