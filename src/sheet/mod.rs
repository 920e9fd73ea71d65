//! Spreadsheet client.
//!
//! A [`Workbook`] is opened once per process and hands out [`Worksheet`]
//! handles; reading a worksheet yields a [`Table`].

pub mod table;
pub mod workbook;
pub mod worksheet;

pub use table::{Record, Table};
pub use workbook::Workbook;
pub use worksheet::{Grid, Worksheet};
