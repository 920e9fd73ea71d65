//! Worksheet entity - One named tab of the workbook.
//!
//! A worksheet carries its grid size the way a spreadsheet tab does: rows and
//! columns that exist whether or not they hold data. Cell contents live in
//! [`super::sheet_row`].

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Worksheet database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "worksheets")]
pub struct Model {
    /// Unique identifier for the worksheet
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Tab title, unique within the workbook (e.g. "Students", "A12345")
    #[sea_orm(unique)]
    pub title: String,
    /// Number of rows in the grid
    pub row_count: i32,
    /// Number of columns in the grid
    pub col_count: i32,
    /// When the tab was added
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Worksheet and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One worksheet has many stored rows
    #[sea_orm(has_many = "super::sheet_row::Entity")]
    Rows,
}

impl Related<super::sheet_row::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rows.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
