//! Sheet row entity - The stored cells of one worksheet row.
//!
//! Only rows holding at least one non-empty cell are stored. `cells` is a JSON
//! array of strings with trailing empty cells trimmed.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sheet row database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sheet_rows")]
pub struct Model {
    /// Unique identifier for the stored row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the worksheet this row belongs to
    pub worksheet_id: i64,
    /// 1-based row number within the worksheet
    pub row_index: i32,
    /// JSON-encoded cell values, column 1 first
    pub cells: String,
}

/// Defines relationships between `SheetRow` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each row belongs to one worksheet
    #[sea_orm(
        belongs_to = "super::worksheet::Entity",
        from = "Column::WorksheetId",
        to = "super::worksheet::Column::Id",
        on_delete = "Cascade"
    )]
    Worksheet,
}

impl Related<super::worksheet::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Worksheet.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
