//! Knowledge chunk entity
//!
//! One embeddable unit of an uploaded document. `chunk_index` records the
//! chunk's position within its source document so original order can be
//! reconstructed.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "knowledge_chunks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Original upload file name, for UI display.
    pub file_name: Option<String>,

    /// Declared extension of the upload (pdf, docx, txt).
    pub file_type: Option<String>,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// Position of this chunk within its source document.
    pub chunk_index: i32,

    /// pgvector column. Read and written via raw SQL only; skipped in API
    /// responses.
    #[sea_orm(column_type = "Text", nullable)]
    #[serde(skip_serializing)]
    pub embedding: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
