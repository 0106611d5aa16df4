//! Assistant entity
//!
//! One configurable voice-assistant profile. The prompt, voice and configure
//! field groups map to the three editor sections of the frontend.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "assistants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    // Basic info
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    // Prompt section
    #[sea_orm(column_type = "Text", nullable)]
    pub first_message: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub system_prompt: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub end_call_message: Option<String>,

    // Voice section
    pub voice_name: Option<String>,
    pub elevenlabs_voice_id: Option<String>,
    pub voice_provider: String,

    // Configure section
    pub language: String,
    pub timezone: Option<String>,
    pub detect_caller_number: bool,
    pub multilingual_support: bool,
    pub voice_recording: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
