//! Assistant profile management.
//!
//! Creation injects the default NovaVoice prompt template for any prompt
//! field the caller leaves empty. Partial updates go through explicit update
//! structs with one optional field per updatable attribute, applied by a
//! merge function, so the set of updatable fields is statically known.

use sea_orm::Set;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::models::{self, assistant};
use crate::db::{NewAssistant, Repository};
use crate::errors::AppError;

pub const DEFAULT_SYSTEM_PROMPT: &str = "\
## I. IDENTITY

You are Maya, a warm, professional AI assistant for NovaVoice.

You assist users by:
- Answering queries clearly
- Providing helpful and accurate responses
- Handling conversations naturally
- Sounding human, not robotic

Tone & Style:
- Friendly and natural
- Short and warm sentences
- Professional but conversational
- Never sound scripted

---

## II. GLOBAL RULES
- Never hallucinate unknown facts
- Always confirm important user details
- Ask clarification if input is unclear
- Maintain conversation context
- Be polite and helpful at all times

---

## III. CONVERSATION BEHAVIOR
- Speak like a real assistant
- Avoid robotic responses
- Keep replies concise but useful
- Stay calm and professional

---

## IV. PRIMARY GOAL
Your goal is to assist users efficiently while maintaining a natural,
warm, and professional conversational experience like a real human assistant.
";

pub const DEFAULT_FIRST_MESSAGE: &str =
    "Hello! This is your NovaVoice AI assistant. How may I assist you today?";

pub const DEFAULT_END_CALL_MESSAGE: &str = "Thank you for contacting us. If you need anything \
     else, feel free to reach out anytime. Have a great day!";

/// Basic-info partial update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssistantUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl AssistantUpdate {
    /// Merge into an existing assistant; fields left `None` keep their
    /// current value.
    pub fn apply(self, assistant: models::Assistant) -> assistant::ActiveModel {
        let mut active: assistant::ActiveModel = assistant.into();
        if let Some(name) = self.name {
            active.name = Set(name);
        }
        if let Some(description) = self.description {
            active.description = Set(Some(description));
        }
        active
    }
}

/// Prompt-section write: overwrites all three fields at once.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromptUpdate {
    pub first_message: Option<String>,
    pub system_prompt: Option<String>,
    pub end_call_message: Option<String>,
}

/// Configure-section partial update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigureUpdate {
    pub voice_name: Option<String>,
    pub elevenlabs_voice_id: Option<String>,
    pub voice_provider: Option<String>,
    pub language: Option<String>,
    pub timezone: Option<String>,
    pub detect_caller_number: Option<bool>,
    pub multilingual_support: Option<bool>,
    pub voice_recording: Option<bool>,
}

impl ConfigureUpdate {
    pub fn apply(self, assistant: models::Assistant) -> assistant::ActiveModel {
        let mut active: assistant::ActiveModel = assistant.into();
        if let Some(v) = self.voice_name {
            active.voice_name = Set(Some(v));
        }
        if let Some(v) = self.elevenlabs_voice_id {
            active.elevenlabs_voice_id = Set(Some(v));
        }
        if let Some(v) = self.voice_provider {
            active.voice_provider = Set(v);
        }
        if let Some(v) = self.language {
            active.language = Set(v);
        }
        if let Some(v) = self.timezone {
            active.timezone = Set(Some(v));
        }
        if let Some(v) = self.detect_caller_number {
            active.detect_caller_number = Set(v);
        }
        if let Some(v) = self.multilingual_support {
            active.multilingual_support = Set(v);
        }
        if let Some(v) = self.voice_recording {
            active.voice_recording = Set(v);
        }
        active
    }
}

/// Fill in the default template for any prompt field the caller omitted,
/// plus safe configure defaults.
pub fn with_defaults(name: String, description: Option<String>) -> NewAssistant {
    NewAssistant {
        name,
        description,
        first_message: Some(DEFAULT_FIRST_MESSAGE.to_string()),
        system_prompt: Some(DEFAULT_SYSTEM_PROMPT.to_string()),
        end_call_message: Some(DEFAULT_END_CALL_MESSAGE.to_string()),
        voice_name: None,
        elevenlabs_voice_id: None,
        voice_provider: "elevenlabs".to_string(),
        language: "English".to_string(),
        timezone: None,
        detect_caller_number: false,
        multilingual_support: false,
        voice_recording: false,
    }
}

pub struct AssistantService {
    repo: Repository,
}

impl AssistantService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    pub async fn create(
        &self,
        name: String,
        description: Option<String>,
    ) -> Result<models::Assistant, AppError> {
        let assistant = self.repo.create_assistant(with_defaults(name, description)).await?;
        tracing::info!(assistant_id = %assistant.id, "Assistant created");
        Ok(assistant)
    }

    pub async fn list(&self) -> Result<Vec<models::Assistant>, AppError> {
        Ok(self.repo.get_assistants().await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<models::Assistant, AppError> {
        self.repo
            .get_assistant(id)
            .await?
            .ok_or_else(|| AppError::not_found("Assistant", id))
    }

    pub async fn update(
        &self,
        id: Uuid,
        update: AssistantUpdate,
    ) -> Result<models::Assistant, AppError> {
        let assistant = self.get(id).await?;
        Ok(self.repo.save_assistant(update.apply(assistant)).await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_assistant(id).await? {
            return Err(AppError::not_found("Assistant", id));
        }
        Ok(())
    }

    /// Overwrite the prompt section. Fields omitted by the caller are
    /// cleared, matching the dedicated prompt editor's save semantics.
    pub async fn set_prompt(
        &self,
        id: Uuid,
        prompt: PromptUpdate,
    ) -> Result<models::Assistant, AppError> {
        let assistant = self.get(id).await?;
        let mut active: assistant::ActiveModel = assistant.into();
        active.first_message = Set(prompt.first_message);
        active.system_prompt = Set(prompt.system_prompt);
        active.end_call_message = Set(prompt.end_call_message);
        Ok(self.repo.save_assistant(active).await?)
    }

    pub async fn clear_prompt(&self, id: Uuid) -> Result<models::Assistant, AppError> {
        self.set_prompt(id, PromptUpdate::default()).await
    }

    pub async fn update_configure(
        &self,
        id: Uuid,
        update: ConfigureUpdate,
    ) -> Result<models::Assistant, AppError> {
        let assistant = self.get(id).await?;
        Ok(self.repo.save_assistant(update.apply(assistant)).await?)
    }

    /// Reset the voice/configure section to its defaults.
    pub async fn reset_configure(&self, id: Uuid) -> Result<models::Assistant, AppError> {
        let assistant = self.get(id).await?;
        let mut active: assistant::ActiveModel = assistant.into();
        active.voice_name = Set(None);
        active.elevenlabs_voice_id = Set(None);
        active.voice_provider = Set("elevenlabs".to_string());
        active.language = Set("English".to_string());
        active.timezone = Set(None);
        active.detect_caller_number = Set(false);
        active.multilingual_support = Set(false);
        active.voice_recording = Set(false);
        Ok(self.repo.save_assistant(active).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveValue;

    fn sample_assistant() -> models::Assistant {
        models::Assistant {
            id: Uuid::new_v4(),
            name: "Front desk".to_string(),
            description: Some("Reception assistant".to_string()),
            first_message: Some("hi".to_string()),
            system_prompt: Some("prompt".to_string()),
            end_call_message: Some("bye".to_string()),
            voice_name: Some("Rachel".to_string()),
            elevenlabs_voice_id: Some("voice-1".to_string()),
            voice_provider: "elevenlabs".to_string(),
            language: "English".to_string(),
            timezone: Some("Asia/Kolkata".to_string()),
            detect_caller_number: false,
            multilingual_support: false,
            voice_recording: false,
            created_at: chrono::Utc::now().into(),
        }
    }

    #[test]
    fn defaults_fill_prompt_template() {
        let new = with_defaults("Maya".to_string(), None);
        assert_eq!(new.system_prompt.as_deref(), Some(DEFAULT_SYSTEM_PROMPT));
        assert_eq!(new.first_message.as_deref(), Some(DEFAULT_FIRST_MESSAGE));
        assert_eq!(
            new.end_call_message.as_deref(),
            Some(DEFAULT_END_CALL_MESSAGE)
        );
        assert_eq!(new.language, "English");
        assert_eq!(new.voice_provider, "elevenlabs");
        assert!(!new.detect_caller_number);
    }

    #[test]
    fn update_merge_keeps_unset_fields() {
        let assistant = sample_assistant();
        let update = AssistantUpdate {
            name: Some("Back office".to_string()),
            description: None,
        };

        let active = update.apply(assistant);
        assert_eq!(active.name, ActiveValue::Set("Back office".to_string()));
        // Untouched fields stay Unchanged so the UPDATE does not rewrite them
        assert!(matches!(active.description, ActiveValue::Unchanged(_)));
    }

    #[test]
    fn configure_merge_only_touches_provided_fields() {
        let assistant = sample_assistant();
        let update = ConfigureUpdate {
            language: Some("Hindi".to_string()),
            multilingual_support: Some(true),
            ..Default::default()
        };

        let active = update.apply(assistant);
        assert_eq!(active.language, ActiveValue::Set("Hindi".to_string()));
        assert_eq!(active.multilingual_support, ActiveValue::Set(true));
        assert!(matches!(active.voice_name, ActiveValue::Unchanged(_)));
        assert!(matches!(active.timezone, ActiveValue::Unchanged(_)));
    }
}
