use serde::{Deserialize, Serialize};

use super::ChatMessage;
use crate::domain::DomainError;

/// Body of a `POST /api/chat` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRequest {
    messages: Vec<ChatMessage>,
    /// Absent or `null` means protection is on.
    #[serde(
        rename = "isPromptInjectionProtectionEnabled",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    protection_enabled: Option<bool>,
}

impl ConversationRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            protection_enabled: None,
        }
    }

    pub fn with_protection(mut self, enabled: bool) -> Self {
        self.protection_enabled = Some(enabled);
        self
    }

    /// Parse a raw request body.
    pub fn from_json(body: &[u8]) -> Result<Self, DomainError> {
        serde_json::from_slice(body)
            .map_err(|e| DomainError::invalid_input(format!("Malformed chat request: {e}")))
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<ChatMessage> {
        self.messages
    }

    pub fn protection_enabled(&self) -> bool {
        self.protection_enabled.unwrap_or(true)
    }

    pub fn latest_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn latest_text(&self) -> &str {
        self.latest_message()
            .map(ChatMessage::primary_text)
            .unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.messages.is_empty() {
            return Err(DomainError::invalid_input(
                "Chat request must contain at least one message",
            ));
        }
        Ok(())
    }
}
