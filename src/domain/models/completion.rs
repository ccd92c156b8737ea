use serde::{Deserialize, Serialize};

use super::ChatMessage;

pub const MODEL_NAME: &str = "deepseek-r1-distill-llama-70b";
pub const TEMPERATURE: f32 = 0.3;
pub const MAX_TOKENS: u32 = 1000;

/// How the provider should treat the model's reasoning tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningFormat {
    /// Reasoning is stripped from the output stream.
    #[default]
    Hidden,
    Raw,
    Parsed,
}

impl ReasoningFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasoningFormat::Hidden => "hidden",
            ReasoningFormat::Raw => "raw",
            ReasoningFormat::Parsed => "parsed",
        }
    }
}

/// Sampling options applied to every completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub reasoning_format: ReasoningFormat,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            model: MODEL_NAME.to_string(),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            reasoning_format: ReasoningFormat::Hidden,
        }
    }
}

/// Everything the provider needs for one streamed completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub system_prompt: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub reasoning_format: ReasoningFormat,
}

impl CompletionRequest {
    pub fn new(
        settings: &CompletionSettings,
        system_prompt: String,
        messages: Vec<ChatMessage>,
    ) -> Self {
        Self {
            model: settings.model.clone(),
            system_prompt,
            messages,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            reasoning_format: settings.reasoning_format,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FinishReason {
    #[default]
    Stop,
    Length,
    ContentFilter,
    Error,
    Other,
}

impl FinishReason {
    /// Map an OpenAI-style `finish_reason` string.
    pub fn from_provider(reason: &str) -> Self {
        match reason {
            "stop" => FinishReason::Stop,
            "length" => FinishReason::Length,
            "content_filter" => FinishReason::ContentFilter,
            _ => FinishReason::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// One item of a provider stream.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionChunk {
    Text(String),
    Finish {
        reason: FinishReason,
        usage: Option<TokenUsage>,
    },
}

impl CompletionChunk {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn stop() -> Self {
        Self::Finish {
            reason: FinishReason::Stop,
            usage: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_match_relay_constants() {
        let settings = CompletionSettings::default();
        assert_eq!(settings.model, "deepseek-r1-distill-llama-70b");
        assert_eq!(settings.temperature, 0.3);
        assert_eq!(settings.max_tokens, 1000);
        assert_eq!(settings.reasoning_format, ReasoningFormat::Hidden);
    }

    #[test]
    fn finish_reason_maps_provider_strings() {
        assert_eq!(FinishReason::from_provider("stop"), FinishReason::Stop);
        assert_eq!(FinishReason::from_provider("length"), FinishReason::Length);
        assert_eq!(
            FinishReason::from_provider("content_filter"),
            FinishReason::ContentFilter
        );
        assert_eq!(FinishReason::from_provider("tool_calls"), FinishReason::Other);
    }
}
