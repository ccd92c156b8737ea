use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One piece of a structured message body.
///
/// Browser chat clients disagree on the field name, so both `text` and
/// `content` are accepted. Any other field (`type`, ids) is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentFragment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl ContentFragment {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            content: None,
        }
    }

    /// The non-empty text this fragment carries, `text` taking precedence
    /// over `content`.
    pub fn as_text(&self) -> Option<&str> {
        [self.text.as_deref(), self.content.as_deref()]
            .into_iter()
            .flatten()
            .find(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Fragments(Vec<ContentFragment>),
}

/// A single turn of the conversation as sent by the browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<ContentFragment>>,
}

impl ChatMessage {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(MessageContent::Text(text.into())),
            parts: None,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    pub fn with_fragments(role: Role, fragments: Vec<ContentFragment>) -> Self {
        Self {
            role,
            content: Some(MessageContent::Fragments(fragments)),
            parts: None,
        }
    }

    /// First non-empty text field: plain `content`, then the first fragment
    /// of `content`, then the first entry of `parts`.
    pub fn primary_text(&self) -> &str {
        let from_content = match &self.content {
            Some(MessageContent::Text(text)) if !text.is_empty() => Some(text.as_str()),
            Some(MessageContent::Text(_)) => None,
            Some(MessageContent::Fragments(fragments)) => {
                fragments.iter().find_map(ContentFragment::as_text)
            }
            None => None,
        };

        from_content
            .or_else(|| {
                self.parts
                    .as_ref()
                    .and_then(|parts| parts.iter().find_map(ContentFragment::as_text))
            })
            .unwrap_or_default()
    }

    /// Whole message body flattened to text, as forwarded to the provider.
    ///
    /// Fragments are concatenated in order; `parts` is only consulted when
    /// `content` carries nothing.
    pub fn full_text(&self) -> String {
        let joined = |fragments: &[ContentFragment]| -> String {
            fragments.iter().filter_map(ContentFragment::as_text).collect()
        };

        let from_content = match &self.content {
            Some(MessageContent::Text(text)) => text.clone(),
            Some(MessageContent::Fragments(fragments)) => joined(fragments),
            None => String::new(),
        };

        if !from_content.is_empty() {
            return from_content;
        }

        self.parts.as_deref().map(joined).unwrap_or_default()
    }
}
