pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use application::{
    CompletionProvider, CompletionStream, RelayChatUseCase, RequestMetadata,
    ValidateRequestUseCase, MISSING_CREDENTIAL_MESSAGE,
};

pub use cli::Commands;

pub use connector::{
    build_router, ApiError, Container, ContainerConfig, GroqClient, MockCompletion, SseDecoder,
    FORBIDDEN_MESSAGE,
};

pub use domain::{
    build_system_prompt, hardened_directives, BotProfile, ChatMessage, CompletionChunk,
    CompletionRequest, CompletionSettings, ContentFragment, ConversationRequest, DomainError,
    FinishReason, MessageContent, OriginAllowList, ReasoningFormat, Role, SystemPromptVariant,
    TokenUsage, SECURITY_HEADING, UNKNOWN_ERROR_MESSAGE,
};
