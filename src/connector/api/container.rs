use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::application::{CompletionProvider, RelayChatUseCase, ValidateRequestUseCase};
use crate::connector::adapter::{GroqClient, MockCompletion, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::domain::OriginAllowList;

/// Process configuration, read once at start.
#[derive(Debug, Clone)]
pub struct ContainerConfig {
    /// Provider credential (`GROQ_API_KEY`). Empty values count as absent.
    pub api_key: Option<String>,
    /// Provider API root (`GROQ_BASE_URL`).
    pub base_url: String,
    /// Comma-separated allowed site origins (`SITE_URL`, falling back to
    /// `NEXT_PUBLIC_SITE_URL`).
    pub site_urls: Option<String>,
    /// Deployment platform host name (`VERCEL_URL`), allowed over https.
    pub deployment_host: Option<String>,
    /// Serve replies from the scripted in-process provider instead of Groq.
    pub mock_provider: bool,
    /// Ceiling on the wall-clock duration of one chat call.
    pub max_duration: Duration,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            site_urls: None,
            deployment_host: None,
            mock_provider: false,
            max_duration: DEFAULT_TIMEOUT,
        }
    }
}

impl ContainerConfig {
    /// Read configuration from the environment:
    ///
    /// | Variable        | Default                        |
    /// |-----------------|--------------------------------|
    /// | `GROQ_API_KEY`  | none (chat calls fail with 500) |
    /// | `GROQ_BASE_URL` | `https://api.groq.com/openai`  |
    /// | `SITE_URL`      | `NEXT_PUBLIC_SITE_URL`, else none |
    /// | `VERCEL_URL`    | none                           |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] but reading from an arbitrary source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            api_key: non_empty("GROQ_API_KEY"),
            base_url: non_empty("GROQ_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            site_urls: non_empty("SITE_URL").or_else(|| non_empty("NEXT_PUBLIC_SITE_URL")),
            deployment_host: non_empty("VERCEL_URL"),
            ..Self::default()
        }
    }
}

pub struct Container {
    provider: Arc<dyn CompletionProvider>,
    allowed_origins: Arc<OriginAllowList>,
    config: ContainerConfig,
}

impl Container {
    pub fn new(config: ContainerConfig) -> Self {
        let provider: Arc<dyn CompletionProvider> = if config.mock_provider {
            info!("Using mock completion provider");
            Arc::new(MockCompletion::new().with_chunk_delay(Duration::from_millis(40)))
        } else {
            debug!("Using Groq completion provider at {}", config.base_url);
            Arc::new(GroqClient::with_timeout(
                config.api_key.clone().unwrap_or_default(),
                config.base_url.clone(),
                config.max_duration,
            ))
        };

        Self::with_provider(config, provider)
    }

    /// Wire an explicit provider, bypassing the one `config` would select.
    pub fn with_provider(config: ContainerConfig, provider: Arc<dyn CompletionProvider>) -> Self {
        let allowed_origins = Arc::new(OriginAllowList::from_settings(
            config.site_urls.as_deref(),
            config.deployment_host.as_deref(),
        ));
        debug!("Allowed origins: {:?}", allowed_origins.origins());

        Self {
            provider,
            allowed_origins,
            config,
        }
    }

    pub fn validate_use_case(&self) -> ValidateRequestUseCase {
        ValidateRequestUseCase::new(self.allowed_origins.clone())
    }

    pub fn relay_use_case(&self) -> RelayChatUseCase {
        RelayChatUseCase::new(self.provider.clone(), self.credential_present())
    }

    /// The mock provider needs no credential.
    pub fn credential_present(&self) -> bool {
        self.config.mock_provider || self.config.api_key.is_some()
    }

    pub fn allowed_origins(&self) -> &OriginAllowList {
        &self.allowed_origins
    }

    pub fn max_duration(&self) -> Duration {
        self.config.max_duration
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}
