use std::time::Duration;

/// Default backend origin. Override with the `KB_CHAT_BASE_URL` environment
/// variable or an explicit [`ApiConfig::new`].
pub const DEFAULT_BASE_URL: &str = "https://kb-chat.azurewebsites.net";

/// Client-enforced timeout for every request; a request that exceeds it is
/// abandoned and reported as [`crate::ApiError::Timeout`].
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Backend origin plus derived endpoint URLs.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    base_url: String,
}

impl ApiConfig {
    /// Build a config from an explicit origin. Trailing slashes are trimmed
    /// so endpoint concatenation always yields single-slash URLs.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    /// Resolve the origin from `KB_CHAT_BASE_URL`, falling back to
    /// [`DEFAULT_BASE_URL`] when unset or blank.
    pub fn from_env() -> Self {
        match std::env::var("KB_CHAT_BASE_URL") {
            Ok(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => Self::new(DEFAULT_BASE_URL),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }

    pub fn history_url(&self) -> String {
        format!("{}/api/history", self.base_url)
    }

    pub fn clear_history_url(&self) -> String {
        format!("{}/api/clear-history", self.base_url)
    }

    pub fn search_url(&self) -> String {
        format!("{}/api/search", self.base_url)
    }

    pub fn health_url(&self) -> String {
        format!("{}/health", self.base_url)
    }

    pub fn config_url(&self) -> String {
        format!("{}/config", self.base_url)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
