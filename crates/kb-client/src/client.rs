use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::config::{ApiConfig, REQUEST_TIMEOUT};
use crate::error::{ApiError, ApiResult};
use crate::types::{
    ChatRequest, ChatResponse, ClearHistoryResponse, HealthResponse, HistoryResponse,
    SearchRequest, SearchResponse,
};

/// HTTP client for the knowledge-base chat backend.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> ApiResult<Self> {
        Self::with_timeout(config, REQUEST_TIMEOUT)
    }

    /// Build a client with a custom timeout. Production code uses
    /// [`REQUEST_TIMEOUT`]; tests shorten it to keep timeout paths fast.
    pub fn with_timeout(config: ApiConfig, timeout: Duration) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Transport)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Send one chat turn and return the assistant's reply payload.
    pub async fn send_chat(&self, request: &ChatRequest) -> ApiResult<ChatResponse> {
        debug!(
            message_len = request.message.len(),
            conversation_id = ?request.conversation_id,
            "POST /api/chat"
        );
        self.execute(self.http.post(self.config.chat_url()).json(request))
            .await
    }

    /// Fetch a page of prior messages for a conversation.
    pub async fn history(
        &self,
        limit: u32,
        offset: u32,
        conversation_id: Option<&str>,
    ) -> ApiResult<HistoryResponse> {
        let mut query: Vec<(&str, String)> =
            vec![("limit", limit.to_string()), ("offset", offset.to_string())];
        if let Some(id) = conversation_id {
            query.push(("conversation_id", id.to_string()));
        }
        debug!(limit, offset, conversation_id = ?conversation_id, "GET /api/history");
        self.execute(self.http.get(self.config.history_url()).query(&query))
            .await
    }

    /// Clear the server-side conversation history.
    pub async fn clear_history(&self) -> ApiResult<ClearHistoryResponse> {
        debug!("POST /api/clear-history");
        self.execute(self.http.post(self.config.clear_history_url()))
            .await
    }

    /// Search the knowledge base directly, without a chat turn.
    pub async fn search(&self, request: &SearchRequest) -> ApiResult<SearchResponse> {
        debug!(query = %request.query, top_k = ?request.top_k, "POST /api/search");
        self.execute(self.http.post(self.config.search_url()).json(request))
            .await
    }

    pub async fn health(&self) -> ApiResult<HealthResponse> {
        debug!("GET /health");
        self.execute(self.http.get(self.config.health_url())).await
    }

    /// Backend configuration probe. The payload is deployment-specific, so
    /// it is returned as raw JSON.
    pub async fn server_config(&self) -> ApiResult<serde_json::Value> {
        debug!("GET /config");
        self.execute(self.http.get(self.config.config_url())).await
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = request
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body = if body.is_empty() {
                status.canonical_reason().unwrap_or("Unknown error").to_string()
            } else {
                body
            };
            return Err(ApiError::Server {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|err| ApiError::Application(format!("Invalid response body: {err}")))
    }
}
