//! Wire types for the backend REST API.
//!
//! Field names match the JSON payloads one to one; everything optional on
//! the wire is optional here so responses from older backend revisions still
//! deserialize.

use serde::{Deserialize, Serialize};

/// Message author role as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Request body for `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_context: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

/// Request body for `POST /api/search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
}

/// A file associated with a retrieved knowledge-base node.
///
/// `parent_node_title`/`parent_node_type` are usually absent on the wire and
/// filled in client-side from the owning context item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(default)]
    pub file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_node_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_node_type: Option<String>,
}

/// A knowledge-base node returned as retrieval evidence for an answer.
/// Read-only once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextItem {
    pub id: String,
    pub title: String,
    pub node_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
}

/// Response body for `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_items: Option<Vec<ContextItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

/// One prior turn from `GET /api/history`. History entries carry only
/// summary counts, not the full context items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_count: Option<u32>,
}

/// Response body for `GET /api/history`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub messages: Vec<HistoryMessage>,
    pub total: u64,
    pub timestamp: String,
}

/// Response body for `POST /api/search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub success: bool,
    pub results: Vec<ContextItem>,
    pub count: u32,
    pub timestamp: String,
}

/// Response body for `POST /api/clear-history`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearHistoryResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub database_connected: bool,
    pub llm_configured: bool,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_omits_unset_fields() {
        let request = ChatRequest {
            message: "hello".to_string(),
            include_context: None,
            top_k: None,
            conversation_id: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({ "message": "hello" }));
    }

    #[test]
    fn test_chat_response_minimal_payload() {
        let json = r#"{"success": false, "error": "boom", "timestamp": "T"}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("boom"));
        assert!(response.message.is_none());
        assert!(response.context_items.is_none());
    }

    #[test]
    fn test_attachment_tolerates_missing_path() {
        let json = r#"{"id": "a1", "file_name": "doc.pdf"}"#;
        let attachment: Attachment = serde_json::from_str(json).unwrap();
        assert_eq!(attachment.file_path, "");
        assert!(attachment.file_type.is_none());
    }

    #[test]
    fn test_role_wire_format() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), r#""user""#);
        assert_eq!(
            serde_json::from_str::<Role>(r#""assistant""#).unwrap(),
            Role::Assistant
        );
    }

    #[test]
    fn test_context_item_round_trip() {
        let json = serde_json::json!({
            "id": "f1b0ce0c",
            "title": "Trust",
            "node_type": "value",
            "similarity": 0.87,
            "attachments": [
                {
                    "id": "53205fd8",
                    "file_name": "trust.png",
                    "file_type": "image/png",
                    "file_path": "uploads/48372c35_trust.png"
                }
            ]
        });
        let item: ContextItem = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(item.node_type, "value");
        assert_eq!(item.attachments.as_ref().unwrap().len(), 1);
        assert_eq!(serde_json::to_value(&item).unwrap(), json);
    }
}
