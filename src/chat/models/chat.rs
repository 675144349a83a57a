use chrono::{DateTime, Utc};
use uuid::Uuid;

use kb_client::ApiError;
use kb_client::types::{ContextItem, HistoryMessage, Role};

use super::attached_files::LocalFile;

/// Placeholder title a chat carries until its first user message names it.
pub const DEFAULT_CHAT_TITLE: &str = "New Chat";

/// Number of characters of the first user message promoted into the title.
pub const TITLE_PREFIX_LEN: usize = 50;

/// Char-safe prefix of a message used as a chat title.
pub fn title_prefix(content: &str) -> String {
    content.chars().take(TITLE_PREFIX_LEN).collect()
}

/// Broad category of a failed turn, carried on the error message itself so
/// renderers branch on structured state instead of sniffing content strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Timeout,
    Transport,
    Server,
    Application,
}

impl From<&ApiError> for ErrorKind {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::Timeout => ErrorKind::Timeout,
            ApiError::Transport(_) => ErrorKind::Transport,
            ApiError::Server { .. } => ErrorKind::Server,
            ApiError::Application(_) => ErrorKind::Application,
        }
    }
}

/// One turn in a chat.
///
/// Immutable once appended: a failed round trip appends a new
/// assistant-role error message instead of editing the user's message.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    /// Files the user staged with this message (empty for assistant turns).
    pub attached_files: Vec<LocalFile>,
    /// Retrieval evidence, kept verbatim as the backend returned it.
    pub context_items: Option<Vec<ContextItem>>,
    pub raw_context: Option<String>,
    pub timestamp: String,
    pub error_kind: Option<ErrorKind>,
}

impl Message {
    pub fn user(content: impl Into<String>, attached_files: Vec<LocalFile>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::User,
            content: content.into(),
            attached_files,
            context_items: None,
            raw_context: None,
            timestamp: Utc::now().to_rfc3339(),
            error_kind: None,
        }
    }

    pub fn assistant(
        content: impl Into<String>,
        context_items: Option<Vec<ContextItem>>,
        raw_context: Option<String>,
        timestamp: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::Assistant,
            content: content.into(),
            attached_files: Vec::new(),
            context_items,
            raw_context,
            timestamp,
            error_kind: None,
        }
    }

    /// Assistant-role message standing in for a failed round trip.
    pub fn assistant_error(reason: &str, kind: ErrorKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::Assistant,
            content: format!("Error: {reason}"),
            attached_files: Vec::new(),
            context_items: None,
            raw_context: None,
            timestamp: Utc::now().to_rfc3339(),
            error_kind: Some(kind),
        }
    }

    /// Translate one history entry. History ids are the entry's index;
    /// entries carry only summary counts, so no context items attach.
    pub fn from_history(index: usize, entry: &HistoryMessage) -> Self {
        Self {
            id: index.to_string(),
            role: entry.role,
            content: entry.content.clone(),
            attached_files: Vec::new(),
            context_items: None,
            raw_context: None,
            timestamp: entry.timestamp.clone(),
            error_kind: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error_kind.is_some()
    }
}

/// One conversation thread: an identity, a title, and an ordered message
/// sequence. Owned exclusively by the store; mutation goes through it.
#[derive(Debug, Clone)]
pub struct Chat {
    id: String,
    title: String,
    created_at: DateTime<Utc>,
    is_pinned: bool,
    messages: Vec<Message>,
}

impl Chat {
    pub(crate) fn new(initial_title: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: initial_title.unwrap_or_else(|| DEFAULT_CHAT_TITLE.to_string()),
            created_at: Utc::now(),
            is_pinned: false,
            messages: Vec::new(),
        }
    }

    /// Rebuild a chat from prior server-side history, with a caller-chosen
    /// id instead of a generated one.
    pub(crate) fn from_history(
        id: impl Into<String>,
        title: impl Into<String>,
        messages: Vec<Message>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            created_at: Utc::now(),
            is_pinned: false,
            messages,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_pinned(&self) -> bool {
        self.is_pinned
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub(crate) fn set_title(&mut self, title: String) {
        self.title = title;
    }

    pub(crate) fn toggle_pin(&mut self) {
        self.is_pinned = !self.is_pinned;
    }

    pub(crate) fn push_message(&mut self, message: Message) {
        self.messages.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_prefix_is_char_safe() {
        let content = "ü".repeat(60);
        let title = title_prefix(&content);
        assert_eq!(title.chars().count(), TITLE_PREFIX_LEN);
        assert_eq!(title, "ü".repeat(TITLE_PREFIX_LEN));
    }

    #[test]
    fn test_title_prefix_short_content_unchanged() {
        assert_eq!(title_prefix("Hello"), "Hello");
    }

    #[test]
    fn test_assistant_error_carries_kind_and_prefix() {
        let message = Message::assistant_error("Request timeout", ErrorKind::Timeout);
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.content, "Error: Request timeout");
        assert_eq!(message.error_kind, Some(ErrorKind::Timeout));
        assert!(message.is_error());
    }

    #[test]
    fn test_from_history_uses_index_as_id() {
        let entry = HistoryMessage {
            role: Role::Assistant,
            content: "hello".to_string(),
            timestamp: "T".to_string(),
            context_count: Some(2),
        };
        let message = Message::from_history(3, &entry);
        assert_eq!(message.id, "3");
        assert_eq!(message.role, Role::Assistant);
        assert!(message.context_items.is_none());
    }

    #[test]
    fn test_error_kind_from_api_error() {
        assert_eq!(ErrorKind::from(&ApiError::Timeout), ErrorKind::Timeout);
        assert_eq!(
            ErrorKind::from(&ApiError::Server {
                status: 500,
                body: String::new()
            }),
            ErrorKind::Server
        );
        assert_eq!(
            ErrorKind::from(&ApiError::Application("x".to_string())),
            ErrorKind::Application
        );
    }
}
