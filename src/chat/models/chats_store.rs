use tracing::{debug, warn};

use kb_client::types::Role;

use super::chat::{Chat, DEFAULT_CHAT_TITLE, Message, title_prefix};

/// In-memory collection of chats plus the current selection.
///
/// All conversation state changes flow through these operations; chats are
/// kept in explicit insertion order with the newest at the front.
pub struct ChatsStore {
    chats: Vec<Chat>,
    current_chat_id: Option<String>,
}

impl ChatsStore {
    pub fn new() -> Self {
        Self {
            chats: Vec::new(),
            current_chat_id: None,
        }
    }

    /// Create a chat, insert it at the front, and make it current.
    pub fn create_chat(&mut self, initial_title: Option<String>) -> &Chat {
        let chat = Chat::new(initial_title);
        debug!(chat_id = %chat.id(), title = %chat.title(), "Created chat");
        self.current_chat_id = Some(chat.id().to_string());
        self.chats.insert(0, chat);
        &self.chats[0]
    }

    /// Insert a pre-built chat (history restore path). Becomes current when
    /// the store was empty.
    pub fn add_chat(&mut self, chat: Chat) {
        if self.current_chat_id.is_none() {
            self.current_chat_id = Some(chat.id().to_string());
        }
        self.chats.insert(0, chat);
    }

    /// Make a chat current. Unknown ids are a silent no-op.
    pub fn select_chat(&mut self, id: &str) -> bool {
        if self.chats.iter().any(|chat| chat.id() == id) {
            self.current_chat_id = Some(id.to_string());
            true
        } else {
            debug!(chat_id = %id, "Select ignored, chat does not exist");
            false
        }
    }

    /// Remove a chat. Deleting the current chat leaves no chat selected.
    pub fn delete_chat(&mut self, id: &str) -> bool {
        let before = self.chats.len();
        self.chats.retain(|chat| chat.id() != id);
        let removed = self.chats.len() < before;
        if removed && self.current_chat_id.as_deref() == Some(id) {
            self.current_chat_id = None;
        }
        removed
    }

    /// Append a message to a chat. The first user message appended to a
    /// still-untitled empty chat also names it.
    pub fn append_message(&mut self, chat_id: &str, message: Message) -> bool {
        let Some(chat) = self.chats.iter_mut().find(|chat| chat.id() == chat_id) else {
            warn!(chat_id = %chat_id, "Append ignored, chat does not exist");
            return false;
        };
        if chat.messages().is_empty()
            && chat.title() == DEFAULT_CHAT_TITLE
            && message.role == Role::User
            && !message.content.is_empty()
        {
            chat.set_title(title_prefix(&message.content));
        }
        chat.push_message(message);
        true
    }

    pub fn toggle_pin(&mut self, chat_id: &str) -> bool {
        let Some(chat) = self.chats.iter_mut().find(|chat| chat.id() == chat_id) else {
            return false;
        };
        chat.toggle_pin();
        true
    }

    pub fn chat(&self, id: &str) -> Option<&Chat> {
        self.chats.iter().find(|chat| chat.id() == id)
    }

    pub fn current_chat_id(&self) -> Option<&str> {
        self.current_chat_id.as_deref()
    }

    pub fn current_chat(&self) -> Option<&Chat> {
        let id = self.current_chat_id.as_deref()?;
        self.chat(id)
    }

    /// Chats for display: pinned first, relative order preserved inside
    /// each partition.
    pub fn listing(&self) -> Vec<&Chat> {
        self.chats
            .iter()
            .filter(|chat| chat.is_pinned())
            .chain(self.chats.iter().filter(|chat| !chat.is_pinned()))
            .collect()
    }

    pub fn count(&self) -> usize {
        self.chats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chats.is_empty()
    }
}

impl Default for ChatsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_chats(count: usize) -> (ChatsStore, Vec<String>) {
        let mut store = ChatsStore::new();
        let mut ids = Vec::new();
        for i in 0..count {
            ids.push(store.create_chat(Some(format!("chat {i}"))).id().to_string());
        }
        (store, ids)
    }

    #[test]
    fn test_create_chat_becomes_current_and_front() {
        let (store, ids) = store_with_chats(2);
        assert_eq!(store.current_chat_id(), Some(ids[1].as_str()));
        // Newest first
        assert_eq!(store.listing()[0].id(), ids[1]);
        assert_eq!(store.listing()[1].id(), ids[0]);
    }

    #[test]
    fn test_create_chat_defaults_title() {
        let mut store = ChatsStore::new();
        let chat = store.create_chat(None);
        assert_eq!(chat.title(), DEFAULT_CHAT_TITLE);
    }

    #[test]
    fn test_select_unknown_chat_is_noop() {
        let (mut store, ids) = store_with_chats(1);
        assert!(!store.select_chat("missing"));
        assert_eq!(store.current_chat_id(), Some(ids[0].as_str()));
    }

    #[test]
    fn test_delete_current_chat_clears_selection() {
        let (mut store, ids) = store_with_chats(2);
        assert!(store.delete_chat(&ids[1]));
        assert_eq!(store.current_chat_id(), None);
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_delete_other_chat_keeps_selection() {
        let (mut store, ids) = store_with_chats(2);
        assert!(store.delete_chat(&ids[0]));
        assert_eq!(store.current_chat_id(), Some(ids[1].as_str()));
    }

    #[test]
    fn test_delete_unknown_chat_reports_false() {
        let (mut store, _) = store_with_chats(1);
        assert!(!store.delete_chat("missing"));
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_first_user_message_titles_default_chat() {
        let mut store = ChatsStore::new();
        let id = store.create_chat(None).id().to_string();
        store.append_message(&id, Message::user("How does pinning work?", Vec::new()));
        assert_eq!(store.chat(&id).unwrap().title(), "How does pinning work?");
    }

    #[test]
    fn test_title_rewrite_truncates_to_fifty_chars() {
        let mut store = ChatsStore::new();
        let id = store.create_chat(None).id().to_string();
        let content = "x".repeat(80);
        store.append_message(&id, Message::user(content.clone(), Vec::new()));
        assert_eq!(store.chat(&id).unwrap().title(), &content[..50]);
    }

    #[test]
    fn test_custom_title_not_overwritten_by_first_message() {
        let mut store = ChatsStore::new();
        let id = store.create_chat(Some("Kept".to_string())).id().to_string();
        store.append_message(&id, Message::user("different", Vec::new()));
        assert_eq!(store.chat(&id).unwrap().title(), "Kept");
    }

    #[test]
    fn test_second_message_does_not_retitle() {
        let mut store = ChatsStore::new();
        let id = store.create_chat(None).id().to_string();
        store.append_message(&id, Message::user("first", Vec::new()));
        store.append_message(&id, Message::user("second", Vec::new()));
        assert_eq!(store.chat(&id).unwrap().title(), "first");
        assert_eq!(store.chat(&id).unwrap().message_count(), 2);
    }

    #[test]
    fn test_empty_content_keeps_default_title() {
        let mut store = ChatsStore::new();
        let id = store.create_chat(None).id().to_string();
        store.append_message(&id, Message::user("", Vec::new()));
        assert_eq!(store.chat(&id).unwrap().title(), DEFAULT_CHAT_TITLE);
    }

    #[test]
    fn test_append_to_unknown_chat_is_rejected() {
        let mut store = ChatsStore::new();
        assert!(!store.append_message("missing", Message::user("hi", Vec::new())));
        assert!(store.is_empty());
    }

    #[test]
    fn test_listing_partitions_pinned_first() {
        let (mut store, ids) = store_with_chats(3);
        // Insertion order in the listing is ids[2], ids[1], ids[0]
        store.toggle_pin(&ids[0]);
        let listing = store.listing();
        assert_eq!(listing[0].id(), ids[0]);
        assert_eq!(listing[1].id(), ids[2]);
        assert_eq!(listing[2].id(), ids[1]);
    }

    #[test]
    fn test_toggle_pin_round_trip() {
        let (mut store, ids) = store_with_chats(1);
        assert!(store.toggle_pin(&ids[0]));
        assert!(store.chat(&ids[0]).unwrap().is_pinned());
        assert!(store.toggle_pin(&ids[0]));
        assert!(!store.chat(&ids[0]).unwrap().is_pinned());
    }

    #[test]
    fn test_add_chat_sets_current_only_when_empty() {
        let mut store = ChatsStore::new();
        store.add_chat(Chat::from_history("default", "Conversation", Vec::new()));
        assert_eq!(store.current_chat_id(), Some("default"));

        store.add_chat(Chat::from_history("other", "Other", Vec::new()));
        assert_eq!(store.current_chat_id(), Some("default"));
    }
}
