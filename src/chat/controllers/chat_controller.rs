use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info, warn};

use kb_client::ApiClient;
use kb_client::types::ChatRequest;

use crate::chat::models::{
    Chat, ChatsStore, ErrorKind, LocalFile, Message, NotificationStore, title_prefix,
};

/// Conversation id the startup history fetch seeds from.
pub const DEFAULT_CONVERSATION_ID: &str = "default";

/// Title of the chat seeded from server-side history.
const HISTORY_CHAT_TITLE: &str = "Conversation";

/// Context items requested per turn.
pub const DEFAULT_TOP_K: u32 = 8;

/// Page size of the startup history fetch.
const HISTORY_PAGE_LIMIT: u32 = 50;

/// Per-turn send options.
#[derive(Debug, Clone)]
pub struct SendOptions {
    pub include_context: bool,
    pub top_k: u32,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            include_context: true,
            top_k: DEFAULT_TOP_K,
        }
    }
}

/// Clears the in-flight flag on every exit path, unwinds included, so a
/// submission can never leave the controller stuck in the submitting state.
struct SubmitGuard<'a>(&'a AtomicBool);

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Orchestrates a user-submitted turn against the session store and the
/// backend, plus the one-time startup history seed.
///
/// The store commit of the user message happens before the round trip and
/// is never rolled back; reconciliation only ever appends further messages.
pub struct ChatController {
    client: ApiClient,
    store: Arc<Mutex<ChatsStore>>,
    notifications: Arc<NotificationStore>,
    options: SendOptions,
    submitting: AtomicBool,
    history_loaded: AtomicBool,
}

impl ChatController {
    pub fn new(
        client: ApiClient,
        store: Arc<Mutex<ChatsStore>>,
        notifications: Arc<NotificationStore>,
        options: SendOptions,
    ) -> Self {
        Self {
            client,
            store,
            notifications,
            options,
            submitting: AtomicBool::new(false),
            history_loaded: AtomicBool::new(false),
        }
    }

    /// The input-disabled signal: true while a round trip is in flight.
    /// Overlapping submissions are not blocked here; the store tolerates
    /// them, and the front end is expected to disable input meanwhile.
    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    pub fn store(&self) -> &Arc<Mutex<ChatsStore>> {
        &self.store
    }

    pub fn notifications(&self) -> &Arc<NotificationStore> {
        &self.notifications
    }

    /// Submit one turn: validate, ensure a current chat, append the user
    /// message, run the round trip, and reconcile the result.
    pub async fn submit(&self, content: &str, files: Vec<LocalFile>) {
        let content = content.trim();
        if content.is_empty() && files.is_empty() {
            debug!("Empty submission with no files, ignoring");
            return;
        }

        self.notifications.dismiss_all();

        let chat_id = {
            let mut store = self.store.lock();
            let existing = store.current_chat_id().map(str::to_string);
            let chat_id = match existing {
                Some(id) => id,
                None => {
                    // A files-only submission has no content to title from;
                    // the chat keeps the default placeholder.
                    let title = (!content.is_empty()).then(|| title_prefix(content));
                    store.create_chat(title).id().to_string()
                }
            };
            store.append_message(&chat_id, Message::user(content, files));
            chat_id
        };

        self.submitting.store(true, Ordering::SeqCst);
        let _guard = SubmitGuard(&self.submitting);

        let request = ChatRequest {
            message: content.to_string(),
            include_context: Some(self.options.include_context),
            top_k: Some(self.options.top_k),
            conversation_id: Some(chat_id.clone()),
        };

        debug!(chat_id = %chat_id, "Sending chat message");
        let reconciled = match self.client.send_chat(&request).await {
            Ok(response) => match (response.success, response.message) {
                (true, Some(text)) => Ok(Message::assistant(
                    text,
                    response.context_items,
                    response.context,
                    response.timestamp,
                )),
                _ => {
                    let reason = response
                        .error
                        .unwrap_or_else(|| "Failed to get response from AI".to_string());
                    Err((reason, ErrorKind::Application))
                }
            },
            Err(err) => {
                let kind = ErrorKind::from(&err);
                Err((err.to_string(), kind))
            }
        };

        match reconciled {
            Ok(message) => {
                info!(
                    chat_id = %chat_id,
                    context_count = message.context_items.as_ref().map(Vec::len),
                    "Assistant reply received"
                );
                self.store.lock().append_message(&chat_id, message);
            }
            Err((reason, kind)) => {
                error!(chat_id = %chat_id, reason = %reason, "Chat round trip failed");
                self.store
                    .lock()
                    .append_message(&chat_id, Message::assistant_error(&reason, kind));
                self.notifications.error(reason);
            }
        }
    }

    /// Fetch the first page of prior messages for the default conversation
    /// and seed the store from it. Runs at most once per process; later
    /// calls are no-ops.
    pub async fn load_initial_history(&self) {
        if self.history_loaded.swap(true, Ordering::SeqCst) {
            debug!("History already loaded, skipping");
            return;
        }

        info!("Loading conversation history");
        match self
            .client
            .history(HISTORY_PAGE_LIMIT, 0, Some(DEFAULT_CONVERSATION_ID))
            .await
        {
            Ok(response) if response.success && !response.messages.is_empty() => {
                let messages: Vec<Message> = response
                    .messages
                    .iter()
                    .enumerate()
                    .map(|(index, entry)| Message::from_history(index, entry))
                    .collect();
                info!(count = messages.len(), "Seeded conversation from history");
                self.store.lock().add_chat(Chat::from_history(
                    DEFAULT_CONVERSATION_ID,
                    HISTORY_CHAT_TITLE,
                    messages,
                ));
            }
            Ok(_) => {
                debug!("No prior history, starting fresh");
            }
            Err(err) => {
                // No chat exists yet to carry an error message, so this only
                // surfaces through the banner.
                warn!(error = %err, "Failed to load history");
                self.notifications.error(err.to_string());
            }
        }
    }
}
