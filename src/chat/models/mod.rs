pub mod attached_files;
pub mod chat;
pub mod chats_store;
pub mod notification_store;

pub use attached_files::{AttachedFiles, LocalFile, ObjectUrlRegistry, format_file_size};
pub use chat::{Chat, DEFAULT_CHAT_TITLE, ErrorKind, Message, TITLE_PREFIX_LEN, title_prefix};
pub use chats_store::ChatsStore;
pub use notification_store::{Notification, NotificationLevel, NotificationStore};
