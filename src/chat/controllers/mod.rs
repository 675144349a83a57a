pub mod chat_controller;

pub use chat_controller::{ChatController, DEFAULT_CONVERSATION_ID, DEFAULT_TOP_K, SendOptions};
