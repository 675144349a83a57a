//! Interactive command-line front end.
//!
//! Bare input lines submit a chat turn; slash commands drive chat
//! management, file staging, and the backend probes. Rendering is plain
//! text only.

use anyhow::{Context, Result};
use std::io::Write as _;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use kb_client::ApiClient;
use kb_client::types::{Role, SearchRequest};

use crate::chat::controllers::ChatController;
use crate::chat::models::{
    AttachedFiles, Message, NotificationLevel, ObjectUrlRegistry, format_file_size,
};
use crate::chat::services::{
    DOWNLOAD_UNAVAILABLE, bucket_attachments, build_download_url, build_image_url,
};

const HELP: &str = "Commands:
  /new                start a new chat
  /list               list chats (pinned first)
  /select <n>         switch to chat <n> from /list
  /delete <n>         delete chat <n> from /list
  /pin <n>            pin or unpin chat <n> from /list
  /attach <path>      stage a file for the next message
  /detach <n>         unstage file <n> from /files
  /files              list staged files
  /clear-files        unstage everything
  /search <query>     search the knowledge base directly
  /clear-history      clear server-side history
  /health             backend health probe
  /config             backend configuration probe
  /help               show this help
  /quit               exit";

pub struct Repl {
    controller: Arc<ChatController>,
    client: ApiClient,
    attached: AttachedFiles,
    base_url: String,
    top_k: u32,
}

impl Repl {
    pub fn new(controller: Arc<ChatController>, client: ApiClient, top_k: u32) -> Self {
        let base_url = client.config().base_url().to_string();
        Self {
            controller,
            client,
            attached: AttachedFiles::new(Arc::new(ObjectUrlRegistry::new())),
            base_url,
            top_k,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        println!("kb-chat: type a message, or /help for commands.");
        self.print_banner();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            self.prompt()?;
            let Some(line) = lines.next_line().await.context("failed to read input")? else {
                break;
            };
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }

            if let Some(command) = line.strip_prefix('/') {
                if !self.handle_command(command).await? {
                    break;
                }
            } else {
                self.send(&line).await;
            }
            self.print_banner();
        }
        Ok(())
    }

    fn prompt(&self) -> Result<()> {
        let marker = if self.attached.is_empty() {
            String::new()
        } else {
            format!(" [{} file(s)]", self.attached.files().len())
        };
        print!("{marker}> ");
        std::io::stdout().flush().context("failed to flush stdout")
    }

    /// Print and dismiss pending banner notifications; showing them once is
    /// the CLI's dismissal gesture.
    fn print_banner(&self) {
        for notification in self.controller.notifications().active() {
            let prefix = match notification.level {
                NotificationLevel::Error => "error",
                NotificationLevel::Warning => "warning",
            };
            eprintln!("[{prefix}] {}", notification.message);
        }
        self.controller.notifications().dismiss_all();
    }

    async fn send(&mut self, content: &str) {
        let files = self.attached.take();
        self.controller.submit(content, files).await;

        let store = self.controller.store().lock();
        if let Some(message) = store
            .current_chat()
            .and_then(|chat| chat.messages().last())
            .filter(|message| message.role == Role::Assistant)
        {
            self.print_assistant_message(message);
        }
    }

    fn print_assistant_message(&self, message: &Message) {
        println!();
        println!("{}", message.content);

        let items = message.context_items.as_deref().unwrap_or_default();
        let buckets = bucket_attachments(items);

        if !buckets.images.is_empty() {
            println!("\nImages:");
            for attachment in &buckets.images {
                let url = build_image_url(
                    &self.base_url,
                    Some(&attachment.file_path),
                    Some(&attachment.file_name),
                );
                // Empty URL means unresolvable; the image is suppressed.
                if url.is_empty() {
                    continue;
                }
                match &attachment.parent_node_title {
                    Some(parent) => println!("  {} <{}> (from {})", attachment.file_name, url, parent),
                    None => println!("  {} <{}>", attachment.file_name, url),
                }
            }
        }

        if !buckets.files.is_empty() {
            println!("\nAttachments:");
            for attachment in &buckets.files {
                let url = build_download_url(
                    &self.base_url,
                    Some(&attachment.file_path),
                    Some(&attachment.file_name),
                );
                let kind = attachment.file_type.as_deref().unwrap_or("unknown");
                if url == DOWNLOAD_UNAVAILABLE {
                    println!("  {} ({kind}, not downloadable)", attachment.file_name);
                } else {
                    println!("  {} ({kind}) <{url}>", attachment.file_name);
                }
            }
        }
        println!();
    }

    async fn handle_command(&mut self, command: &str) -> Result<bool> {
        let (name, rest) = match command.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (command, ""),
        };
        debug!(command = %name, "REPL command");

        match name {
            "quit" | "exit" => return Ok(false),
            "help" => println!("{HELP}"),
            "new" => {
                let mut store = self.controller.store().lock();
                let chat = store.create_chat(None);
                println!("Started chat {}", chat.id());
            }
            "list" => self.list_chats(),
            "select" => {
                if let Some(id) = self.chat_id_at(rest) {
                    self.controller.store().lock().select_chat(&id);
                    println!("Switched to chat {id}");
                }
            }
            "delete" => {
                if let Some(id) = self.chat_id_at(rest) {
                    self.controller.store().lock().delete_chat(&id);
                    println!("Deleted chat {id}");
                }
            }
            "pin" => {
                if let Some(id) = self.chat_id_at(rest) {
                    self.controller.store().lock().toggle_pin(&id);
                }
            }
            "attach" => self.attach(rest),
            "detach" => self.detach(rest),
            "files" => self.list_files(),
            "clear-files" => {
                self.attached.clear();
                println!("Cleared staged files");
            }
            "search" => self.search(rest).await,
            "clear-history" => match self.client.clear_history().await {
                Ok(response) => println!("{}", response.message),
                Err(err) => eprintln!("[error] {err}"),
            },
            "health" => match self.client.health().await {
                Ok(health) => println!(
                    "status: {:?}, version {}, database: {}, llm: {}",
                    health.status,
                    health.version,
                    if health.database_connected { "up" } else { "down" },
                    if health.llm_configured { "configured" } else { "missing" },
                ),
                Err(err) => eprintln!("[error] {err}"),
            },
            "config" => match self.client.server_config().await {
                Ok(value) => println!("{value:#}"),
                Err(err) => eprintln!("[error] {err}"),
            },
            _ => println!("Unknown command /{name}, try /help"),
        }
        Ok(true)
    }

    fn list_chats(&self) {
        let store = self.controller.store().lock();
        if store.is_empty() {
            println!("No chats yet.");
            return;
        }
        let current = store.current_chat_id().map(str::to_string);
        for (index, chat) in store.listing().iter().enumerate() {
            let pin = if chat.is_pinned() { "*" } else { " " };
            let active = if current.as_deref() == Some(chat.id()) {
                ">"
            } else {
                " "
            };
            println!(
                "{active}{pin} {}. {} ({} messages)",
                index + 1,
                chat.title(),
                chat.message_count()
            );
        }
    }

    /// Resolve a 1-based /list index to a chat id.
    fn chat_id_at(&self, argument: &str) -> Option<String> {
        let index: usize = match argument.parse() {
            Ok(index) => index,
            Err(_) => {
                println!("Expected a chat number from /list");
                return None;
            }
        };
        let store = self.controller.store().lock();
        let listing = store.listing();
        match index.checked_sub(1).and_then(|i| listing.get(i)) {
            Some(chat) => Some(chat.id().to_string()),
            None => {
                println!("No chat {index}");
                None
            }
        }
    }

    fn attach(&mut self, argument: &str) {
        if argument.is_empty() {
            println!("Usage: /attach <path>");
            return;
        }
        let path = Path::new(argument);
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().to_string()) else {
            println!("Not a file path: {argument}");
            return;
        };
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                println!("Cannot read {argument}: {err}");
                return;
            }
        };
        match self.attached.stage(&name, bytes) {
            Ok(file) => println!("Staged {} ({})", file.name, format_file_size(file.size)),
            Err(err) => println!("Rejected {name}: {err}"),
        }
    }

    fn detach(&mut self, argument: &str) {
        let Ok(index) = argument.parse::<usize>() else {
            println!("Expected a file number from /files");
            return;
        };
        let id = match index
            .checked_sub(1)
            .and_then(|i| self.attached.files().get(i))
        {
            Some(file) => file.id.clone(),
            None => {
                println!("No staged file {index}");
                return;
            }
        };
        self.attached.remove(&id);
        println!("Unstaged file {index}");
    }

    fn list_files(&self) {
        if self.attached.is_empty() {
            println!("No files staged.");
            return;
        }
        for (index, file) in self.attached.files().iter().enumerate() {
            println!(
                "{}. {} ({}, {})",
                index + 1,
                file.name,
                file.mime,
                format_file_size(file.size)
            );
        }
    }

    async fn search(&self, query: &str) {
        if query.is_empty() {
            println!("Usage: /search <query>");
            return;
        }
        let request = SearchRequest {
            query: query.to_string(),
            top_k: Some(self.top_k),
        };
        match self.client.search(&request).await {
            Ok(response) => {
                println!("{} result(s):", response.count);
                for item in &response.results {
                    match item.similarity {
                        Some(similarity) => {
                            println!("  {} [{}] ({similarity:.2})", item.title, item.node_type)
                        }
                        None => println!("  {} [{}]", item.title, item.node_type),
                    }
                }
            }
            Err(err) => eprintln!("[error] {err}"),
        }
    }
}
