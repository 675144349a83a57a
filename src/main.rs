use clap::Parser;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

mod chat;
mod cli;

use chat::controllers::{ChatController, DEFAULT_TOP_K, SendOptions};
use chat::models::{ChatsStore, NotificationStore};
use cli::Repl;
use kb_client::{ApiClient, ApiConfig};

/// How many banner notifications are kept before the oldest is evicted.
const MAX_NOTIFICATIONS: usize = 100;

/// Command-line client for the knowledge-base chat backend.
#[derive(Debug, Parser)]
#[command(name = "kb-chat", version, about)]
struct Args {
    /// Backend origin, e.g. https://kb-chat.example.com
    #[arg(long, env = "KB_CHAT_BASE_URL")]
    base_url: Option<String>,

    /// Number of context items to request per turn
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    top_k: u32,

    /// Disable knowledge-base context retrieval
    #[arg(long)]
    no_context: bool,
}

fn main() -> anyhow::Result<()> {
    // Initialize structured logging. Logs go to stderr so they never
    // interleave with the REPL on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.base_url {
        Some(url) => ApiConfig::new(url),
        None => ApiConfig::from_env(),
    };
    info!(base_url = %config.base_url(), "Starting kb-chat");

    let client = ApiClient::new(config)?;
    let store = Arc::new(Mutex::new(ChatsStore::new()));
    let notifications = Arc::new(NotificationStore::new(MAX_NOTIFICATIONS));
    let options = SendOptions {
        include_context: !args.no_context,
        top_k: args.top_k,
    };
    let controller = Arc::new(ChatController::new(
        client.clone(),
        store,
        notifications,
        options,
    ));

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        controller.load_initial_history().await;
        Repl::new(controller, client, args.top_k).run().await
    })
}
