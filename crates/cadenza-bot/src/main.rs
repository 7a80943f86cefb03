use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cadenza_core::engine::ConversationEngine;
use cadenza_core::session::InMemorySessionStore;
use cadenza_resolver::YtDlpResolver;
use cadenza_telegram::{TelegramClient, decode_update};

use crate::config::Config;
use crate::dispatch::Dispatcher;

mod config;
mod dispatch;

#[derive(Parser)]
#[command(name = "cadenza")]
#[command(about = "Cadenza - a chat assistant that searches and downloads media", long_about = None)]
struct Cli {
    /// Staging directory for downloads (overrides CADENZA_DOWNLOAD_DIR)
    #[arg(long)]
    download_dir: Option<PathBuf>,

    /// Maximum number of search results offered (overrides CADENZA_SEARCH_LIMIT)
    #[arg(long)]
    search_limit: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::try_from_env()?;
    if let Some(download_dir) = cli.download_dir {
        config.download_dir = download_dir;
    }
    if let Some(search_limit) = cli.search_limit {
        config.search_limit = search_limit;
    }

    let resolver = YtDlpResolver::new(
        &config.download_dir,
        Duration::from_secs(config.download_timeout_secs),
    )
    .await?;
    let store = Arc::new(InMemorySessionStore::new());
    let engine = Arc::new(ConversationEngine::new(
        store,
        Arc::new(resolver),
        config.search_limit,
    ));
    let client = Arc::new(TelegramClient::new(&config.telegram_token));
    let dispatcher = Arc::new(Dispatcher::new(engine, client.clone()));

    info!(
        download_dir = %config.download_dir.display(),
        search_limit = config.search_limit,
        "cadenza started, waiting for /start"
    );
    poll_loop(client, dispatcher, config.poll_timeout_secs).await
}

/// Long-polls the transport and feeds decoded events to the dispatcher.
/// Poll failures back off and retry; the loop itself never exits.
async fn poll_loop(
    client: Arc<TelegramClient>,
    dispatcher: Arc<Dispatcher>,
    poll_timeout_secs: u64,
) -> Result<()> {
    let mut offset = 0i64;
    loop {
        match client.get_updates(offset, poll_timeout_secs).await {
            Ok(updates) => {
                for update in updates {
                    offset = offset.max(update.update_id + 1);
                    if let Some(inbound) = decode_update(&update) {
                        dispatcher.dispatch(inbound).await;
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, "polling for updates failed, backing off");
                tokio::time::sleep(Duration::from_secs(3)).await;
            }
        }
    }
}
