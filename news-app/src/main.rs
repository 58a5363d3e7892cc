mod command;
mod render;

use std::sync::Arc;

use news_core::{
    spawn_controller, AppConfig, FeedController, FeedData, FeedEvent, FeedFetcher, FileStore,
    NewsApiClient, SharedStore,
};
use reqwest::{redirect, ClientBuilder};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::command::Command;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = AppConfig::load();
    config.validate()?;
    if config.api.api_key.is_empty() {
        warn!("no API key configured; set NEWS_API_KEY or api.api_key in config.json");
    }

    let data_dir = config.data_dir()?;
    info!(dir = %data_dir.display(), "opening store");
    let store: SharedStore = Arc::new(FileStore::open(&data_dir).await?);

    let client = ClientBuilder::new()
        .redirect(redirect::Policy::limited(5))
        .user_agent(concat!("news-reader/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let source = NewsApiClient::new(client, &config.api)?;

    let data = FeedData::new(store);
    let fetcher = FeedFetcher::new(Arc::new(source), data.clone());
    let controller = FeedController::new(data, fetcher, config.feed.page_len);
    let events = controller.subscribe();
    let handle = spawn_controller(controller, config.feed.refresh_interval());
    let renderer = tokio::spawn(render_events(events));

    println!("{}", command::HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match command::parse(&line) {
            Ok(Command::Intent(intent)) => handle.send(intent).await?,
            Ok(Command::Help) => println!("{}", command::HELP),
            Ok(Command::Quit) => break,
            Err(msg) => println!("{msg}\n{}", command::HELP),
        }
    }

    handle.stop().await?;
    renderer.abort();
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn render_events(mut events: broadcast::Receiver<FeedEvent>) {
    loop {
        match events.recv().await {
            Ok(FeedEvent::Updated(view)) => {
                if render::should_render(&view) {
                    println!("{}", render::render(&view));
                }
            }
            Ok(FeedEvent::RefreshStarted) => debug!("refresh started"),
            Ok(FeedEvent::RefreshFinished { ok }) => debug!(ok, "refresh finished"),
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "renderer fell behind"),
            Err(RecvError::Closed) => break,
        }
    }
}
