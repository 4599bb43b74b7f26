//! Terminal demo for the polling fetcher
//!
//! Mounts two fetchers, one for posts and one for users, prints a panel on
//! every state change and reads commands from stdin:
//!
//! - `<Enter>` or `r`: refetch both
//! - `s`: reverse the post order locally, without a request
//! - `q`: quit
//!
//! Environment variables can be set directly or loaded from a .env file:
//! - API_BASE_URL: backend to fetch from (optional, a local mock API is
//!   started when unset)
//! - POLL_INTERVAL_MS: refetch interval (optional, no polling when unset or 0)
//! - POST_LIMIT / USER_LIMIT: how many items to request (default 5 / 3)
//! - RUST_LOG: log filter (default info)
//!
//! Usage: cargo run -p demo
//!
//! Or against the public API:
//! API_BASE_URL=https://jsonplaceholder.typicode.com POLL_INTERVAL_MS=5000 \
//! cargo run -p demo

mod config;
mod panels;

use std::sync::Arc;

use anyhow::Result;
use fetcher::telemetry::{get_subscriber, init_subscriber, log_error};
use fetcher::{FetchConfig, HttpTransport, PollingFetcher};
use payloads::responses::{Post, User};
use payloads::{APIClient, PostId};
use test_helpers::TestApp;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if available
    // This will silently ignore if the file doesn't exist
    let _ = dotenvy::dotenv();

    init_subscriber(get_subscriber("info"))?;

    let config = Config::from_env()?;
    info!(?config, "🚀 Starting fetcher demo");

    let (client, _mock_app) = connect(&config).await;

    if let Ok(post) = client.get_post(&PostId(1)).await {
        info!("⭐ Featured post: {}", post.title);
    }

    // both fetchers share the client's connection pool
    let transport = Arc::new(HttpTransport::with_client(client.inner_client.clone()));

    let posts = PollingFetcher::<Vec<Post>>::builder(
        FetchConfig::new(client.posts_url(Some(config.post_limit)))
            .poll_interval(config.poll_interval),
    )
    .transport(transport.clone())
    .renderer(|view| println!("{}", panels::posts(&view)))
    .activate();

    let users = PollingFetcher::<Vec<User>>::builder(
        FetchConfig::new(client.users_url(Some(config.user_limit)))
            .poll_interval(config.poll_interval),
    )
    .transport(transport)
    .renderer(|view| println!("{}", panels::users(&view)))
    .activate();

    info!(posts = %posts.id(), users = %users.id(), "📡 Fetchers mounted");
    info!("👋 <Enter> refetches, s reverses posts, q or Ctrl+C quits");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => match line {
                Ok(Some(command)) => match command.trim() {
                    "" | "r" => {
                        posts.refetch();
                        users.refetch();
                    }
                    "s" => posts.update_data(|posts| {
                        posts.map(|mut posts| {
                            posts.reverse();
                            posts
                        })
                    }),
                    "q" => break,
                    other => println!(
                        "Unknown command {other:?}. Use <Enter>, r, s or q."
                    ),
                },
                Ok(None) => {
                    // stdin closed; keep rendering until Ctrl+C
                    tokio::signal::ctrl_c().await?;
                    break;
                }
                Err(e) => {
                    log_error(e);
                    break;
                }
            },
        }
    }

    info!("🛑 Shutting down");
    posts.deactivate();
    users.deactivate();
    Ok(())
}

/// Client for the configured backend, or for a freshly spawned mock API
/// that lives as long as the returned `TestApp`.
async fn connect(config: &Config) -> (APIClient, Option<TestApp>) {
    match &config.api_base_url {
        Some(url) => (APIClient::new(url.as_str()), None),
        None => {
            info!("🧪 No API_BASE_URL set, starting a local mock API");
            let app = test_helpers::spawn_app().await;
            info!("✅ Mock API running on {}", app.address);
            app.state.dataset().print_summary();
            (app.client.clone(), Some(app))
        }
    }
}
