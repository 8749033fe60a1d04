use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use post_feed::config::loader::file_to_config;
use post_feed::feed::PostFeed;
use post_feed::helpers::time::SystemClock;
use post_feed::server::server::{self, AppState};
use post_feed::sources::reddit::RedditClient;
use post_feed::utils::logging::{self, LogLevel};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "post-feed.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config, missing secrets stop us here
    // -------------------------------

    let args = Args::parse();
    let service_config = file_to_config(Path::new(&args.config))
        .with_context(|| format!("Invalid config '{}'", args.config))?;
    let settings = &service_config.settings;
    logging::run(&settings.logging, args.log_level);

    // -------------------------------
    // 2. Provider client + credential cache
    // -------------------------------

    let client = RedditClient::new(service_config.provider.clone(), settings)?;
    let feed = PostFeed::new(client, Arc::new(SystemClock), settings.safety_margin_seconds);
    info!("serving submissions of {}", feed.username());

    // -------------------------------
    // 3. Http server
    // -------------------------------

    let state = AppState::new(feed, &service_config.admin.secret).await;
    info!("Service starting...");
    server::start(settings, state).await
}
