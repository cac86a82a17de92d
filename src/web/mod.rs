pub mod index;
pub mod webhook;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::{
    bot::{telegram::TelegramApi, Bot},
    config::Config,
    fetch::HttpFetcher,
};

pub type AppBot = Arc<Bot<HttpFetcher>>;

pub async fn run(config: Config) -> eyre::Result<()> {
    let fetcher = HttpFetcher::new(config.user_agent()?, config.fetch_timeout())?;
    let bot = Arc::new(Bot::new(
        fetcher,
        config.search_opts()?,
        config.top_list_opts()?,
    ));

    let telegram = TelegramApi::new(&config)?;
    match config.webhook_url() {
        Some(webhook_url) => {
            if let Err(err) = telegram.set_webhook(&webhook_url).await {
                error!("Couldn't register webhook: {err}");
            }
        }
        None => warn!("telegram.webhook_host isn't set, not registering the webhook"),
    }

    let app = router(&config.webhook_path(), bot);

    info!("Listening on http://{}", config.bind);
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn router(webhook_path: &str, bot: AppBot) -> Router {
    Router::new()
        .route("/", get(index::route))
        .route(webhook_path, post(webhook::route))
        .layer(TraceLayer::new_for_http())
        .with_state(bot)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Couldn't listen for ctrl-c: {err}");
        return;
    }
    warn!("Shutting down..");
}
