use std::path::Path;

use config::Config;
use tracing::error;

pub mod bot;
pub mod config;
pub mod fetch;
pub mod parse;
pub mod resolvers;
pub mod web;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt::init();

    let config_path = std::env::args().nth(1).unwrap_or("config.toml".into());
    let config_path = Path::new(&config_path);
    let config = match Config::read_or_create(config_path) {
        Ok(config) => config,
        Err(err) => {
            error!("Couldn't parse config:\n{err}");
            return;
        }
    };

    if let Err(err) = web::run(config).await {
        error!("{err}");
    }
}
