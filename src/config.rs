use std::{fs, net::SocketAddr, path::Path, time::Duration};

use eyre::eyre;
use serde::Deserialize;
use tracing::info;
use url::Url;

use crate::resolvers::{search::SearchOpts, top_list::TopListOpts};

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub bind: SocketAddr,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub top_list: TopListConfig,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct TelegramConfig {
    #[serde(default)]
    pub token: Option<String>,
    /// Public origin telegram delivers updates to, like `https://example.com`.
    /// If it's missing we don't register the webhook on startup.
    #[serde(default)]
    pub webhook_host: Option<String>,
    #[serde(default)]
    pub webhook_path: Option<String>,
    /// Proxy for requests to the telegram api (not for scraping).
    #[serde(default)]
    pub proxy: Option<String>,
    /// `login:password`
    #[serde(default)]
    pub proxy_credentials: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct FetchConfig {
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct SearchConfig {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub watch_suffix: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct TopListConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Config {
    pub fn read_or_create(config_path: &Path) -> eyre::Result<Self> {
        let mut config = Self::base()?;

        if !config_path.exists() {
            info!("No config found, creating one at {config_path:?}");
            let default_config_str = include_str!("../config-default.toml");
            fs::write(config_path, default_config_str)?;
        }

        let given_config = toml::from_str::<Config>(&fs::read_to_string(config_path)?)?;
        config.update(given_config);
        Ok(config)
    }

    /// The compiled-in config that every user config is layered on top of.
    pub fn base() -> eyre::Result<Self> {
        let base_config_str = include_str!("../config-base.toml");
        Ok(toml::from_str(base_config_str)?)
    }

    // Update the current config with the given config. This is used to make it so
    // the config-base.toml is always used as a fallback if the user decides to
    // use the default for something.
    pub fn update(&mut self, new: Config) {
        self.bind = new.bind;

        let telegram = &mut self.telegram;
        telegram.token = new.telegram.token.or(telegram.token.take());
        telegram.webhook_host = new.telegram.webhook_host.or(telegram.webhook_host.take());
        telegram.webhook_path = new.telegram.webhook_path.or(telegram.webhook_path.take());
        telegram.proxy = new.telegram.proxy.or(telegram.proxy.take());
        telegram.proxy_credentials = new
            .telegram
            .proxy_credentials
            .or(telegram.proxy_credentials.take());

        self.fetch.user_agent = new.fetch.user_agent.or(self.fetch.user_agent.take());
        self.fetch.timeout_secs = new.fetch.timeout_secs.or(self.fetch.timeout_secs);

        self.search.endpoint = new.search.endpoint.or(self.search.endpoint.take());
        self.search.watch_suffix = new.search.watch_suffix.or(self.search.watch_suffix.take());

        self.top_list.url = new.top_list.url.or(self.top_list.url.take());
        self.top_list.base_url = new.top_list.base_url.or(self.top_list.base_url.take());
    }

    pub fn bot_token(&self) -> eyre::Result<&str> {
        self.telegram
            .token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| eyre!("telegram.token must be set in the config"))
    }

    pub fn webhook_path(&self) -> String {
        let path = self.telegram.webhook_path.as_deref().unwrap_or("/webhook");
        if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        }
    }

    /// The full url telegram should post updates to, if a public host is configured.
    pub fn webhook_url(&self) -> Option<String> {
        let host = self.telegram.webhook_host.as_deref()?;
        Some(format!("{}{}", host.trim_end_matches('/'), self.webhook_path()))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.timeout_secs.unwrap_or(10))
    }

    pub fn user_agent(&self) -> eyre::Result<&str> {
        required(&self.fetch.user_agent, "fetch.user_agent")
    }

    pub fn search_opts(&self) -> eyre::Result<SearchOpts> {
        Ok(SearchOpts {
            endpoint: Url::parse(required(&self.search.endpoint, "search.endpoint")?)?,
            watch_suffix: required(&self.search.watch_suffix, "search.watch_suffix")?.to_string(),
        })
    }

    pub fn top_list_opts(&self) -> eyre::Result<TopListOpts> {
        Ok(TopListOpts {
            url: Url::parse(required(&self.top_list.url, "top_list.url")?)?,
            base_url: Url::parse(required(&self.top_list.base_url, "top_list.base_url")?)?,
        })
    }
}

fn required<'a>(value: &'a Option<String>, key: &str) -> eyre::Result<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| eyre!("{key} is missing from the config"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_config_has_every_default() {
        let config = Config::base().unwrap();
        assert_eq!(config.bind, "127.0.0.1:3001".parse().unwrap());
        assert_eq!(config.webhook_path(), "/webhook");
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
        assert!(config.user_agent().unwrap().starts_with("Mozilla/5.0"));

        let search = config.search_opts().unwrap();
        assert_eq!(search.endpoint.as_str(), "https://www.google.ru/search");
        assert_eq!(search.watch_suffix, "смотреть");

        let top_list = config.top_list_opts().unwrap();
        assert_eq!(top_list.url.as_str(), "https://www.imdb.com/chart/top");
        assert_eq!(top_list.base_url.as_str(), "https://www.imdb.com/");
    }

    #[test]
    fn test_default_config_parses() {
        let config: Config = toml::from_str(include_str!("../config-default.toml")).unwrap();
        assert!(config.telegram.token.is_none());
    }

    #[test]
    fn test_user_config_overrides_base() {
        let mut config = Config::base().unwrap();
        let given: Config = toml::from_str(
            r#"
            bind = "0.0.0.0:8080"

            [telegram]
            token = "123:abc"
            webhook_host = "https://bot.example.com/"
            webhook_path = "hook"

            [search]
            watch_suffix = "watch online"
            "#,
        )
        .unwrap();
        config.update(given);

        assert_eq!(config.bind, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.bot_token().unwrap(), "123:abc");
        assert_eq!(config.webhook_path(), "/hook");
        assert_eq!(
            config.webhook_url().as_deref(),
            Some("https://bot.example.com/hook")
        );
        let search = config.search_opts().unwrap();
        assert_eq!(search.watch_suffix, "watch online");
        // untouched fields fall back to the base config
        assert_eq!(search.endpoint.as_str(), "https://www.google.ru/search");
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_missing_token_is_an_error() {
        let config = Config::base().unwrap();
        assert!(config.bot_token().is_err());
        assert!(config.webhook_url().is_none());
    }
}
