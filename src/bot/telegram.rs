//! The small part of the telegram bot api we use.

use eyre::{bail, eyre};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::Config;

#[derive(Deserialize, Debug)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Deserialize, Debug)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct Chat {
    pub id: i64,
}

#[derive(Deserialize, Debug)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

impl Message {
    /// Who sent the message, for logging.
    pub fn sender(&self) -> String {
        match &self.from {
            Some(User {
                username: Some(username),
                ..
            }) => username.clone(),
            Some(user) => user.id.to_string(),
            None => "unknown".to_string(),
        }
    }
}

/// A reply sent back in the body of the webhook response, which saves us a
/// separate request to the api.
#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct SendMessage {
    method: &'static str,
    pub chat_id: i64,
    pub text: String,
    parse_mode: &'static str,
}

impl SendMessage {
    pub fn html(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            method: "sendMessage",
            chat_id,
            text: text.into(),
            parse_mode: "HTML",
        }
    }
}

#[derive(Deserialize, Debug)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

pub struct TelegramApi {
    client: reqwest::Client,
    token: String,
}

impl TelegramApi {
    pub fn new(config: &Config) -> eyre::Result<Self> {
        let mut builder = reqwest::ClientBuilder::new().timeout(config.fetch_timeout());

        if let Some(proxy_host) = &config.telegram.proxy {
            let mut proxy = reqwest::Proxy::all(proxy_host)?;
            if let Some(credentials) = &config.telegram.proxy_credentials {
                let (login, password) = credentials
                    .split_once(':')
                    .ok_or_else(|| eyre!("telegram.proxy_credentials should be login:password"))?;
                proxy = proxy.basic_auth(login, password);
            }
            builder = builder.proxy(proxy);
        }

        Ok(Self {
            client: builder.build()?,
            token: config.bot_token()?.to_string(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{method}", self.token)
    }

    pub async fn set_webhook(&self, webhook_url: &str) -> eyre::Result<()> {
        let res: ApiResponse = self
            .client
            .post(self.method_url("setWebhook"))
            .form(&[("url", webhook_url)])
            .send()
            .await?
            .json()
            .await?;
        if !res.ok {
            bail!(
                "telegram refused the webhook: {}",
                res.description.unwrap_or_default()
            );
        }
        info!("Registered webhook at {webhook_url}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_update() {
        let update: Update = serde_json::from_str(
            r#"{
                "update_id": 10,
                "message": {
                    "message_id": 3,
                    "date": 1700000000,
                    "chat": {"id": 42, "type": "private"},
                    "from": {"id": 7, "is_bot": false, "first_name": "A", "username": "someone"},
                    "text": "Venom"
                }
            }"#,
        )
        .unwrap();
        let message = update.message.unwrap();
        assert_eq!(message.chat.id, 42);
        assert_eq!(message.text.as_deref(), Some("Venom"));
        assert_eq!(message.sender(), "someone");
    }

    #[test]
    fn test_parse_update_without_message() {
        let update: Update =
            serde_json::from_str(r#"{"update_id": 11, "edited_message": {}}"#).unwrap();
        assert!(update.message.is_none());
    }

    #[test]
    fn test_send_message_json() {
        let reply = SendMessage::html(42, "<b>hi</b>");
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            serde_json::json!({
                "method": "sendMessage",
                "chat_id": 42,
                "text": "<b>hi</b>",
                "parse_mode": "HTML",
            })
        );
    }
}
