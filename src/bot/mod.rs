pub mod speech;
pub mod telegram;

use tracing::debug;

use crate::{
    fetch::Fetch,
    resolvers::{
        search::{resolve_search, SearchOpts},
        top_list::{resolve_random_top, TopListOpts},
        Resolution,
    },
};
use telegram::{SendMessage, Update};

macro_rules! regex {
    ($re:literal $(,)?) => {{
        static RE: std::sync::LazyLock<regex::Regex> =
            std::sync::LazyLock::new(|| regex::Regex::new($re).unwrap());
        &RE
    }};
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Random,
    /// Anything that isn't a known command is a film to look for.
    Search(String),
}

impl Command {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        // commands can be addressed to a specific bot in group chats, like /random@SomeBot
        let re = regex!(r"^/([A-Za-z0-9_]+)(?:@[A-Za-z0-9_]+)?(?:\s|$)");
        let command = re
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_lowercase());
        match command.as_deref() {
            Some("start") => Command::Start,
            Some("help") => Command::Help,
            Some("random") => Command::Random,
            _ => Command::Search(text.to_string()),
        }
    }
}

pub struct Bot<F> {
    fetcher: F,
    search: SearchOpts,
    top_list: TopListOpts,
}

impl<F: Fetch> Bot<F> {
    pub fn new(fetcher: F, search: SearchOpts, top_list: TopListOpts) -> Self {
        Self {
            fetcher,
            search,
            top_list,
        }
    }

    /// Returns the reply for a text message, updates without one are ignored.
    pub async fn handle_update(&self, update: Update) -> Option<SendMessage> {
        let message = update.message?;
        let text = message.text.as_deref()?;
        let sender = message.sender();
        debug!(
            "update {} (message {}) from {sender}",
            update.update_id, message.message_id
        );

        let text = self.respond(Command::parse(text), &sender).await;
        Some(SendMessage::html(message.chat.id, text))
    }

    pub async fn respond(&self, command: Command, sender: &str) -> String {
        match command {
            Command::Start => {
                debug!("start: {sender}");
                speech::START.to_string()
            }
            Command::Help => {
                debug!("help: {sender}");
                speech::HELP.to_string()
            }
            Command::Random => {
                debug!("random: {sender}");
                match resolve_random_top(&self.fetcher, &self.top_list).await {
                    Resolution::Found(entry) => {
                        debug!("random: {sender} - result: {entry:?}");
                        speech::random_movie(&entry)
                    }
                    Resolution::NotFound => {
                        debug!("random: {sender} - result: not available");
                        speech::NOT_AVAILABLE.to_string()
                    }
                }
            }
            Command::Search(query) => {
                debug!("browsing: {sender}");
                match resolve_search(&self.fetcher, &self.search, &query).await {
                    Resolution::Found(result) => {
                        debug!("browsing: {sender} - result: {result:?}");
                        speech::film_found(&result)
                    }
                    Resolution::NotFound => {
                        debug!("browsing: {sender} - result: not found");
                        speech::no_such_film(&query)
                    }
                }
            }
        }
    }
}
