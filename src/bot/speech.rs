//! Everything the bot says. Replies are sent with telegram's html parse mode,
//! so anything that came from a user or a scraped page has to be escaped.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::resolvers::{search::SearchResult, top_list::TopListEntry};

pub const START: &str = "Hi!\nI'm CinemaBot.\nType /help to read more about me.";

pub const HELP: &str = "I can find any film/tv-show by its name and give you a link \
where you can watch it online\n\
\n\
<b>Search usage</b>: just write the name of the film:\n\
<code>Venom</code>\n\
and you will receive the link to the website where you can watch it\n\
\n\
<b>Random usage</b>: type /random and enjoy a movie from the IMDb top-250 list";

pub const NOT_AVAILABLE: &str = "Service is not available";

pub fn film_found(result: &SearchResult) -> String {
    format!(
        "<b>{title}</b>\n{link}",
        title = encode_text(&result.title),
        link = encode_text(&result.link),
    )
}

pub fn no_such_film(query: &str) -> String {
    format!(
        "Unfortunately, film/tv-show with name <b>{query}</b> is not found",
        query = encode_text(query),
    )
}

pub fn random_movie(entry: &TopListEntry) -> String {
    format!(
        "<b>{title}</b>\n<a href=\"{link}\">IMDb url</a>\nRating: {rating:.2}",
        title = encode_text(&entry.title),
        link = encode_double_quoted_attribute(&entry.link),
        rating = entry.rating,
    )
}
