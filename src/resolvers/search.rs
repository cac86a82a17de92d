use scraper::ElementRef;
use tracing::{debug, warn};
use url::Url;

use crate::{
    fetch::Fetch,
    parse::{first_href, parse_candidates, selector, ParseOpts, QueryMethod},
    resolvers::Resolution,
};

#[derive(Debug, Clone)]
pub struct SearchOpts {
    pub endpoint: Url,
    /// Appended to every query so the results lean towards sites where the
    /// film can actually be watched instead of wikis and reviews.
    pub watch_suffix: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
}

pub fn request_url(opts: &SearchOpts, movie_name: &str) -> Url {
    let mut url = opts.endpoint.clone();
    url.query_pairs_mut()
        .append_pair("q", &format!("{movie_name} {}", opts.watch_suffix));
    url
}

#[tracing::instrument(skip(fetcher, opts))]
pub async fn resolve_search<F: Fetch>(
    fetcher: &F,
    opts: &SearchOpts,
    movie_name: &str,
) -> Resolution<SearchResult> {
    let body = match fetcher.get(request_url(opts, movie_name)).await {
        Ok(body) => body,
        Err(e) => {
            warn!("search request failed: {e}");
            return Resolution::NotFound;
        }
    };

    match parse_response(&body) {
        Ok(result) => {
            if result.is_none() {
                debug!("no complete search result");
            }
            result.into()
        }
        Err(e) => {
            warn!("couldn't parse search response: {e}");
            Resolution::NotFound
        }
    }
}

/// The first result (in page order) that has both a heading and a link.
pub fn parse_response(body: &str) -> eyre::Result<Option<SearchResult>> {
    let candidates = parse_candidates(
        body,
        &ParseOpts::new()
            .result("div.g")
            .title("h3")
            .href(QueryMethod::Manual(Box::new(|el: &ElementRef| {
                let sel = selector("a[href]").ok()?;
                first_href(el, &sel).as_deref().map(clean_url)
            }))),
    )?;

    Ok(candidates
        .into_iter()
        .find(|candidate| candidate.is_complete())
        .map(|candidate| SearchResult {
            title: candidate.title,
            link: candidate.href,
        }))
}

fn clean_url(url: &str) -> String {
    // the no-js version of the page wraps results in redirect links
    if url.starts_with("/url?") {
        if let Ok(parsed) = Url::parse(&format!("https://www.google.com{url}")) {
            if let Some((_, q)) = parsed
                .query_pairs()
                .find(|(key, value)| key == "q" && !value.is_empty())
            {
                return q.to_string();
            }
        }
    }
    url.to_string()
}
