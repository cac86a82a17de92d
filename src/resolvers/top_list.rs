use std::num::ParseFloatError;

use rand::Rng;
use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::{
    fetch::Fetch,
    parse::{first_text, selector},
    resolvers::Resolution,
};

#[derive(Debug, Clone)]
pub struct TopListOpts {
    pub url: Url,
    /// Hrefs in the chart are relative to this.
    pub base_url: Url,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopListEntry {
    pub title: String,
    pub link: String,
    pub rating: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("no {0} in the picked row")]
    MissingNode(&'static str),
    #[error("title link has no href")]
    MissingHref,
    #[error("couldn't parse rating {text:?}: {source}")]
    BadRating {
        text: String,
        source: ParseFloatError,
    },
    #[error("rating {0:?} isn't a finite number")]
    NonFiniteRating(String),
    #[error("couldn't build a link from {href:?}: {source}")]
    BadLink {
        href: String,
        source: url::ParseError,
    },
    #[error("{0}")]
    Selector(String),
}

impl From<eyre::Report> for ExtractionError {
    fn from(e: eyre::Report) -> Self {
        ExtractionError::Selector(e.to_string())
    }
}

#[tracing::instrument(skip_all)]
pub async fn resolve_random_top<F: Fetch>(fetcher: &F, opts: &TopListOpts) -> Resolution<TopListEntry> {
    let body = match fetcher.get(opts.url.clone()).await {
        Ok(body) => body,
        Err(e) => {
            warn!("top list request failed: {e}");
            return Resolution::NotFound;
        }
    };

    let picked = pick_random_entry(&body, &opts.base_url, &mut rand::thread_rng());
    match picked {
        Ok(Some(entry)) => Resolution::Found(entry),
        Ok(None) => {
            debug!("top list has no rows");
            Resolution::NotFound
        }
        // a bad row fails the whole pick, we don't try another one
        Err(e) => {
            warn!("couldn't extract the picked row: {e}");
            Resolution::NotFound
        }
    }
}

/// Picks one row uniformly at random and extracts it. `Ok(None)` means the
/// page had no rows at all.
pub fn pick_random_entry<R: Rng>(
    body: &str,
    base_url: &Url,
    rng: &mut R,
) -> Result<Option<TopListEntry>, ExtractionError> {
    let dom = Html::parse_document(body);
    let row_sel = selector("tr")?;
    let rows = dom.select(&row_sel).collect::<Vec<_>>();
    if rows.is_empty() {
        return Ok(None);
    }

    let index = rng.gen_range(0..rows.len());
    debug!("picked row {index} of {}", rows.len());

    let RowSelectors {
        title_link,
        rating,
    } = RowSelectors::new()?;
    let row = rows[index];

    let title_el = row
        .select(&title_link)
        .next()
        .ok_or(ExtractionError::MissingNode("title column link"))?;
    let title = title_el.text().collect::<String>().trim().to_string();
    let href = title_el
        .value()
        .attr("href")
        .ok_or(ExtractionError::MissingHref)?;

    let rating_text =
        first_text(&row, &rating).ok_or(ExtractionError::MissingNode("rating"))?;
    let rating = parse_rating(&rating_text)?;

    Ok(Some(TopListEntry {
        title,
        link: absolute_link(base_url, href)?,
        rating,
    }))
}

struct RowSelectors {
    title_link: Selector,
    rating: Selector,
}

impl RowSelectors {
    fn new() -> eyre::Result<Self> {
        Ok(Self {
            title_link: selector("td.titleColumn a[href]")?,
            rating: selector("td.ratingColumn.imdbRating strong")?,
        })
    }
}

pub fn parse_rating(text: &str) -> Result<f64, ExtractionError> {
    let text = text.trim();
    let rating: f64 = text.parse().map_err(|source| ExtractionError::BadRating {
        text: text.to_string(),
        source,
    })?;
    // f64's FromStr accepts "NaN" and "inf"
    if !rating.is_finite() {
        return Err(ExtractionError::NonFiniteRating(text.to_string()));
    }
    Ok(rating)
}

pub fn absolute_link(base_url: &Url, href: &str) -> Result<String, ExtractionError> {
    base_url
        .join(href)
        .map(String::from)
        .map_err(|source| ExtractionError::BadLink {
            href: href.to_string(),
            source,
        })
}
