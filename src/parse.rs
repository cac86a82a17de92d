//! Helper functions for pulling structured data out of scraped html.

use eyre::eyre;
use scraper::{ElementRef, Html, Selector};

/// Queries that aren't set leave the matching field of every candidate empty.
pub struct ParseOpts {
    result: Option<&'static str>,
    title: Option<QueryMethod>,
    href: Option<QueryMethod>,
}

impl ParseOpts {
    pub fn new() -> Self {
        Self {
            result: None,
            title: None,
            href: None,
        }
    }

    pub fn result(mut self, result: &'static str) -> Self {
        self.result = Some(result);
        self
    }

    pub fn title(mut self, title: impl Into<QueryMethod>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn href(mut self, href: impl Into<QueryMethod>) -> Self {
        self.href = Some(href.into());
        self
    }
}

impl Default for ParseOpts {
    fn default() -> Self {
        Self::new()
    }
}

pub enum QueryMethod {
    CssSelector(&'static str),
    Manual(Box<dyn Fn(&ElementRef) -> Option<String>>),
}

impl From<&'static str> for QueryMethod {
    fn from(s: &'static str) -> Self {
        QueryMethod::CssSelector(s)
    }
}

/// One result container from the page. Either field is empty if it couldn't be
/// found, it's up to the caller to decide whether that's acceptable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    pub href: String,
}

impl Candidate {
    pub fn is_complete(&self) -> bool {
        !self.title.is_empty() && !self.href.is_empty()
    }
}

pub fn selector(s: &str) -> eyre::Result<Selector> {
    Selector::parse(s).map_err(|e| eyre!("invalid selector {s:?}: {e}"))
}

/// Text of the first descendant matching the selector, with surrounding
/// whitespace trimmed. Empty text counts as missing.
pub fn first_text(el: &ElementRef, sel: &Selector) -> Option<String> {
    el.select(sel)
        .next()
        .map(|n| n.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

/// The `href` of the first descendant matching the selector that has a
/// non-empty one.
pub fn first_href(el: &ElementRef, sel: &Selector) -> Option<String> {
    el.select(sel)
        .filter_map(|n| n.value().attr("href"))
        .find(|href| !href.is_empty())
        .map(str::to_string)
}

/// Returns the candidates in document order.
pub fn parse_candidates(body: &str, opts: &ParseOpts) -> eyre::Result<Vec<Candidate>> {
    let dom = Html::parse_document(body);

    let result_item_query = selector(
        opts.result
            .ok_or_else(|| eyre!("no result selector was given"))?,
    )?;
    let title_query = query_selector(opts.title.as_ref())?;
    let href_query = query_selector(opts.href.as_ref())?;

    let mut candidates = Vec::new();
    for result_item in dom.select(&result_item_query) {
        let title = match (&opts.title, &title_query) {
            (Some(QueryMethod::Manual(f)), _) => f(&result_item),
            (_, Some(sel)) => first_text(&result_item, sel),
            _ => None,
        }
        .unwrap_or_default();

        let href = match (&opts.href, &href_query) {
            (Some(QueryMethod::Manual(f)), _) => f(&result_item),
            (_, Some(sel)) => first_href(&result_item, sel),
            _ => None,
        }
        .unwrap_or_default();

        candidates.push(Candidate { title, href });
    }

    Ok(candidates)
}

fn query_selector(method: Option<&QueryMethod>) -> eyre::Result<Option<Selector>> {
    match method {
        Some(QueryMethod::CssSelector(s)) => selector(s).map(Some),
        Some(QueryMethod::Manual(_)) | None => Ok(None),
    }
}
