//! Fetching pages to scrape.

use std::{future::Future, time::Duration};

use reqwest::{header::HeaderMap, StatusCode};
use tracing::debug;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("server responded with {0}")]
    Status(StatusCode),
}

/// Something that can download the html at a url. The resolvers take this
/// instead of a client so tests can hand them canned documents.
pub trait Fetch {
    fn get(&self, url: Url) -> impl Future<Output = Result<String, FetchError>> + Send;
}

#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> eyre::Result<Self> {
        let client = reqwest::ClientBuilder::new()
            // the sites we scrape serve different markup (or nothing) to clients
            // that don't look like a browser
            .user_agent(user_agent)
            .default_headers({
                let mut headers = HeaderMap::new();
                headers.insert("Accept-Language", "ru-RU,ru;q=0.9,en-US;q=0.5".parse()?);
                headers
            })
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    async fn get(&self, url: Url) -> Result<String, FetchError> {
        debug!("fetching {url}");
        let res = self.client.get(url).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        Ok(res.text().await?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{collections::HashMap, net::SocketAddr};

    use axum::{http::StatusCode, routing::get, Router};

    use super::*;

    /// Serves fixed bodies keyed by url path, everything else is a 404.
    pub struct StubFetcher {
        pages: HashMap<String, Result<String, StatusCode>>,
    }

    impl StubFetcher {
        pub fn new() -> Self {
            Self {
                pages: HashMap::new(),
            }
        }

        pub fn page(mut self, path: &str, body: &str) -> Self {
            self.pages.insert(path.to_string(), Ok(body.to_string()));
            self
        }

        pub fn status(mut self, path: &str, status: StatusCode) -> Self {
            self.pages.insert(path.to_string(), Err(status));
            self
        }
    }

    impl Fetch for StubFetcher {
        async fn get(&self, url: Url) -> Result<String, FetchError> {
            match self.pages.get(url.path()) {
                Some(Ok(body)) => Ok(body.clone()),
                Some(Err(status)) => Err(FetchError::Status(*status)),
                None => Err(FetchError::Status(StatusCode::NOT_FOUND)),
            }
        }
    }

    /// Starts a throwaway server on a random local port.
    pub async fn serve(app: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        addr
    }

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new("Mozilla/5.0 (test)", Duration::from_secs(10)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_body_and_sends_user_agent() {
        let app = Router::new().route(
            "/",
            get(|headers: axum::http::HeaderMap| async move {
                headers
                    .get("user-agent")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string()
            }),
        );
        let addr = serve(app).await;

        let body = fetcher()
            .get(Url::parse(&format!("http://{addr}/")).unwrap())
            .await
            .unwrap();
        assert_eq!(body, "Mozilla/5.0 (test)");
    }

    #[tokio::test]
    async fn test_fetch_fails_on_error_status() {
        let app = Router::new().route(
            "/",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "oops") }),
        );
        let addr = serve(app).await;

        let err = fetcher()
            .get(Url::parse(&format!("http://{addr}/")).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FetchError::Status(StatusCode::INTERNAL_SERVER_ERROR)
        ));
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        let app = Router::new().route(
            "/",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "too late"
            }),
        );
        let addr = serve(app).await;

        let fetcher = HttpFetcher::new("Mozilla/5.0 (test)", Duration::from_millis(200)).unwrap();
        let err = fetcher
            .get(Url::parse(&format!("http://{addr}/")).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Request(e) if e.is_timeout()));
    }
}
