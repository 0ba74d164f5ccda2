use crate::error::{Result, SpiderError};
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// A successfully fetched HTML page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Address after redirects; links on the page resolve against this.
    pub final_url: Url,
    pub status: u16,
    pub content_type: Option<String>,
    pub response_time: Duration,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let timeout_secs = timeout_secs.max(1);
        let client = Client::builder()
            .user_agent(concat!("Gleaner/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .pool_max_idle_per_host(8)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client })
    }

    /// GET `url` and return its HTML. Non-2xx statuses, non-HTML content and
    /// blank bodies are errors so the caller can skip the page.
    pub async fn fetch(&self, url: &Url) -> Result<FetchedPage> {
        debug!("Fetching {}", url);

        let start = Instant::now();
        let response = self.client.get(url.clone()).send().await?;
        let response_time = start.elapsed();

        let status = response.status();
        if !status.is_success() {
            return Err(SpiderError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        if let Some(ct) = &content_type
            && !ct.to_lowercase().contains("html")
        {
            return Err(SpiderError::NotHtml {
                url: url.to_string(),
                content_type: ct.clone(),
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(SpiderError::EmptyBody(url.to_string()));
        }

        Ok(FetchedPage {
            final_url,
            status: status.as_u16(),
            content_type,
            response_time,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    async fn serve(server: &MockServer, route: &str, template: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(template)
            .mount(server)
            .await;
    }

    fn page_url(server: &MockServer, route: &str) -> Url {
        Url::parse(&format!("{}{}", server.uri(), route)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_html_page() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/",
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_bytes(b"<html><body>Hi</body></html>".as_slice()),
        )
        .await;

        let page = Fetcher::new().unwrap().fetch(&page_url(&server, "/")).await.unwrap();
        assert_eq!(page.status, 200);
        assert!(page.body.contains("Hi"));
        assert_eq!(page.final_url, page_url(&server, "/"));
    }

    #[tokio::test]
    async fn test_fetch_follows_redirects() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/old",
            ResponseTemplate::new(301).insert_header("location", "/new"),
        )
        .await;
        serve(
            &server,
            "/new",
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_bytes(b"<p>moved</p>".as_slice()),
        )
        .await;

        let page = Fetcher::new().unwrap().fetch(&page_url(&server, "/old")).await.unwrap();
        assert_eq!(page.final_url.path(), "/new");
    }

    #[tokio::test]
    async fn test_fetch_rejects_error_status() {
        let server = MockServer::start().await;
        serve(&server, "/missing", ResponseTemplate::new(404)).await;

        let err = Fetcher::new()
            .unwrap()
            .fetch(&page_url(&server, "/missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, SpiderError::Status { status: 404, .. }));
        assert!(err.is_fetch_failure());
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_html_and_blank() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/prospectus.pdf",
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(b"%PDF-1.4".as_slice()),
        )
        .await;
        serve(
            &server,
            "/blank",
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_bytes(b"   \n".as_slice()),
        )
        .await;

        let fetcher = Fetcher::new().unwrap();
        let pdf = fetcher.fetch(&page_url(&server, "/prospectus.pdf")).await;
        assert!(matches!(pdf, Err(SpiderError::NotHtml { .. })));
        let blank = fetcher.fetch(&page_url(&server, "/blank")).await;
        assert!(matches!(blank, Err(SpiderError::EmptyBody(_))));
    }
}
