use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpiderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Not an HTML page: {url} ({content_type})")]
    NotHtml { url: String, content_type: String },

    #[error("Empty response body from {0}")]
    EmptyBody(String),

    #[error("{url} redirected outside the allowed domains to {final_url}")]
    OffSite { url: String, final_url: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Nothing found on {url}: {detail}")]
    ExtractionGap { url: String, detail: String },

    #[error("Task join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),

    #[error("Other error: {0}")]
    Other(String),
}

impl SpiderError {
    /// Fetch-side failures are skipped; everything else is a bug or a gap.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            SpiderError::HttpError(_)
                | SpiderError::Status { .. }
                | SpiderError::NotHtml { .. }
                | SpiderError::EmptyBody(_)
                | SpiderError::OffSite { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SpiderError>;
