use crate::error::{Result, SpiderError};
use url::Url;

pub const DEFAULT_SITE_URL: &str = "https://rvnp.ac.ke/";
pub const DEFAULT_FAQ_URL: &str = "https://www.hef.co.ke/faqs/";

/// Hosts a crawl may visit. A host is allowed when it equals an allowed
/// domain or is a subdomain of one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    domains: Vec<String>,
}

impl AllowList {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            domains: domains
                .into_iter()
                .map(|d| d.into().trim().trim_start_matches('.').to_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    pub fn push(&mut self, domain: &str) {
        let domain = domain.trim().trim_start_matches('.').to_lowercase();
        if !domain.is_empty() && !self.domains.contains(&domain) {
            self.domains.push(domain);
        }
    }

    pub fn permits(&self, url: &Url) -> bool {
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.to_lowercase();
        self.domains
            .iter()
            .any(|base| host == *base || host.ends_with(&format!(".{}", base)))
    }
}

/// Where a crawl starts and what it may touch.
#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub start_url: Url,
    pub allow: AllowList,
    /// Network location of the seed, used as `site_name` metadata.
    pub site_name: String,
}

impl SeedConfig {
    pub fn parse(start_url: &str) -> Result<Self> {
        let url = Url::parse(start_url.trim())
            .map_err(|e| SpiderError::InvalidUrl(format!("{}: {}", start_url, e)))?;
        Self::from_url(url)
    }

    pub fn from_url(mut start_url: Url) -> Result<Self> {
        if !matches!(start_url.scheme(), "http" | "https") {
            return Err(SpiderError::InvalidUrl(format!(
                "{}: only http and https are crawled",
                start_url
            )));
        }
        let host = start_url
            .host_str()
            .ok_or_else(|| SpiderError::InvalidUrl(format!("{}: no host", start_url)))?
            .to_string();

        start_url.set_fragment(None);
        let site_name = match start_url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.clone(),
        };

        Ok(Self {
            start_url,
            allow: AllowList::new([host]),
            site_name,
        })
    }

    pub fn with_allowed_domain(mut self, domain: &str) -> Self {
        self.allow.push(domain);
        self
    }
}
