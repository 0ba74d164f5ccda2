//! Page-role specific extraction.
//!
//! Every extractor is a pure function of the fetched markup and the visit
//! context. Nothing here touches the network or shared state, so pages can be
//! processed on any worker in any order.

macro_rules! selector {
    ($css:expr) => {
        std::sync::LazyLock::new(|| {
            scraper::Selector::parse($css).expect("static selector must parse")
        })
    };
}

pub mod departments;
pub mod faq;
pub mod homepage;

use crate::record::Emitted;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

/// What kind of page a visit is expected to land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageRole {
    Homepage,
    DepartmentList,
    DepartmentDetail,
    FaqPage,
}

impl PageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageRole::Homepage => "homepage",
            PageRole::DepartmentList => "department_list",
            PageRole::DepartmentDetail => "department_detail",
            PageRole::FaqPage => "faq_page",
        }
    }
}

/// Metadata a parent page hands down to the pages it links to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inherited {
    pub department_name: Option<String>,
    pub department_list_url: Option<String>,
}

/// Everything an extractor knows about the page besides its markup.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub url: Url,
    pub site_name: String,
    pub inherited: Inherited,
}

impl PageContext {
    pub fn new(url: Url, site_name: impl Into<String>) -> Self {
        Self {
            url,
            site_name: site_name.into(),
            inherited: Inherited::default(),
        }
    }

    pub fn with_inherited(mut self, inherited: Inherited) -> Self {
        self.inherited = inherited;
        self
    }

    /// Resolve an href against this page, dropping any fragment.
    pub fn resolve(&self, href: &str) -> Option<Url> {
        let mut resolved = self.url.join(href.trim()).ok()?;
        resolved.set_fragment(None);
        Some(resolved)
    }
}

/// A link the extractor wants followed, and what the target page is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Follow {
    pub url: Url,
    pub role: PageRole,
    pub inherited: Inherited,
}

/// Result of extracting one page.
#[derive(Debug, Default)]
pub struct Extraction {
    pub items: Vec<Emitted>,
    pub follows: Vec<Follow>,
    /// Expected page structure that was missing; reported, never fatal.
    pub gaps: Vec<String>,
}

impl Extraction {
    pub(crate) fn emit(&mut self, item: impl Into<Emitted>) {
        self.items.push(item.into());
    }

    pub(crate) fn gap(&mut self, detail: impl Into<String>) {
        self.gaps.push(detail.into());
    }
}

pub fn extract(role: PageRole, html: &str, ctx: &PageContext) -> Extraction {
    let document = Html::parse_document(html);
    match role {
        PageRole::Homepage => homepage::extract(&document, ctx),
        PageRole::DepartmentList => departments::extract_list(&document, ctx),
        PageRole::DepartmentDetail => departments::extract_detail(&document, ctx),
        PageRole::FaqPage => faq::extract(&document, ctx),
    }
}

/// One named way of pulling something out of a document.
pub(crate) struct Strategy<'a, T> {
    pub name: &'static str,
    pub run: &'a dyn Fn(&Html) -> Option<T>,
}

/// Runs strategies in order and returns the first hit with its name.
pub(crate) fn first_match<T>(document: &Html, strategies: &[Strategy<'_, T>]) -> Option<(&'static str, T)> {
    strategies
        .iter()
        .find_map(|s| (s.run)(document).map(|found| (s.name, found)))
}

/// All descendant text nodes, each trimmed, joined by single spaces.
pub(crate) fn collect_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Trimmed text of the first match, if it has any.
pub(crate) fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(collect_text)
        .filter(|text| !text.is_empty())
}

pub(crate) fn first_text_in(document: &Html, selector: &Selector) -> Option<String> {
    first_text(document.root_element(), selector)
}

pub(crate) fn first_attr(scope: ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    scope
        .select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub(crate) fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() { None } else { Some(items) }
}
