//! Institution homepage: branding, contacts, the top announcement, featured
//! articles, and the single link into the departments listing.

use super::{
    Extraction, Follow, Inherited, PageContext, PageRole, Strategy, collect_text, first_attr,
    first_match, first_text, first_text_in,
};
use crate::classify::{is_departments_label, mentions_departments};
use crate::record::{ContentType, Record};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

static TITLE: LazyLock<Selector> = selector!("title");
static BRAND_TITLE: LazyLock<Selector> = selector!("div#site-identity p.site-title a");
static BRAND_DESCRIPTION: LazyLock<Selector> = selector!("div#site-identity p.site-description");
static CONTACT_PHONE: LazyLock<Selector> = selector!("div#quick-contact li.quick-call a");
static CONTACT_EMAIL: LazyLock<Selector> = selector!("div#quick-contact li.quick-email a");
static TOP_NEWS_TITLE: LazyLock<Selector> =
    selector!("div#quick-contact div.top-news span.top-news-title");
static TOP_NEWS_LINK: LazyLock<Selector> = selector!("div#quick-contact div.top-news a");
static FEATURED_ARTICLE: LazyLock<Selector> =
    selector!("div#featured-content div.inner-wrapper article");
static FEATURED_TITLE_LINK: LazyLock<Selector> = selector!("header.entry-header h2.entry-title a");
static FEATURED_PARAGRAPHS: LazyLock<Selector> = selector!("div.entry-content div p");
static FEATURED_BODY: LazyLock<Selector> = selector!("div.entry-content");
static MENU_DEPARTMENTS_ITEM: LazyLock<Selector> =
    selector!("ul#primary-menu li#menu-item-203 > a");
static MENU_LINKS: LazyLock<Selector> = selector!("ul#primary-menu a");

pub fn extract(document: &Html, ctx: &PageContext) -> Extraction {
    let mut out = Extraction::default();
    let page_url = ctx.url.as_str();
    let site = ctx.site_name.as_str();

    let section_record = |content_type, title: String, text: String, section: &str| {
        Record::new(page_url, content_type, title, text)
            .with_meta("site_name", site)
            .with_meta("section", section)
    };

    if let Some(title) = first_text_in(document, &TITLE) {
        out.emit(section_record(
            ContentType::GeneralInfo,
            "Website Main Title".into(),
            title,
            "html_title",
        ));
    }

    if let Some(name) = first_text_in(document, &BRAND_TITLE) {
        out.emit(section_record(
            ContentType::GeneralInfo,
            "Institution Name".into(),
            name,
            "brand_title",
        ));
    }

    if let Some(tagline) = first_text_in(document, &BRAND_DESCRIPTION) {
        out.emit(section_record(
            ContentType::GeneralInfo,
            "Institution Tagline/Motto".into(),
            tagline,
            "brand_description",
        ));
    }

    let mut contact_parts = Vec::new();
    if let Some(phone) = first_text_in(document, &CONTACT_PHONE) {
        contact_parts.push(format!("Phone: {}", phone));
    }
    if let Some(email) = first_text_in(document, &CONTACT_EMAIL) {
        contact_parts.push(format!("Email: {}", email));
    }
    if !contact_parts.is_empty() {
        out.emit(section_record(
            ContentType::ContactInfo,
            format!("{} Primary Contact", site.to_uppercase()),
            contact_parts.join(" | "),
            "top_bar_contact",
        ));
    }

    if let Some(announcement) = top_announcement(document, ctx) {
        out.emit(section_record(
            ContentType::Announcement,
            "Homepage Top Announcement".into(),
            announcement,
            "top_bar_news",
        ));
    }

    for article in document.select(&FEATURED_ARTICLE) {
        if let Some(record) = featured_record(article, ctx) {
            out.emit(record);
        }
    }

    match departments_menu_link(document, ctx) {
        Some(url) => out.follows.push(Follow {
            url,
            role: PageRole::DepartmentList,
            inherited: Inherited::default(),
        }),
        None => out.gap("no departments link in the primary menu; course pages will be missing"),
    }

    out
}

fn top_announcement(document: &Html, ctx: &PageContext) -> Option<String> {
    let mut text = first_text_in(document, &TOP_NEWS_TITLE)?;

    let root = document.root_element();
    let link_text = first_text(root, &TOP_NEWS_LINK);
    let link_url = first_attr(root, &TOP_NEWS_LINK, "href").and_then(|href| ctx.resolve(&href));
    if let (Some(link_text), Some(link_url)) = (link_text, link_url) {
        text.push_str(&format!(" ({}: {})", link_text, link_url));
    }

    Some(text)
}

fn featured_record(article: ElementRef<'_>, ctx: &PageContext) -> Option<Record> {
    let title = first_text(article, &FEATURED_TITLE_LINK)?;

    let paragraphs: Vec<String> = article
        .select(&FEATURED_PARAGRAPHS)
        .map(collect_text)
        .filter(|p| !p.is_empty())
        .collect();
    let body = if paragraphs.is_empty() {
        first_text(article, &FEATURED_BODY)?
    } else {
        paragraphs.join(" ")
    };

    let source = first_attr(article, &FEATURED_TITLE_LINK, "href")
        .and_then(|href| ctx.resolve(&href))
        .unwrap_or_else(|| ctx.url.clone());

    Some(
        Record::new(source.as_str(), ContentType::GeneralInfo, title, body)
            .with_meta("site_name", ctx.site_name.as_str())
            .with_meta("section", "homepage_featured_content"),
    )
}

/// Exactly one departments listing is followed per crawl.
fn departments_menu_link(document: &Html, ctx: &PageContext) -> Option<Url> {
    let menu_item = |doc: &Html| first_attr(doc.root_element(), &MENU_DEPARTMENTS_ITEM, "href");
    let exact_label = |doc: &Html| menu_href_where(doc, is_departments_label);
    let contains_token = |doc: &Html| menu_href_where(doc, mentions_departments);

    let (strategy, href) = first_match(
        document,
        &[
            Strategy { name: "menu item", run: &menu_item },
            Strategy { name: "exact label", run: &exact_label },
            Strategy { name: "label mentions departments", run: &contains_token },
        ],
    )?;

    let url = ctx.resolve(&href)?;
    tracing::debug!("departments link via {}: {}", strategy, url);
    Some(url)
}

fn menu_href_where(document: &Html, accept: fn(&str) -> bool) -> Option<String> {
    document
        .select(&MENU_LINKS)
        .filter(|a| accept(&collect_text(*a)))
        .find_map(|a| a.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Emitted;

    const HOMEPAGE: &str = r#"
<html>
  <head><title> Rift Valley Polytechnic | Home </title></head>
  <body>
    <div id="quick-contact">
      <ul>
        <li class="quick-call"><a href="tel:0700">0700 123 456</a></li>
        <li class="quick-email"><a href="mailto:info@example.test">info@example.test</a></li>
      </ul>
      <div class="top-news">
        <span class="top-news-title">September intake is open</span>
        <a href="/apply-now/">Apply Now</a>
      </div>
    </div>
    <div id="site-identity">
      <p class="site-title"><a href="/">Rift Valley Polytechnic</a></p>
      <p class="site-description">Skills for the future</p>
    </div>
    <ul id="primary-menu">
      <li id="menu-item-10"><a href="/">Home</a></li>
      <li id="menu-item-203"><a href="/departments/">Departments</a></li>
    </ul>
    <div id="featured-content"><div class="inner-wrapper">
      <article>
        <header class="entry-header"><h2 class="entry-title"><a href="/admissions/">Admissions</a></h2></header>
        <div class="entry-content"><div><p>Apply in person</p><p> or online. </p></div></div>
      </article>
      <article>
        <header class="entry-header"><h2 class="entry-title"><a href="/welcome/">Welcome</a></h2></header>
        <div class="entry-content">Karibu to our campus.</div>
      </article>
      <article>
        <header class="entry-header"><h2 class="entry-title"><a href="/empty/">Empty</a></h2></header>
        <div class="entry-content">   </div>
      </article>
    </div></div>
  </body>
</html>"#;

    fn ctx() -> PageContext {
        PageContext::new(Url::parse("https://example.test/").unwrap(), "example.test")
    }

    fn records(out: &Extraction) -> Vec<&Record> {
        out.items.iter().filter_map(Emitted::as_record).collect()
    }

    fn by_section<'a>(out: &'a Extraction, section: &str) -> Vec<&'a Record> {
        records(out)
            .into_iter()
            .filter(|r| r.meta("section") == Some(section))
            .collect()
    }

    #[test]
    fn test_homepage_sections() {
        let out = super::super::extract(PageRole::Homepage, HOMEPAGE, &ctx());

        let title = by_section(&out, "html_title");
        assert_eq!(title[0].text_content, "Rift Valley Polytechnic | Home");

        assert_eq!(by_section(&out, "brand_title")[0].text_content, "Rift Valley Polytechnic");
        assert_eq!(by_section(&out, "brand_description")[0].text_content, "Skills for the future");

        let contact = by_section(&out, "top_bar_contact");
        assert_eq!(contact.len(), 1);
        assert_eq!(contact[0].content_type, ContentType::ContactInfo);
        assert_eq!(contact[0].title, "EXAMPLE.TEST Primary Contact");
        assert_eq!(
            contact[0].text_content,
            "Phone: 0700 123 456 | Email: info@example.test"
        );

        let news = by_section(&out, "top_bar_news");
        assert_eq!(news[0].content_type, ContentType::Announcement);
        assert_eq!(
            news[0].text_content,
            "September intake is open (Apply Now: https://example.test/apply-now/)"
        );

        for record in records(&out) {
            assert_eq!(record.meta("site_name"), Some("example.test"));
        }
    }

    #[test]
    fn test_featured_content_with_fallback_body() {
        let out = super::super::extract(PageRole::Homepage, HOMEPAGE, &ctx());
        let featured = by_section(&out, "homepage_featured_content");

        assert_eq!(featured.len(), 2);
        assert_eq!(featured[0].title, "Admissions");
        assert_eq!(featured[0].text_content, "Apply in person or online.");
        assert_eq!(featured[0].source_url, "https://example.test/admissions/");
        assert_eq!(featured[1].text_content, "Karibu to our campus.");
    }

    #[test]
    fn test_single_departments_follow() {
        let out = super::super::extract(PageRole::Homepage, HOMEPAGE, &ctx());
        assert_eq!(out.follows.len(), 1);
        assert_eq!(out.follows[0].url.as_str(), "https://example.test/departments/");
        assert_eq!(out.follows[0].role, PageRole::DepartmentList);
        assert!(out.gaps.is_empty());
    }

    #[test]
    fn test_departments_link_exact_label_beats_partial() {
        let html = r#"<ul id="primary-menu">
            <li><a href="/our-departments/">Our Departments</a></li>
            <li><a href="/departments/">Departments</a></li>
        </ul>"#;
        let out = super::super::extract(PageRole::Homepage, html, &ctx());
        assert_eq!(out.follows.len(), 1);
        assert_eq!(out.follows[0].url.path(), "/departments/");
    }

    #[test]
    fn test_departments_link_partial_label_fallback() {
        let html = r#"<ul id="primary-menu">
            <li><a href="/courses/">Courses</a></li>
            <li><a href="/academic-departments/">Academic DEPARTMENTS</a></li>
            <li><a href="/other-departments/">More departments</a></li>
        </ul>"#;
        let out = super::super::extract(PageRole::Homepage, html, &ctx());
        assert_eq!(out.follows.len(), 1);
        assert_eq!(out.follows[0].url.path(), "/academic-departments/");
    }

    #[test]
    fn test_missing_everything_is_not_an_error() {
        let out = super::super::extract(PageRole::Homepage, "<html><body></body></html>", &ctx());
        assert!(out.items.is_empty());
        assert!(out.follows.is_empty());
        assert_eq!(out.gaps.len(), 1);
    }

    #[test]
    fn test_contact_with_only_email() {
        let html = r#"<div id="quick-contact"><li class="quick-email"><a>info@example.test</a></li></div>"#;
        let out = super::super::extract(PageRole::Homepage, html, &ctx());
        let contact = by_section(&out, "top_bar_contact");
        assert_eq!(contact[0].text_content, "Email: info@example.test");
    }
}
