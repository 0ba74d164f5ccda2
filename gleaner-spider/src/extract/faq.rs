//! Accordion-style FAQ pages built with the Elementor toggle widget.

use super::{
    Extraction, PageContext, Strategy, collect_text, first_match, first_text, first_text_in,
};
use crate::record::{FaqItem, FaqPage, NavLink};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static TITLE: LazyLock<Selector> = selector!("title");
static SECTION_TITLE: LazyLock<Selector> =
    selector!("div.elementor-element-b88aa82 h2.elementor-heading-title");
static ANY_SECTION_TITLE: LazyLock<Selector> = selector!("h2.elementor-heading-title");
static NAV_LINKS: LazyLock<Selector> =
    selector!("nav.elementor-nav-menu--main ul.elementor-nav-menu li.menu-item a.elementor-item");
static TOGGLE_ITEMS: LazyLock<Selector> =
    selector!("div.elementor-widget-toggle div.elementor-toggle-item");
static QUESTION: LazyLock<Selector> = selector!("div.elementor-tab-title a.elementor-toggle-title");
static QUESTION_BLOCK: LazyLock<Selector> = selector!("div.elementor-tab-title");
static ANSWER_BLOCK: LazyLock<Selector> = selector!("div.elementor-tab-content");

pub fn extract(document: &Html, ctx: &PageContext) -> Extraction {
    let mut out = Extraction::default();

    let section_title = |doc: &Html| first_text_in(doc, &SECTION_TITLE);
    let any_heading = |doc: &Html| first_text_in(doc, &ANY_SECTION_TITLE);
    let faq_section_main_title = first_match(
        document,
        &[
            Strategy { name: "section widget", run: &section_title },
            Strategy { name: "first heading", run: &any_heading },
        ],
    )
    .map(|(_, title)| title);

    let faq_list: Vec<FaqItem> = document
        .select(&TOGGLE_ITEMS)
        .filter_map(faq_item)
        .collect();

    if faq_list.is_empty() {
        out.gap("no question/answer pairs in toggle widgets");
    }

    out.emit(FaqPage {
        scraped_url: ctx.url.to_string(),
        html_page_title: first_text_in(document, &TITLE),
        faq_section_main_title,
        navigation_links: navigation_links(document, ctx),
        faq_list,
    });

    out
}

/// A pair survives only when both halves have text.
fn faq_item(item: ElementRef<'_>) -> Option<FaqItem> {
    let question = first_text(item, &QUESTION).or_else(|| joined_text(item, &QUESTION_BLOCK))?;
    let answer = first_text(item, &ANSWER_BLOCK)?
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    Some(FaqItem { question, answer })
}

/// Text nodes concatenated as-is, so inline markup does not add spaces.
fn joined_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

fn navigation_links(document: &Html, ctx: &PageContext) -> Vec<NavLink> {
    document
        .select(&NAV_LINKS)
        .filter_map(|a| {
            let text = collect_text(a);
            let href = a.value().attr("href")?.trim();
            if text.is_empty() || href.is_empty() {
                return None;
            }
            let href = ctx.resolve(href)?.to_string();
            Some(NavLink { text, href })
        })
        .collect()
}
