//! Department listing and individual department pages.

use super::{
    Extraction, Follow, Inherited, PageContext, PageRole, Strategy, collect_text, first_match,
    first_text_in, non_empty,
};
use crate::classify::{LinkCandidate, course_entry, is_department_link};
use crate::record::{ContentType, Record};
use scraper::{Html, Selector};
use std::sync::LazyLock;

static CONTENT_LINKS: LazyLock<Selector> = selector!("div.entry-content a");
static NAV_SUBMENU_LINKS: LazyLock<Selector> = selector!(
    "ul#primary-menu > li#menu-item-203 > ul.sub-menu > li:not(.menu-item-has-children) > a"
);
static HEADING: LazyLock<Selector> = selector!("header.entry-header h1.entry-title");
static DESCRIPTION_PARAGRAPHS: LazyLock<Selector> = selector!("div.entry-content > p");
static CONTENT_LIST_ITEMS: LazyLock<Selector> = selector!("div.entry-content ul li");
static ARTICLE_LIST_ITEMS: LazyLock<Selector> = selector!("article ul li");

const DESCRIPTION_PARAGRAPH_LIMIT: usize = 3;
const UNKNOWN_DEPARTMENT: &str = "Unknown Department";

pub fn extract_list(document: &Html, ctx: &PageContext) -> Extraction {
    let mut out = Extraction::default();

    let content_links = |doc: &Html| non_empty(content_department_links(doc));
    let nav_submenu = |doc: &Html| non_empty(submenu_department_links(doc));

    let found = first_match(
        document,
        &[
            Strategy { name: "content links", run: &content_links },
            Strategy { name: "navigation sub-menu", run: &nav_submenu },
        ],
    );

    let Some((strategy, candidates)) = found else {
        out.gap("no department links in page content or navigation sub-menu");
        return out;
    };

    tracing::debug!(
        "{} department links on {} via {}",
        candidates.len(),
        ctx.url,
        strategy
    );

    for candidate in candidates {
        let Some(url) = ctx.resolve(&candidate.href) else {
            tracing::debug!("unresolvable department href {:?}", candidate.href);
            continue;
        };
        out.follows.push(Follow {
            url,
            role: PageRole::DepartmentDetail,
            inherited: Inherited {
                department_name: Some(candidate.text),
                department_list_url: Some(ctx.url.to_string()),
            },
        });
    }

    out
}

fn content_department_links(document: &Html) -> Vec<LinkCandidate> {
    document
        .select(&CONTENT_LINKS)
        .map(|a| LinkCandidate::new(a.value().attr("href").unwrap_or_default(), collect_text(a)))
        .filter(is_department_link)
        .collect()
}

/// Leaf entries of the departments drop-down; the campuses entry is skipped.
fn submenu_department_links(document: &Html) -> Vec<LinkCandidate> {
    document
        .select(&NAV_SUBMENU_LINKS)
        .map(|a| LinkCandidate::new(a.value().attr("href").unwrap_or_default(), collect_text(a)))
        .filter(|c| !c.href.trim().is_empty() && !c.text.is_empty())
        .filter(|c| !c.text.to_lowercase().contains("campuses"))
        .collect()
}

pub fn extract_detail(document: &Html, ctx: &PageContext) -> Extraction {
    let mut out = Extraction::default();
    let page_url = ctx.url.as_str();
    let site = ctx.site_name.as_str();

    let department = first_text_in(document, &HEADING)
        .or_else(|| ctx.inherited.department_name.clone())
        .unwrap_or_else(|| UNKNOWN_DEPARTMENT.to_string());

    let description = document
        .select(&DESCRIPTION_PARAGRAPHS)
        .take(DESCRIPTION_PARAGRAPH_LIMIT)
        .map(collect_text)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if !description.is_empty() {
        out.emit(
            Record::new(
                page_url,
                ContentType::DepartmentDescription,
                format!("About {}", department),
                description.clone(),
            )
            .with_meta("site_name", site)
            .with_meta("department", department.as_str()),
        );
    }

    let content_items = |doc: &Html| non_empty(doc.select(&CONTENT_LIST_ITEMS).map(collect_text).collect());
    let article_items = |doc: &Html| non_empty(doc.select(&ARTICLE_LIST_ITEMS).map(collect_text).collect());
    let list_items: Vec<String> = first_match(
        document,
        &[
            Strategy { name: "content list", run: &content_items },
            Strategy { name: "article list", run: &article_items },
        ],
    )
    .map(|(_, items)| items)
    .unwrap_or_default();

    let mut courses = 0usize;
    for entry in list_items.iter().filter_map(|text| course_entry(text)) {
        out.emit(
            Record::new(
                page_url,
                ContentType::CourseInfo,
                format!("Course: {}", entry.name),
                entry.full_text,
            )
            .with_meta("site_name", site)
            .with_meta("department", department.as_str())
            .with_meta("extracted_course_name", entry.name)
            .with_meta("extracted_details", entry.details),
        );
        courses += 1;
    }

    if courses == 0 {
        out.gap(format!("no course entries itemized for department '{}'", department));
        let description_note = if description.is_empty() {
            "none".to_string()
        } else {
            description
        };
        out.emit(
            Record::new(
                page_url,
                ContentType::DepartmentPageNoCoursesItemized,
                format!("Department Page Processed: {}", department),
                format!(
                    "The '{}' department page was visited but no individual courses could be \
                     itemized from it. Department description: {}.",
                    department, description_note
                ),
            )
            .with_meta("site_name", site)
            .with_meta("department", department.as_str()),
        );
    }

    out
}
