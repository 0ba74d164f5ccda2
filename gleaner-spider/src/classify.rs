//! Keyword and length heuristics that decide which links and list items are
//! worth keeping.

use crate::record::FaqItem;
use std::collections::HashMap;

/// Substrings that disqualify an anchor from being a department page link.
/// Matched against the lower-cased href and the lower-cased anchor text.
pub const DEPARTMENT_EXCLUDE_KEYWORDS: &[&str] = &[
    "campus",
    "gallery",
    "news",
    "event",
    "contact",
    "tender",
    "download",
    "login",
    "portal",
    "apply",
    "about us",
    "history",
    "policy",
    "charter",
    "management",
    "principal",
    "governor",
    "registrar",
    "dean",
    "complaints",
    "faqs",
    "#",
    "javascript:",
    "mailto:",
    ".pdf",
    ".doc",
    ".jpg",
    ".png",
];

/// List items mentioning any of these are navigation, not courses.
pub const COURSE_EXCLUDE_KEYWORDS: &[&str] = &[
    "click here",
    "download",
    "admission criteria",
    "fee structure",
];

/// Tried in order; the first one present splits a course into name and details.
pub const COURSE_SEPARATORS: &[&str] = &[" \u{2013} ", " \u{2014} ", " - ", ": "];

pub const MIN_DEPARTMENT_NAME_CHARS: usize = 3;
pub const MIN_COURSE_CHARS: usize = 10;

/// Token used to find the departments entry of the primary menu.
pub const DEPARTMENTS_TOKEN: &str = "departments";

/// A hyperlink found on a page, before any filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCandidate {
    pub href: String,
    pub text: String,
}

impl LinkCandidate {
    pub fn new(href: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            text: text.into(),
        }
    }
}

/// A list item accepted as a course, split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseEntry {
    pub full_text: String,
    pub name: String,
    pub details: String,
}

pub fn is_department_link(candidate: &LinkCandidate) -> bool {
    let href = candidate.href.trim();
    let text = candidate.text.trim();

    if href.is_empty() || text.chars().count() <= MIN_DEPARTMENT_NAME_CHARS {
        return false;
    }

    let href_lower = href.to_lowercase();
    let text_lower = text.to_lowercase();
    !DEPARTMENT_EXCLUDE_KEYWORDS
        .iter()
        .any(|kw| href_lower.contains(kw) || text_lower.contains(kw))
}

/// Exact menu label match, ignoring case and surrounding whitespace.
pub fn is_departments_label(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case(DEPARTMENTS_TOKEN)
}

pub fn mentions_departments(text: &str) -> bool {
    text.to_lowercase().contains(DEPARTMENTS_TOKEN)
}

pub fn course_entry(text: &str) -> Option<CourseEntry> {
    let text = text.trim();
    if text.chars().count() <= MIN_COURSE_CHARS {
        return None;
    }

    let lower = text.to_lowercase();
    if COURSE_EXCLUDE_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return None;
    }

    let (name, details) = split_course(text);
    Some(CourseEntry {
        full_text: text.to_string(),
        name,
        details,
    })
}

pub fn split_course(text: &str) -> (String, String) {
    COURSE_SEPARATORS
        .iter()
        .find_map(|sep| text.split_once(sep))
        .map(|(name, details)| (name.trim().to_string(), details.trim().to_string()))
        .unwrap_or_else(|| (text.trim().to_string(), String::new()))
}

/// Keeps one entry per trimmed question. A later duplicate replaces the
/// earlier answer but keeps the earlier position. Comparison is case-sensitive.
pub fn dedup_faqs<I>(items: I) -> Vec<FaqItem>
where
    I: IntoIterator<Item = FaqItem>,
{
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<FaqItem> = Vec::new();

    for item in items {
        let key = item.question.trim().to_string();
        match positions.get(&key) {
            Some(&idx) => unique[idx] = item,
            None => {
                positions.insert(key, unique.len());
                unique.push(item);
            }
        }
    }

    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    fn faq(question: &str, answer: &str) -> FaqItem {
        FaqItem {
            question: question.to_string(),
            answer: answer.to_string(),
        }
    }

    #[test]
    fn test_gallery_href_rejected_whatever_the_text() {
        for text in ["Department of Engineering", "Applied Sciences", "Photos and more"] {
            let link = LinkCandidate::new("https://example.test/gallery/2024", text);
            assert!(!is_department_link(&link), "accepted {text}");
        }
        let upper = LinkCandidate::new("/GALLERY", "Department of ICT");
        assert!(!is_department_link(&upper));
    }

    #[test]
    fn test_department_link_accepted() {
        let link = LinkCandidate::new(
            "https://example.test/department-of-building-civil/",
            "Building & Civil Engineering",
        );
        assert!(is_department_link(&link));
    }

    #[test]
    fn test_department_link_structural_rejections() {
        assert!(!is_department_link(&LinkCandidate::new("", "Engineering")));
        assert!(!is_department_link(&LinkCandidate::new("/ict/", "ICT")));
        assert!(!is_department_link(&LinkCandidate::new("/ict/", "  ICT  ")));
        assert!(is_department_link(&LinkCandidate::new("/ict/", "ICTs")));
    }

    #[test]
    fn test_department_link_keyword_in_text_rejected() {
        let link = LinkCandidate::new("/page-12/", "Apply Online Now");
        assert!(!is_department_link(&link));
        let link = LinkCandidate::new("/page-13/", "About Us");
        assert!(!is_department_link(&link));
    }

    #[test]
    fn test_department_link_binary_and_scheme_rejections() {
        for href in [
            "/files/prospectus.pdf",
            "/files/form.docx",
            "/img/front.JPG",
            "mailto:info@example.test",
            "javascript:void(0)",
            "/mechanical/#intro",
        ] {
            assert!(
                !is_department_link(&LinkCandidate::new(href, "Mechanical Engineering")),
                "accepted {href}"
            );
        }
    }

    #[test]
    fn test_departments_label() {
        assert!(is_departments_label("Departments"));
        assert!(is_departments_label("  DEPARTMENTS "));
        assert!(!is_departments_label("Our Departments"));
        assert!(mentions_departments("Our Departments"));
        assert!(!mentions_departments("Courses"));
    }

    #[test]
    fn test_short_list_items_rejected() {
        assert_eq!(course_entry("Home"), None);
        assert_eq!(course_entry("0123456789"), None);
        assert_eq!(course_entry("   0123456789    "), None);
        assert!(course_entry("01234567890").is_some());
    }

    #[test]
    fn test_course_negative_keywords() {
        assert_eq!(course_entry("Click here for the prospectus"), None);
        assert_eq!(course_entry("Fee Structure 2024/2025"), None);
        assert_eq!(course_entry("Download application form"), None);
        assert_eq!(course_entry("Admission Criteria for diplomas"), None);
    }

    #[test]
    fn test_course_split_on_en_dash() {
        let entry = course_entry("Diploma in IT \u{2013} 2 Years, KCSE C+").unwrap();
        assert_eq!(entry.name, "Diploma in IT");
        assert_eq!(entry.details, "2 Years, KCSE C+");
        assert_eq!(entry.full_text, "Diploma in IT \u{2013} 2 Years, KCSE C+");
    }

    #[test]
    fn test_course_split_separator_order() {
        // The dash wins over the colon even though the colon comes first.
        let (name, details) = split_course("Craft: Plumbing - 1 Year");
        assert_eq!(name, "Craft: Plumbing");
        assert_eq!(details, "1 Year");

        let (name, details) = split_course("Certificate in Welding: KCSE D");
        assert_eq!(name, "Certificate in Welding");
        assert_eq!(details, "KCSE D");
    }

    #[test]
    fn test_course_without_separator() {
        let entry = course_entry("Artisan in Electrical Installation").unwrap();
        assert_eq!(entry.name, "Artisan in Electrical Installation");
        assert_eq!(entry.details, "");
    }

    #[test]
    fn test_hyphenated_word_is_not_a_separator() {
        let (name, details) = split_course("Short-course in Solar PV");
        assert_eq!(name, "Short-course in Solar PV");
        assert!(details.is_empty());
    }

    #[test]
    fn test_dedup_faqs_last_wins_on_trimmed_match() {
        let unique = dedup_faqs(vec![
            faq("What is HEF?", "first"),
            faq("How do I apply?", "online"),
            faq("  What is HEF?  ", "second"),
        ]);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].answer, "second");
        assert_eq!(unique[1].question, "How do I apply?");
    }

    #[test]
    fn test_dedup_faqs_is_case_sensitive() {
        let unique = dedup_faqs(vec![faq("What is HEF?", "a"), faq("what is hef?", "b")]);
        assert_eq!(unique.len(), 2);
    }
}
