use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Closed set of record kinds a spider may emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    GeneralInfo,
    ContactInfo,
    Announcement,
    CourseInfo,
    DepartmentDescription,
    DepartmentPageNoCoursesItemized,
    FaqItem,
}

impl ContentType {
    pub const ALL: [ContentType; 7] = [
        ContentType::GeneralInfo,
        ContentType::ContactInfo,
        ContentType::Announcement,
        ContentType::CourseInfo,
        ContentType::DepartmentDescription,
        ContentType::DepartmentPageNoCoursesItemized,
        ContentType::FaqItem,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::GeneralInfo => "general_info",
            ContentType::ContactInfo => "contact_info",
            ContentType::Announcement => "announcement",
            ContentType::CourseInfo => "course_info",
            ContentType::DepartmentDescription => "department_description",
            ContentType::DepartmentPageNoCoursesItemized => "department_page_no_courses_itemized",
            ContentType::FaqItem => "faq_item",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ct| ct.as_str() == s)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized unit of extracted page content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub source_url: String,
    pub content_type: ContentType,
    pub title: String,
    pub text_content: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Record {
    pub fn new(
        source_url: impl Into<String>,
        content_type: ContentType,
        title: impl Into<String>,
        text_content: impl Into<String>,
    ) -> Self {
        Self {
            source_url: source_url.into(),
            content_type,
            title: title.into(),
            text_content: text_content.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_meta(mut self, key: &str, value: impl Into<String>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavLink {
    pub text: String,
    pub href: String,
}

/// Everything the FAQ spider finds on one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqPage {
    pub scraped_url: String,
    pub html_page_title: Option<String>,
    pub faq_section_main_title: Option<String>,
    pub navigation_links: Vec<NavLink>,
    pub faq_list: Vec<FaqItem>,
}

/// A single JSONL line of spider output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Emitted {
    Record(Record),
    FaqPage(FaqPage),
}

impl Emitted {
    pub fn source_url(&self) -> &str {
        match self {
            Emitted::Record(record) => &record.source_url,
            Emitted::FaqPage(page) => &page.scraped_url,
        }
    }

    /// Grouping label used in summaries; FAQ pages count as `faq_item`.
    pub fn kind(&self) -> ContentType {
        match self {
            Emitted::Record(record) => record.content_type,
            Emitted::FaqPage(_) => ContentType::FaqItem,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Emitted::Record(record) => Some(record),
            Emitted::FaqPage(_) => None,
        }
    }
}

impl From<Record> for Emitted {
    fn from(record: Record) -> Self {
        Emitted::Record(record)
    }
}

impl From<FaqPage> for Emitted {
    fn from(page: FaqPage) -> Self {
        Emitted::FaqPage(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_wire_names() {
        for ct in ContentType::ALL {
            let json = serde_json::to_string(&ct).unwrap();
            assert_eq!(json, format!("\"{}\"", ct.as_str()));
            assert_eq!(ContentType::parse(ct.as_str()), Some(ct));
        }
        assert_eq!(ContentType::parse("general_summary"), None);
    }

    #[test]
    fn test_record_serializes_with_flat_metadata() {
        let record = Record::new(
            "https://example.test/",
            ContentType::ContactInfo,
            "EXAMPLE.TEST Primary Contact",
            "Phone: 0700 000 000",
        )
        .with_meta("site_name", "example.test")
        .with_meta("section", "top_bar_contact");

        let value = serde_json::to_value(Emitted::from(record)).unwrap();
        assert_eq!(value["content_type"], "contact_info");
        assert_eq!(value["metadata"]["section"], "top_bar_contact");
        assert_eq!(value["source_url"], "https://example.test/");
    }

    #[test]
    fn test_faq_page_is_distinguished_when_read_back() {
        let line = r#"{"scraped_url":"https://example.test/faqs/","html_page_title":"FAQs","faq_section_main_title":null,"navigation_links":[],"faq_list":[{"question":"Q","answer":"A"}]}"#;
        let emitted: Emitted = serde_json::from_str(line).unwrap();
        assert!(matches!(emitted, Emitted::FaqPage(ref p) if p.faq_list.len() == 1));
        assert_eq!(emitted.kind(), ContentType::FaqItem);
    }
}
