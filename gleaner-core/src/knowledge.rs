use crate::error::{LoadError, Result};
use gleaner_spider::classify::dedup_faqs;
use gleaner_spider::{ContentType, FaqItem, Record};
use serde::Serialize;
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;
use tracing::{debug, info, warn};

/// Line counters gathered while loading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    pub files_read: usize,
    pub files_missing: usize,
    pub lines_read: usize,
    pub lines_skipped: usize,
}

/// Crawled records grouped the way a prompt builder consumes them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct KnowledgeBase {
    pub general_info: Vec<Record>,
    pub contact_info: Vec<Record>,
    pub announcements: Vec<Record>,
    pub courses: Vec<Record>,
    pub departments: Vec<Record>,
    pub faqs: Vec<FaqItem>,
    pub courses_detailed: Vec<Value>,
    pub fees_structure: Option<Value>,
    pub stats: LoadStats,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads every JSONL line from `reader`. Blank lines are ignored and
    /// malformed ones are logged and skipped. Call [`finish`](Self::finish)
    /// once all sources are absorbed.
    pub fn absorb<R: BufRead>(&mut self, reader: R, origin: &str) -> Result<()> {
        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| LoadError::io(origin, e))?;
            if line.trim().is_empty() {
                continue;
            }
            self.stats.lines_read += 1;
            if !self.absorb_line(&line) {
                warn!("Skipping malformed line {} in {}", idx + 1, origin);
                self.stats.lines_skipped += 1;
            }
        }
        Ok(())
    }

    /// Files a single JSON line. Returns `false` when the line is not usable.
    pub fn absorb_line(&mut self, line: &str) -> bool {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                debug!("Invalid JSON: {}", e);
                return false;
            }
        };
        if !value.is_object() {
            return false;
        }

        if let Some(list) = value.get("faq_list").and_then(Value::as_array) {
            self.faqs.extend(
                list.iter()
                    .filter_map(|item| serde_json::from_value::<FaqItem>(item.clone()).ok()),
            );
            return true;
        }

        let Some(content_type) = value.get("content_type").and_then(Value::as_str) else {
            debug!("Line has neither content_type nor faq_list");
            return true;
        };

        match content_type {
            "courses_detailed" => {
                self.courses_detailed = value
                    .get("data")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();
                true
            }
            "fees_structure" => {
                self.fees_structure = Some(value);
                true
            }
            other => match ContentType::parse(other) {
                Some(kind) => match serde_json::from_value::<Record>(value) {
                    Ok(record) => {
                        self.file_record(kind, record);
                        true
                    }
                    Err(e) => {
                        debug!("Record does not match the record shape: {}", e);
                        false
                    }
                },
                None => {
                    debug!("Ignoring unknown content_type {:?}", other);
                    true
                }
            },
        }
    }

    fn file_record(&mut self, kind: ContentType, record: Record) {
        match kind {
            ContentType::GeneralInfo => self.general_info.push(record),
            ContentType::ContactInfo => self.contact_info.push(record),
            ContentType::Announcement => self.announcements.push(record),
            ContentType::CourseInfo => self.courses.push(record),
            ContentType::DepartmentDescription
            | ContentType::DepartmentPageNoCoursesItemized => self.departments.push(record),
            ContentType::FaqItem => self.faqs.push(FaqItem {
                question: record.title,
                answer: record.text_content,
            }),
        }
    }

    /// Collapses FAQ entries that share a trimmed question.
    pub fn finish(mut self) -> Self {
        let before = self.faqs.len();
        self.faqs = dedup_faqs(std::mem::take(&mut self.faqs));
        if before != self.faqs.len() {
            debug!("Dropped {} duplicate FAQ entries", before - self.faqs.len());
        }
        self
    }

    pub fn category_counts(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("general_info", self.general_info.len()),
            ("contact_info", self.contact_info.len()),
            ("announcements", self.announcements.len()),
            ("courses", self.courses.len()),
            ("departments", self.departments.len()),
            ("faqs", self.faqs.len()),
            ("courses_detailed", self.courses_detailed.len()),
            ("fees_structure", usize::from(self.fees_structure.is_some())),
        ]
    }

    pub fn total_entries(&self) -> usize {
        self.category_counts().iter().map(|(_, n)| n).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_entries() == 0
    }
}

/// Load one JSONL source from any reader.
pub fn load_from_reader<R: BufRead>(reader: R, origin: &str) -> Result<KnowledgeBase> {
    let mut kb = KnowledgeBase::new();
    kb.absorb(reader, origin)?;
    kb.stats.files_read = 1;
    Ok(kb.finish())
}

/// Load and merge several JSONL files. Missing files are logged and skipped
/// so a partial dataset still produces a usable knowledge base.
pub fn load_knowledge<P: AsRef<Path>>(paths: &[P]) -> Result<KnowledgeBase> {
    let mut kb = KnowledgeBase::new();

    for path in paths {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Data file not found at {}; skipping", path.display());
                kb.stats.files_missing += 1;
                continue;
            }
            Err(e) => return Err(LoadError::io(path.display().to_string(), e)),
        };

        kb.absorb(BufReader::new(file), &path.display().to_string())?;
        kb.stats.files_read += 1;
    }

    let kb = kb.finish();
    info!(
        "Loaded {} entries from {} file(s) ({} lines skipped)",
        kb.total_entries(),
        kb.stats.files_read,
        kb.stats.lines_skipped
    );
    Ok(kb)
}
