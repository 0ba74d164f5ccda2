// Knowledge base summaries

use crate::knowledge::KnowledgeBase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Markdown,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            _ => None,
        }
    }
}

/// What a report is rendered from.
#[derive(Debug, Clone)]
pub struct ReportData<'a> {
    pub sources: Vec<String>,
    pub generated_at: DateTime<Utc>,
    pub knowledge: &'a KnowledgeBase,
}

impl<'a> ReportData<'a> {
    pub fn new(knowledge: &'a KnowledgeBase, sources: Vec<String>) -> Self {
        Self {
            sources,
            generated_at: Utc::now(),
            knowledge,
        }
    }

    fn format_timestamp(&self) -> String {
        self.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    }

    fn format_sources(&self) -> String {
        match self.sources.len() {
            0 => "none".to_string(),
            1 => self.sources[0].clone(),
            n => format!("{} files", n),
        }
    }

    /// Course titles grouped by the department recorded in their metadata.
    fn courses_by_department(&self) -> BTreeMap<String, Vec<String>> {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for course in &self.knowledge.courses {
            let department = course.meta("department").unwrap_or("Unassigned").to_string();
            let name = course
                .meta("extracted_course_name")
                .map(str::to_string)
                .unwrap_or_else(|| course.title.trim_start_matches("Course: ").to_string());
            grouped.entry(department).or_default().push(name);
        }
        grouped
    }
}

pub fn generate_report(format: ReportFormat, data: &ReportData) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(data)),
        ReportFormat::Markdown => Ok(generate_markdown_report(data)),
        ReportFormat::Json => generate_json_report(data),
    }
}

pub fn generate_text_report(data: &ReportData) -> String {
    let kb = data.knowledge;
    let mut report = String::new();

    report.push_str(RULE);
    report.push_str("                         GLEANER KNOWLEDGE SUMMARY\n");
    report.push_str(RULE);
    report.push('\n');

    report.push_str(&format!("Generated:    {}\n", data.format_timestamp()));
    report.push_str(&format!("Sources:      {}\n", data.format_sources()));
    report.push_str(&format!("Lines read:   {}\n", kb.stats.lines_read));
    report.push_str(&format!("Skipped:      {}\n", kb.stats.lines_skipped));
    if kb.stats.files_missing > 0 {
        report.push_str(&format!("Missing:      {} file(s)\n", kb.stats.files_missing));
    }
    report.push('\n');

    report.push_str(RULE);
    report.push_str("CATEGORIES\n");
    report.push_str(RULE);
    report.push('\n');
    for (name, count) in kb.category_counts() {
        report.push_str(&format!("  {:<18} {}\n", name, count));
    }
    report.push('\n');

    let courses = data.courses_by_department();
    if !kb.departments.is_empty() || !courses.is_empty() {
        report.push_str(RULE);
        report.push_str("DEPARTMENTS\n");
        report.push_str(RULE);
        report.push('\n');
        for dept in &kb.departments {
            report.push_str(&format!("  - {}\n", dept.title));
        }
        for (department, names) in &courses {
            report.push_str(&format!("\n  {} ({} courses)\n", department, names.len()));
            for name in names {
                report.push_str(&format!("    * {}\n", name));
            }
        }
        report.push('\n');
    }

    if !kb.faqs.is_empty() {
        report.push_str(RULE);
        report.push_str("FREQUENTLY ASKED QUESTIONS\n");
        report.push_str(RULE);
        report.push('\n');
        for (idx, faq) in kb.faqs.iter().enumerate() {
            report.push_str(&format!("[{}] {}\n", idx + 1, faq.question.trim()));
            report.push_str(&wrap_text(&faq.answer, 80, "    "));
            report.push_str("\n\n");
        }
    }

    report.push_str(RULE);
    report.push_str(&format!("Generated by Gleaner v{}\n", env!("CARGO_PKG_VERSION")));

    report
}

pub fn generate_markdown_report(data: &ReportData) -> String {
    let kb = data.knowledge;
    let mut report = String::new();

    report.push_str("# Gleaner Knowledge Summary\n\n");
    report.push_str(&format!("- **Generated:** {}\n", data.format_timestamp()));
    report.push_str(&format!("- **Sources:** {}\n", data.format_sources()));
    report.push_str(&format!(
        "- **Lines read:** {} ({} skipped)\n\n",
        kb.stats.lines_read, kb.stats.lines_skipped
    ));

    report.push_str("## Categories\n\n");
    report.push_str("| Category | Entries |\n|---|---|\n");
    for (name, count) in kb.category_counts() {
        report.push_str(&format!("| `{}` | {} |\n", name, count));
    }
    report.push('\n');

    let courses = data.courses_by_department();
    if !courses.is_empty() {
        report.push_str("## Courses\n\n");
        for (department, names) in &courses {
            report.push_str(&format!("### {}\n\n", department));
            for name in names {
                report.push_str(&format!("- {}\n", name));
            }
            report.push('\n');
        }
    }

    if !kb.faqs.is_empty() {
        report.push_str("## FAQs\n\n");
        for faq in &kb.faqs {
            report.push_str(&format!("**{}**\n\n{}\n\n", faq.question.trim(), faq.answer.trim()));
        }
    }

    report
}

pub fn generate_json_report(data: &ReportData) -> Result<String, serde_json::Error> {
    let counts: BTreeMap<&str, usize> = data.knowledge.category_counts().into_iter().collect();
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "Gleaner",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": data.generated_at.to_rfc3339(),
                "format": "json",
            },
            "sources": data.sources,
            "summary": {
                "total_entries": data.knowledge.total_entries(),
                "categories": counts,
                "stats": data.knowledge.stats,
            },
            "knowledge": data.knowledge,
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

fn wrap_text(text: &str, width: usize, indent: &str) -> String {
    let limit = width.saturating_sub(indent.len()).max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + word.len() + 1 > limit {
            lines.push(format!("{}{}", indent, current));
            current.clear();
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(format!("{}{}", indent, current));
    }

    lines.join("\n")
}
