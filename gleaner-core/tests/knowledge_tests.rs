// Tests for loading crawled JSONL into a knowledge base

use gleaner_core::emit::write_jsonl;
use gleaner_core::knowledge::load_knowledge;
use gleaner_spider::{ContentType, Emitted, FaqItem, FaqPage, Record};
use std::io::Write;
use tempfile::{NamedTempFile, tempdir};

fn site_items() -> Vec<Emitted> {
    vec![
        Record::new(
            "https://rvnp.ac.ke/",
            ContentType::GeneralInfo,
            "Institution Name",
            "The Rift Valley National Polytechnic",
        )
        .into(),
        Record::new(
            "https://rvnp.ac.ke/",
            ContentType::ContactInfo,
            "rvnp.ac.ke Primary Contact",
            "Phone: 0700 000 000 | Email: info@rvnp.ac.ke",
        )
        .into(),
        Record::new(
            "https://rvnp.ac.ke/ict/",
            ContentType::CourseInfo,
            "Course: Diploma in IT",
            "Diploma in IT – 2 Years, KCSE C+",
        )
        .with_meta("department", "Department of ICT")
        .with_meta("extracted_course_name", "Diploma in IT")
        .into(),
        Record::new(
            "https://rvnp.ac.ke/hospitality/",
            ContentType::DepartmentPageNoCoursesItemized,
            "Department Page Processed: Hospitality",
            "",
        )
        .into(),
    ]
}

fn faq_page(answer: &str) -> Emitted {
    FaqPage {
        scraped_url: "https://www.hef.co.ke/faqs/".to_string(),
        html_page_title: Some("FAQs".to_string()),
        faq_section_main_title: Some("Frequently Asked Questions".to_string()),
        navigation_links: vec![],
        faq_list: vec![
            FaqItem {
                question: "What is HEF?".to_string(),
                answer: answer.to_string(),
            },
            FaqItem {
                question: "Who can apply?".to_string(),
                answer: "Students in public universities.".to_string(),
            },
        ],
    }
    .into()
}

#[test]
fn test_spider_output_loads_back() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let site = dir.path().join("site.jsonl");
    let faq = dir.path().join("faq.jsonl");
    write_jsonl(Some(site.as_path()), &site_items())?;
    write_jsonl(Some(faq.as_path()), &[faq_page("first"), faq_page("second")])?;

    let kb = load_knowledge(&[site, faq])?;

    assert_eq!(kb.general_info.len(), 1);
    assert_eq!(kb.contact_info.len(), 1);
    assert_eq!(kb.courses.len(), 1);
    assert_eq!(kb.courses[0].meta("department"), Some("Department of ICT"));
    assert_eq!(kb.departments.len(), 1);
    assert_eq!(kb.faqs.len(), 2);
    assert_eq!(kb.faqs[0].question, "What is HEF?");
    assert_eq!(kb.faqs[0].answer, "second");
    assert_eq!(kb.stats.files_read, 2);
    assert_eq!(kb.stats.lines_read, 6);
    Ok(())
}

#[test]
fn test_missing_file_is_skipped() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let present = dir.path().join("site.jsonl");
    write_jsonl(Some(present.as_path()), &site_items())?;

    let kb = load_knowledge(&[dir.path().join("nope.jsonl"), present])?;
    assert_eq!(kb.stats.files_missing, 1);
    assert_eq!(kb.stats.files_read, 1);
    assert_eq!(kb.total_entries(), 4);
    Ok(())
}

#[test]
fn test_all_files_missing_gives_empty_base() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let kb = load_knowledge(&[dir.path().join("a.jsonl"), dir.path().join("b.jsonl")])?;
    assert!(kb.is_empty());
    assert_eq!(kb.stats.files_missing, 2);
    Ok(())
}

#[test]
fn test_malformed_lines_do_not_abort() -> Result<(), Box<dyn std::error::Error>> {
    let mut file = NamedTempFile::new()?;
    writeln!(
        file,
        r#"{{"source_url":"u","content_type":"announcement","title":"Intake","text_content":"May intake open"}}"#
    )?;
    writeln!(file, "{{\"source_url\": \"u\", \"content_type\":")?;
    writeln!(file, r#"{{"content_type":"course_info","title":"missing fields"}}"#)?;
    writeln!(file)?;
    writeln!(
        file,
        r#"{{"content_type":"fees_structure","diploma":{{"per_term":"18,000"}}}}"#
    )?;

    let kb = load_knowledge(&[file.path()])?;
    assert_eq!(kb.announcements.len(), 1);
    assert!(kb.courses.is_empty());
    assert!(kb.fees_structure.is_some());
    assert_eq!(kb.stats.lines_read, 4);
    assert_eq!(kb.stats.lines_skipped, 2);
    Ok(())
}
