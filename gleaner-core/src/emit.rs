use crate::error::{LoadError, Result};
use gleaner_spider::{Emitted, ItemCallback};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

/// Writes one JSON object per line.
pub struct JsonlWriter<W: Write> {
    inner: BufWriter<W>,
    written: usize,
}

impl JsonlWriter<File> {
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| LoadError::io(parent.display().to_string(), e))?;
        }
        let file = File::create(path).map_err(|e| LoadError::io(path.display().to_string(), e))?;
        debug!("Writing JSONL to {}", path.display());
        Ok(Self::new(file))
    }
}

impl JsonlWriter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonlWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: BufWriter::new(writer),
            written: 0,
        }
    }

    pub fn write<T: Serialize>(&mut self, item: &T) -> Result<()> {
        serde_json::to_writer(&mut self.inner, item)?;
        self.inner
            .write_all(b"\n")
            .map_err(|e| LoadError::io("<jsonl>", e))?;
        self.written += 1;
        Ok(())
    }

    pub fn write_all<'a, I>(&mut self, items: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a Emitted>,
    {
        let before = self.written;
        for item in items {
            self.write(item)?;
        }
        Ok(self.written - before)
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush().map_err(|e| LoadError::io("<jsonl>", e))
    }

    /// Flushes buffered lines and hands back the underlying writer.
    pub fn finish(self) -> Result<W> {
        self.inner
            .into_inner()
            .map_err(|e| LoadError::io("<jsonl>", e.into_error()))
    }
}

/// Writes `items` to `path`, or to stdout when no path is given.
pub fn write_jsonl(path: Option<&Path>, items: &[Emitted]) -> Result<usize> {
    match path {
        Some(path) => {
            let mut writer = JsonlWriter::create(path)?;
            let count = writer.write_all(items)?;
            writer.finish()?;
            Ok(count)
        }
        None => {
            let mut writer = JsonlWriter::stdout();
            let count = writer.write_all(items)?;
            writer.finish()?;
            Ok(count)
        }
    }
}

/// JSONL sink fed from a spider's item callback while the crawl runs.
///
/// The first write error stops further output and is returned by
/// [`finish`](Self::finish).
pub struct JsonlStream {
    state: Mutex<StreamState>,
}

struct StreamState {
    writer: JsonlWriter<Box<dyn Write + Send>>,
    error: Option<LoadError>,
}

impl JsonlStream {
    /// Streams to `path`, or to stdout when no path is given.
    pub fn open(path: Option<&Path>) -> Result<Arc<Self>> {
        let writer: JsonlWriter<Box<dyn Write + Send>> = match path {
            Some(path) => {
                let file = JsonlWriter::create(path)?.finish()?;
                JsonlWriter::new(Box::new(file))
            }
            None => JsonlWriter::new(Box::new(io::stdout())),
        };
        Ok(Arc::new(Self {
            state: Mutex::new(StreamState {
                writer,
                error: None,
            }),
        }))
    }

    pub fn callback(self: &Arc<Self>) -> ItemCallback {
        let stream = self.clone();
        Arc::new(move |item: &Emitted| stream.push(item))
    }

    pub fn push(&self, item: &Emitted) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.error.is_some() {
            return;
        }
        let written = match state.writer.write(item) {
            Ok(()) => state.writer.flush(),
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            warn!("JSONL output failed: {}", e);
            state.error = Some(e);
        }
    }

    /// Flushes and returns how many lines were written.
    pub fn finish(&self) -> Result<usize> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(e) = state.error.take() {
            return Err(e);
        }
        state.writer.flush()?;
        Ok(state.writer.written())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gleaner_spider::{ContentType, FaqItem, FaqPage, Record};

    #[test]
    fn test_one_object_per_line() {
        let items: Vec<Emitted> = vec![
            Record::new(
                "https://rvnp.ac.ke/",
                ContentType::GeneralInfo,
                "Institution Name",
                "Rift Valley National Polytechnic",
            )
            .into(),
            FaqPage {
                scraped_url: "https://www.hef.co.ke/faqs/".to_string(),
                html_page_title: Some("FAQs".to_string()),
                faq_section_main_title: None,
                navigation_links: vec![],
                faq_list: vec![FaqItem {
                    question: "Who qualifies?".to_string(),
                    answer: "Students.".to_string(),
                }],
            }
            .into(),
        ];

        let mut writer = JsonlWriter::new(Vec::new());
        assert_eq!(writer.write_all(&items).unwrap(), 2);
        let bytes = writer.finish().unwrap();
        let text = String::from_utf8(bytes).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(text.ends_with('\n'));

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["content_type"], "general_info");
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["faq_list"][0]["question"], "Who qualifies?");
        assert!(second.get("content_type").is_none());
    }

    #[test]
    fn test_stream_writes_items_as_they_arrive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faq.jsonl");

        let stream = JsonlStream::open(Some(path.as_path())).unwrap();
        let callback = stream.callback();
        callback(&Record::new("https://rvnp.ac.ke/", ContentType::GeneralInfo, "A", "a").into());
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 1);

        callback(&Record::new("https://rvnp.ac.ke/", ContentType::ContactInfo, "B", "b").into());
        assert_eq!(stream.finish().unwrap(), 2);

        let text = std::fs::read_to_string(&path).unwrap();
        let kinds: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str::<serde_json::Value>(l).unwrap()["content_type"].clone())
            .collect();
        assert_eq!(kinds, vec!["general_info", "contact_info"]);
    }

    #[test]
    fn test_create_makes_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("site.jsonl");

        let items: Vec<Emitted> = vec![
            Record::new("https://rvnp.ac.ke/", ContentType::Announcement, "News", "Intake open").into(),
        ];
        assert_eq!(write_jsonl(Some(path.as_path()), &items).unwrap(), 1);

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
