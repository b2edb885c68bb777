//! Slide sources: plain-text HTML definitions copied to `.html` files.

use crate::{Error, PipelineConfig, Result};
use log::debug;
use scraper::{Html, Selector};
use std::fs;
use std::path::PathBuf;

/// One slide's HTML, read from `<stem>.txt` and written to `<stem>.html`.
#[derive(Debug, Clone)]
pub struct SlideSource {
    /// 1-based position in the deck
    pub index: usize,
    pub stem: String,
    /// Source content, copied byte for byte whatever its encoding
    pub bytes: Vec<u8>,
    /// Where the HTML copy lives once materialized
    pub html_path: PathBuf,
}

impl SlideSource {
    /// Text of the document's `<title>`, if it has a non-blank one.
    pub fn title(&self) -> Option<String> {
        let doc = Html::parse_document(&String::from_utf8_lossy(&self.bytes));
        let sel = Selector::parse("title").ok()?;
        doc.select(&sel)
            .next()
            .map(|n| n.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
    }

    /// Picture alt text: the `<title>`, or "Slide N".
    pub fn alt_text(&self) -> String {
        self.title().unwrap_or_else(|| format!("Slide {}", self.index))
    }
}

/// Read every `<stem>.txt` named by `config`, then write each as `<stem>.html`.
///
/// All sources are read before anything is written, so a missing input
/// leaves the working directory untouched.
pub fn materialize(config: &PipelineConfig) -> Result<Vec<SlideSource>> {
    let mut sources = Vec::with_capacity(config.slides.len());
    for (i, stem) in config.slides.iter().enumerate() {
        let path = config.source_path(stem);
        let bytes = fs::read(&path)
            .map_err(|source| Error::MissingSourceFile { path: path.clone(), source })?;
        sources.push(SlideSource {
            index: i + 1,
            stem: stem.clone(),
            bytes,
            html_path: config.html_path(stem),
        });
    }

    for src in &sources {
        fs::write(&src.html_path, &src.bytes)?;
        debug!("materialized {} ({} bytes)", src.html_path.display(), src.bytes.len());
    }

    Ok(sources)
}
