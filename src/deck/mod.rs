//! Deck assembly: one full-bleed picture per slide, 16:9 by default.

pub mod parts;
pub mod reader;
pub mod writer;

use crate::Result;
use log::debug;
use std::path::{Path, PathBuf};

pub use reader::{inspect, DeckSummary, PictureBounds};

/// English Metric Units per inch
pub const EMU_PER_INCH: i64 = 914_400;

/// Slide canvas size in EMU, shared by every slide of a deck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideSize {
    pub width_emu: i64,
    pub height_emu: i64,
}

impl SlideSize {
    /// 10in x 5.625in (16:9)
    pub const WIDESCREEN: SlideSize = SlideSize {
        width_emu: 10 * EMU_PER_INCH,
        height_emu: 5_143_500,
    };

    pub fn from_inches(width: f64, height: f64) -> Self {
        Self {
            width_emu: (width * EMU_PER_INCH as f64).round() as i64,
            height_emu: (height * EMU_PER_INCH as f64).round() as i64,
        }
    }

    pub fn width_inches(&self) -> f64 {
        self.width_emu as f64 / EMU_PER_INCH as f64
    }

    pub fn height_inches(&self) -> f64 {
        self.height_emu as f64 / EMU_PER_INCH as f64
    }
}

impl Default for SlideSize {
    fn default() -> Self {
        Self::WIDESCREEN
    }
}

/// A slide that shows one image stretched over the whole canvas
#[derive(Debug, Clone)]
pub struct PictureSlide {
    pub image: PathBuf,
    pub alt_text: String,
}

/// An in-memory deck; slides are written out by [`writer`]
#[derive(Debug, Clone, Default)]
pub struct Deck {
    size: SlideSize,
    slides: Vec<PictureSlide>,
}

impl Deck {
    pub fn new(size: SlideSize) -> Self {
        Self { size, slides: Vec::new() }
    }

    pub fn size(&self) -> SlideSize {
        self.size
    }

    pub fn slides(&self) -> &[PictureSlide] {
        &self.slides
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn add_picture_slide(&mut self, image: impl Into<PathBuf>, alt_text: impl Into<String>) {
        self.slides.push(PictureSlide { image: image.into(), alt_text: alt_text.into() });
    }

    /// Write the package to `path`, replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = writer::to_bytes(self)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

/// An image the assembler should place, if it exists.
#[derive(Debug, Clone)]
pub struct DeckEntry {
    /// 1-based slide number used in progress output
    pub index: usize,
    pub image: PathBuf,
    pub alt_text: String,
}

/// What the assembler did
#[derive(Debug, Clone, Default)]
pub struct DeckReport {
    pub output: PathBuf,
    /// Images placed, in slide order
    pub slides: Vec<PathBuf>,
    /// Expected images that were not on disk
    pub skipped: Vec<PathBuf>,
}

/// Build a deck from every entry whose image exists and save it to `output`.
///
/// Missing images are left out without a placeholder; with none present the
/// written deck simply has zero slides.
pub fn assemble(entries: &[DeckEntry], size: SlideSize, output: &Path) -> Result<DeckReport> {
    let mut deck = Deck::new(size);
    let mut report = DeckReport { output: output.to_path_buf(), ..Default::default() };

    for entry in entries {
        if !entry.image.is_file() {
            debug!("skipping slide {}: {} not found", entry.index, entry.image.display());
            report.skipped.push(entry.image.clone());
            continue;
        }
        deck.add_picture_slide(&entry.image, &entry.alt_text);
        report.slides.push(entry.image.clone());
        println!("✓ Added slide {}", entry.index);
    }

    deck.save(output)?;
    debug!("wrote {} slides to {}", deck.slide_count(), output.display());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widescreen_is_ten_by_five_and_five_eighths() {
        let size = SlideSize::WIDESCREEN;
        assert_eq!(size.width_emu, 9_144_000);
        assert_eq!(size, SlideSize::from_inches(10.0, 5.625));
        assert_eq!(size.width_inches(), 10.0);
        assert_eq!(size.height_inches(), 5.625);
    }

    #[test]
    fn deck_keeps_slide_order() {
        let mut deck = Deck::default();
        deck.add_picture_slide("b.png", "B");
        deck.add_picture_slide("a.png", "A");
        let names: Vec<_> = deck.slides().iter().map(|s| s.alt_text.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(deck.size(), SlideSize::WIDESCREEN);
    }
}
