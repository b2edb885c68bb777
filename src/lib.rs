//! html2deck
//!
//! Turns HTML slide sources into a 16:9 PowerPoint deck by rendering each
//! document in a headless browser viewport and embedding the captured PNG as
//! a full-bleed picture.
//!
//! # Stages
//!
//! - **Materialize**: `slideN.txt` is copied verbatim to `slideN.html`
//! - **Snapshot**: each HTML file is captured by the first working
//!   [`SnapshotBackend`] (CDP first, then the Chrome command line)
//! - **Assemble**: every available PNG becomes one slide of the deck
//!
//! # Example
//!
//! ```no_run
//! use html2deck::{Pipeline, PipelineConfig, RunOutcome};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig {
//!     work_dir: "slides".into(),
//!     ..Default::default()
//! };
//!
//! match Pipeline::new(config)?.run()? {
//!     RunOutcome::Completed(report) => println!("{} slides", report.slides.len()),
//!     RunOutcome::RenderingIncomplete { failed } => println!("failed: {:?}", failed),
//! }
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod error;
pub use error::{Error, Result};

pub mod cdp;
pub mod chrome_cli;
pub mod deck;
pub mod pipeline;
pub mod snapshot;
pub mod source;

pub use deck::{DeckReport, SlideSize};
pub use pipeline::{Pipeline, RunOutcome};
pub use snapshot::{SnapshotImage, SnapshotRenderer};
pub use source::SlideSource;

/// Viewport dimensions in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// A way of turning one HTML file into a PNG of exactly one viewport.
///
/// Implementations return [`Error::MissingDependency`] when they cannot run
/// at all on this machine, and [`Error::RenderFailure`] when a capture was
/// attempted and failed. [`SnapshotRenderer`] uses the distinction to decide
/// what to report before moving on to the next backend.
pub trait SnapshotBackend {
    /// Short identifier used in logs and progress output
    fn name(&self) -> &'static str;

    /// Render `html_path` in a `viewport`-sized window and write a PNG to `out_path`
    fn capture(&self, html_path: &Path, out_path: &Path, viewport: Viewport) -> Result<()>;
}

/// Configuration for a pipeline run
///
/// The defaults reproduce the zero-argument run: `slide1.txt` and
/// `slide2.txt` in the current directory become `CodeXBit_Proposal.pptx`.
///
/// ```
/// let cfg = html2deck::PipelineConfig::default();
/// assert_eq!(cfg.slides, vec!["slide1", "slide2"]);
/// assert_eq!(cfg.viewport.width, 1280);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding the sources; every other relative path resolves against it
    pub work_dir: PathBuf,
    /// Slide stems, in deck order (`slide1` reads `slide1.txt`)
    pub slides: Vec<String>,
    /// Output presentation file
    pub output: PathBuf,
    /// Capture size for every slide
    pub viewport: Viewport,
    /// Wait after navigation before capturing, in milliseconds
    pub settle_delay_ms: u64,
    /// Leave the `.html` and `.png` intermediates on disk after assembly
    pub keep_intermediates: bool,
    /// Explicit Chrome/Chromium executable for both backends
    pub chrome_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            slides: vec!["slide1".to_string(), "slide2".to_string()],
            output: PathBuf::from("CodeXBit_Proposal.pptx"),
            viewport: Viewport::default(),
            settle_delay_ms: 1000,
            keep_intermediates: true,
            chrome_path: None,
        }
    }
}

impl PipelineConfig {
    /// Load a JSON configuration file; missing keys keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.slides.is_empty() {
            return Err(Error::ConfigError("at least one slide is required".into()));
        }
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(Error::ConfigError(format!(
                "viewport must be non-empty, got {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }
        if let Some(stem) = self.slides.iter().find(|s| s.is_empty() || s.contains(['/', '\\'])) {
            return Err(Error::ConfigError(format!("invalid slide name '{}'", stem)));
        }
        Ok(())
    }

    pub fn source_path(&self, stem: &str) -> PathBuf {
        self.work_dir.join(format!("{}.txt", stem))
    }

    pub fn html_path(&self, stem: &str) -> PathBuf {
        self.work_dir.join(format!("{}.html", stem))
    }

    pub fn image_path(&self, stem: &str) -> PathBuf {
        self.work_dir.join(format!("{}.png", stem))
    }

    pub fn output_path(&self) -> PathBuf {
        self.work_dir.join(&self.output)
    }

    /// The default backend order: CDP first, then the Chrome command line.
    pub fn default_backends(&self) -> Vec<Box<dyn SnapshotBackend>> {
        vec![
            Box::new(cdp::CdpBackend::new(self.settle_delay_ms, self.chrome_path.clone())),
            Box::new(chrome_cli::ChromeCliBackend::new(self.chrome_path.clone())),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.viewport.width, 1280);
        assert_eq!(config.viewport.height, 720);
        assert_eq!(config.settle_delay_ms, 1000);
        assert!(config.keep_intermediates);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn paths_resolve_against_work_dir() {
        let config = PipelineConfig {
            work_dir: PathBuf::from("/tmp/deck"),
            ..Default::default()
        };
        assert_eq!(config.source_path("slide1"), PathBuf::from("/tmp/deck/slide1.txt"));
        assert_eq!(config.html_path("slide2"), PathBuf::from("/tmp/deck/slide2.html"));
        assert_eq!(config.image_path("slide2"), PathBuf::from("/tmp/deck/slide2.png"));
        assert_eq!(config.output_path(), PathBuf::from("/tmp/deck/CodeXBit_Proposal.pptx"));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let empty = PipelineConfig { slides: vec![], ..Default::default() };
        assert!(matches!(empty.validate(), Err(Error::ConfigError(_))));

        let flat = PipelineConfig {
            viewport: Viewport { width: 1280, height: 0 },
            ..Default::default()
        };
        assert!(flat.validate().is_err());

        let nested = PipelineConfig { slides: vec!["../x".into()], ..Default::default() };
        assert!(nested.validate().is_err());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: PipelineConfig =
            serde_json::from_str(r#"{"output": "deck.pptx", "viewport": {"width": 1920, "height": 1080}}"#).unwrap();
        assert_eq!(cfg.output, PathBuf::from("deck.pptx"));
        assert_eq!(cfg.viewport, Viewport { width: 1920, height: 1080 });
        assert_eq!(cfg.slides.len(), 2);
        assert_eq!(cfg.settle_delay_ms, 1000);
    }

    #[test]
    fn default_backend_order() {
        let names: Vec<_> = PipelineConfig::default()
            .default_backends()
            .iter()
            .map(|b| b.name())
            .collect();
        assert_eq!(names, vec!["cdp", "chrome-cli"]);
    }
}
