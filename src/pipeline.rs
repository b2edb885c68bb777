//! The three-stage run: materialize, snapshot, assemble.

use crate::deck::{self, DeckEntry, DeckReport, SlideSize};
use crate::snapshot::SnapshotRenderer;
use crate::source::{self, SlideSource};
use crate::{PipelineConfig, Result, SnapshotBackend};
use log::{debug, info, warn};
use std::path::Path;

/// Printed when at least one slide could not be rendered by any backend.
pub const REMEDIATION: &[&str] = &[
    "⚠ Could not convert HTML to images automatically.",
    "Please install Chrome/Chromium (the default `cdp` backend drives it over the DevTools protocol)",
    "Or install the chromium package so `chromium` (or `google-chrome`) is on PATH, or point CHROME at the binary",
];

/// How a run ended when nothing fatal happened
#[derive(Debug)]
pub enum RunOutcome {
    /// The deck was written
    Completed(DeckReport),
    /// Some slides had no working backend; no deck was written
    RenderingIncomplete { failed: Vec<String> },
}

pub struct Pipeline {
    config: PipelineConfig,
    renderer: SnapshotRenderer,
}

impl Pipeline {
    /// Pipeline with the default backend order (CDP, then Chrome CLI).
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let backends = config.default_backends();
        Self::with_backends(config, backends)
    }

    pub fn with_backends(config: PipelineConfig, backends: Vec<Box<dyn SnapshotBackend>>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, renderer: SnapshotRenderer::new(backends) })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run all stages in order. Only materialization and deck I/O errors are
    /// returned; rendering problems end in [`RunOutcome::RenderingIncomplete`].
    pub fn run(&self) -> Result<RunOutcome> {
        let sources = source::materialize(&self.config)?;
        println!("✓ Created HTML files");

        println!("\nConverting HTML to images...");
        debug!("backends: {:?}", self.renderer.backend_names());
        let failed: Vec<String> = sources
            .iter()
            .filter(|src| !self.render(src))
            .map(|src| src.stem.clone())
            .collect();

        if !failed.is_empty() {
            warn!("no backend rendered {:?}", failed);
            println!();
            for line in REMEDIATION {
                println!("{}", line);
            }
            if !self.config.keep_intermediates {
                self.remove_intermediates(&sources);
            }
            return Ok(RunOutcome::RenderingIncomplete { failed });
        }

        println!("\nCreating PowerPoint presentation...");
        let output = self.config.output_path();
        let entries: Vec<DeckEntry> = sources
            .iter()
            .map(|src| DeckEntry {
                index: src.index,
                image: self.config.image_path(&src.stem),
                alt_text: src.alt_text(),
            })
            .collect();
        let report = deck::assemble(&entries, SlideSize::WIDESCREEN, &output)?;
        println!("✓ PowerPoint presentation created: {}", display_name(&output));

        if !self.config.keep_intermediates {
            self.remove_intermediates(&sources);
        }

        Ok(RunOutcome::Completed(report))
    }

    fn render(&self, src: &SlideSource) -> bool {
        let out = self.config.image_path(&src.stem);
        self.renderer.capture(&src.html_path, &out, self.config.viewport)
    }

    fn remove_intermediates(&self, sources: &[SlideSource]) {
        for src in sources {
            for path in [src.html_path.clone(), self.config.image_path(&src.stem)] {
                match std::fs::remove_file(&path) {
                    Ok(()) => info!("removed {}", path.display()),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => warn!("could not remove {}: {}", path.display(), e),
                }
            }
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Viewport};

    struct Unavailable;

    impl SnapshotBackend for Unavailable {
        fn name(&self) -> &'static str {
            "unavailable"
        }

        fn capture(&self, _: &Path, _: &Path, _: Viewport) -> Result<()> {
            Err(Error::MissingDependency { backend: "unavailable", reason: "not installed".into() })
        }
    }

    #[test]
    fn rejects_invalid_config() {
        let cfg = PipelineConfig { slides: vec![], ..Default::default() };
        assert!(Pipeline::with_backends(cfg, vec![]).is_err());
    }

    #[test]
    fn no_backend_means_no_deck() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("slide1.txt"), "<p>1</p>").unwrap();
        std::fs::write(dir.path().join("slide2.txt"), "<p>2</p>").unwrap();
        let cfg = PipelineConfig { work_dir: dir.path().to_path_buf(), ..Default::default() };

        let pipeline = Pipeline::with_backends(cfg, vec![Box::new(Unavailable)]).unwrap();
        match pipeline.run().unwrap() {
            RunOutcome::RenderingIncomplete { failed } => assert_eq!(failed, vec!["slide1", "slide2"]),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(!dir.path().join("CodeXBit_Proposal.pptx").exists());
        assert!(!dir.path().join("slide1.png").exists());
        assert!(dir.path().join("slide1.html").exists());
    }

    /// Writes a PNG for the first slide only.
    struct FirstOnly;

    impl SnapshotBackend for FirstOnly {
        fn name(&self) -> &'static str {
            "first-only"
        }

        fn capture(&self, html: &Path, out: &Path, vp: Viewport) -> Result<()> {
            if !html.ends_with("slide1.html") {
                return Err(Error::RenderFailure("second slide".into()));
            }
            image::RgbaImage::new(vp.width, vp.height).save(out)?;
            Ok(())
        }
    }

    #[test]
    fn partial_render_with_clean_leaves_no_intermediates() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("slide1.txt"), "<p>1</p>").unwrap();
        std::fs::write(dir.path().join("slide2.txt"), "<p>2</p>").unwrap();
        let cfg = PipelineConfig {
            work_dir: dir.path().to_path_buf(),
            viewport: Viewport { width: 32, height: 18 },
            keep_intermediates: false,
            ..Default::default()
        };

        let pipeline = Pipeline::with_backends(cfg, vec![Box::new(FirstOnly)]).unwrap();
        match pipeline.run().unwrap() {
            RunOutcome::RenderingIncomplete { failed } => assert_eq!(failed, vec!["slide2"]),
            other => panic!("unexpected outcome: {other:?}"),
        }
        for name in ["slide1.html", "slide2.html", "slide1.png", "CodeXBit_Proposal.pptx"] {
            assert!(!dir.path().join(name).exists(), "{name} left behind");
        }
        assert!(dir.path().join("slide1.txt").exists());
    }

    #[test]
    fn display_name_is_file_name() {
        assert_eq!(display_name(Path::new("/tmp/x/deck.pptx")), "deck.pptx");
    }
}
