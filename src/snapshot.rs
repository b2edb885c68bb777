//! Snapshot rendering: try each backend in order until one captures the page.

use crate::{Error, Result, SnapshotBackend, Viewport};
use log::{debug, warn};
use std::path::{Path, PathBuf};

/// A captured PNG on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotImage {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl SnapshotImage {
    /// Read the pixel dimensions of an existing image file.
    pub fn open(path: &Path) -> Result<Self> {
        let (width, height) = image::image_dimensions(path)?;
        Ok(Self { path: path.to_path_buf(), width, height })
    }
}

/// `file://` URL for a local path (made absolute first).
pub fn file_url(path: &Path) -> Result<String> {
    let abs = std::path::absolute(path)?;
    url::Url::from_file_path(&abs)
        .map(|u| u.to_string())
        .map_err(|_| Error::RenderFailure(format!("cannot build a file URL for {}", abs.display())))
}

/// Ordered list of backends; the first successful capture wins.
pub struct SnapshotRenderer {
    backends: Vec<Box<dyn SnapshotBackend>>,
}

impl SnapshotRenderer {
    pub fn new(backends: Vec<Box<dyn SnapshotBackend>>) -> Self {
        Self { backends }
    }

    pub fn backend_names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Render `html_path` into `out_path`. Never fails: every backend error
    /// is reported and turned into `false` once the list is exhausted.
    pub fn capture(&self, html_path: &Path, out_path: &Path, viewport: Viewport) -> bool {
        for backend in &self.backends {
            match backend.capture(html_path, out_path, viewport) {
                Ok(()) => {
                    debug!("{} captured {} -> {}", backend.name(), html_path.display(), out_path.display());
                    check_dimensions(out_path, viewport);
                    return true;
                }
                Err(e) if e.is_missing_dependency() => {
                    println!("{} not available, trying next backend...", backend.name());
                    debug!("{}", e);
                }
                Err(e) => {
                    println!("{} failed: {}", backend.name(), e);
                    warn!("{} failed on {}: {}", backend.name(), html_path.display(), e);
                }
            }
        }
        false
    }
}

fn check_dimensions(out_path: &Path, viewport: Viewport) {
    match SnapshotImage::open(out_path) {
        Ok(img) if img.width != viewport.width || img.height != viewport.height => warn!(
            "{} is {}x{}, expected {}x{}",
            out_path.display(),
            img.width,
            img.height,
            viewport.width,
            viewport.height
        ),
        Ok(_) => {}
        Err(e) => warn!("could not read back {}: {}", out_path.display(), e),
    }
}
