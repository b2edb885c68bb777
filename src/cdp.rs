//! Chrome DevTools Protocol backend (uses the `headless_chrome` crate)
//!
//! Launches an isolated headless Chrome per capture, sized to the viewport,
//! loads the slide through a `file://` URL, waits for the settle delay and
//! captures the viewport rectangle only. The browser is dropped on every
//! exit path, which terminates the child process.

use crate::{Error, Result, SnapshotBackend, Viewport};
use std::path::{Path, PathBuf};

#[cfg(feature = "cdp")]
use headless_chrome::protocol::cdp::Page;
#[cfg(feature = "cdp")]
use headless_chrome::{Browser, LaunchOptions};
#[cfg(feature = "cdp")]
use log::debug;
#[cfg(feature = "cdp")]
use std::time::Duration;

const BACKEND: &str = "cdp";

/// Primary snapshot backend.
pub struct CdpBackend {
    settle_delay_ms: u64,
    chrome_path: Option<PathBuf>,
}

impl CdpBackend {
    pub fn new(settle_delay_ms: u64, chrome_path: Option<PathBuf>) -> Self {
        Self { settle_delay_ms, chrome_path }
    }

    pub fn settle_delay_ms(&self) -> u64 {
        self.settle_delay_ms
    }

    #[cfg(feature = "cdp")]
    fn executable(&self) -> Result<PathBuf> {
        match &self.chrome_path {
            Some(p) if p.exists() => Ok(p.clone()),
            Some(p) => Err(Error::MissingDependency {
                backend: BACKEND,
                reason: format!("configured Chrome {} does not exist", p.display()),
            }),
            None => headless_chrome::browser::default_executable()
                .map_err(|reason| Error::MissingDependency { backend: BACKEND, reason }),
        }
    }
}

impl SnapshotBackend for CdpBackend {
    fn name(&self) -> &'static str {
        BACKEND
    }

    #[cfg(feature = "cdp")]
    fn capture(&self, html_path: &Path, out_path: &Path, viewport: Viewport) -> Result<()> {
        let exe = self.executable()?;
        let url = crate::snapshot::file_url(html_path)?;

        let launch_options = LaunchOptions::default_builder()
            .path(Some(exe))
            .headless(true)
            .window_size(Some((viewport.width, viewport.height)))
            .build()
            .map_err(|e| Error::RenderFailure(format!("Failed to build launch options: {}", e)))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| Error::RenderFailure(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| Error::RenderFailure(format!("Failed to create tab: {}", e)))?;

        tab.navigate_to(&url)
            .map_err(|e| Error::RenderFailure(format!("Navigation failed: {}", e)))?;
        tab.wait_until_navigated()
            .map_err(|e| Error::RenderFailure(format!("Wait for navigation failed: {}", e)))?;

        // Fonts, scripts and animations
        std::thread::sleep(Duration::from_millis(self.settle_delay_ms));

        let clip = Page::Viewport {
            x: 0.0,
            y: 0.0,
            width: viewport.width as f64,
            height: viewport.height as f64,
            scale: 1.0,
        };
        let png = tab
            .capture_screenshot(Page::CaptureScreenshotFormatOption::Png, None, Some(clip), true)
            .map_err(|e| Error::RenderFailure(format!("Screenshot failed: {}", e)))?;

        std::fs::write(out_path, &png)?;
        debug!("cdp wrote {} bytes to {}", png.len(), out_path.display());

        drop(tab);
        drop(browser);
        Ok(())
    }

    #[cfg(not(feature = "cdp"))]
    fn capture(&self, _html_path: &Path, _out_path: &Path, _viewport: Viewport) -> Result<()> {
        let _ = &self.chrome_path;
        Err(Error::MissingDependency {
            backend: BACKEND,
            reason: "built without the `cdp` feature".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_settle_delay() {
        let backend = CdpBackend::new(1000, None);
        assert_eq!(backend.name(), "cdp");
        assert_eq!(backend.settle_delay_ms(), 1000);
    }

    #[test]
    fn bogus_chrome_path_is_missing_dependency() {
        let backend = CdpBackend::new(0, Some(PathBuf::from("/nonexistent/chrome-binary")));
        let err = backend
            .capture(Path::new("slide1.html"), Path::new("slide1.png"), Viewport::default())
            .unwrap_err();
        assert!(err.is_missing_dependency(), "unexpected error: {err}");
    }

    #[test]
    #[ignore] // Requires Chrome to be installed
    fn cdp_capture_matches_viewport() {
        let dir = tempfile::tempdir().unwrap();
        let html = dir.path().join("page.html");
        std::fs::write(&html, "<html><body style='height:3000px'><h1>Hello</h1></body></html>").unwrap();
        let out = dir.path().join("page.png");

        let backend = CdpBackend::new(1000, None);
        if let Err(e) = backend.capture(&html, &out, Viewport::default()) {
            eprintln!("Skipping CDP capture test because Chrome is not available or failed to launch: {}", e);
            return;
        }
        assert_eq!(image::image_dimensions(&out).unwrap(), (1280, 720));
    }
}
