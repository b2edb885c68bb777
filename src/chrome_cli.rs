//! Secondary backend: drive a Chrome/Chromium binary's `--screenshot` mode.

use crate::{Error, Result, SnapshotBackend, Viewport};
use log::debug;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

const BACKEND: &str = "chrome-cli";

/// Executable names looked up on `PATH`, in order.
const CANDIDATES: &[&str] = &[
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
    "chrome",
];

/// Snapshot backend that shells out to a headless browser process.
pub struct ChromeCliBackend {
    chrome_path: Option<PathBuf>,
}

impl ChromeCliBackend {
    pub fn new(chrome_path: Option<PathBuf>) -> Self {
        Self { chrome_path }
    }

    /// Resolve the browser binary: explicit path, then `$CHROME`, then `PATH`.
    pub fn discover(&self) -> Result<PathBuf> {
        if let Some(p) = &self.chrome_path {
            return if p.is_file() {
                Ok(p.clone())
            } else {
                Err(Error::MissingDependency {
                    backend: BACKEND,
                    reason: format!("configured Chrome {} does not exist", p.display()),
                })
            };
        }
        if let Some(p) = std::env::var_os("CHROME").map(PathBuf::from) {
            if p.is_file() {
                return Ok(p);
            }
            debug!("ignoring CHROME={}, not a file", p.display());
        }
        let path_var = std::env::var_os("PATH").unwrap_or_default();
        find_in_path(&path_var).ok_or_else(|| Error::MissingDependency {
            backend: BACKEND,
            reason: format!("none of {} found on PATH", CANDIDATES.join(", ")),
        })
    }
}

fn find_in_path(path_var: &std::ffi::OsStr) -> Option<PathBuf> {
    let dirs: Vec<PathBuf> = std::env::split_paths(path_var).collect();
    CANDIDATES.iter().find_map(|name| {
        dirs.iter()
            .map(|d| d.join(name))
            .find(|candidate| candidate.is_file())
    })
}

/// Headless flags: no sandbox, no /dev/shm, window sized to the viewport.
fn screenshot_args(url: &str, out_path: &Path, viewport: Viewport) -> Vec<OsString> {
    let mut screenshot = OsString::from("--screenshot=");
    screenshot.push(out_path.as_os_str());
    vec![
        "--headless".into(),
        "--no-sandbox".into(),
        "--disable-dev-shm-usage".into(),
        "--disable-gpu".into(),
        "--hide-scrollbars".into(),
        format!("--window-size={},{}", viewport.width, viewport.height).into(),
        screenshot,
        url.into(),
    ]
}

impl SnapshotBackend for ChromeCliBackend {
    fn name(&self) -> &'static str {
        BACKEND
    }

    fn capture(&self, html_path: &Path, out_path: &Path, viewport: Viewport) -> Result<()> {
        let exe = self.discover()?;
        let url = crate::snapshot::file_url(html_path)?;
        let out_abs = std::path::absolute(out_path)?;

        // A stale image from an earlier run must not pass for this one.
        match std::fs::remove_file(&out_abs) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(e.into()),
            _ => {}
        }

        debug!("running {} for {}", exe.display(), url);
        let output = Command::new(&exe)
            .args(screenshot_args(&url, &out_abs, viewport))
            .output()
            .map_err(|e| Error::RenderFailure(format!("Failed to start {}: {}", exe.display(), e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::RenderFailure(format!(
                "{} exited with {}: {}",
                exe.display(),
                output.status,
                stderr.trim()
            )));
        }
        if !out_abs.is_file() {
            return Err(Error::RenderFailure(format!("{} produced no screenshot", exe.display())));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_carry_viewport_and_flags() {
        let args = screenshot_args("file:///tmp/s.html", Path::new("/tmp/s.png"), Viewport { width: 1280, height: 720 });
        let args: Vec<String> = args.into_iter().map(|a| a.into_string().unwrap()).collect();
        assert!(args.contains(&"--no-sandbox".to_string()));
        assert!(args.contains(&"--disable-dev-shm-usage".to_string()));
        assert!(args.contains(&"--window-size=1280,720".to_string()));
        assert!(args.contains(&"--screenshot=/tmp/s.png".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("file:///tmp/s.html"));
    }

    #[test]
    fn path_search_finds_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("chromium-browser");
        std::fs::write(&fake, "#!/bin/sh\n").unwrap();
        let found = find_in_path(dir.path().as_os_str());
        assert_eq!(found, Some(fake));
    }

    #[test]
    fn empty_path_finds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(find_in_path(dir.path().as_os_str()), None);
    }

    #[test]
    fn missing_explicit_binary_is_missing_dependency() {
        let backend = ChromeCliBackend::new(Some(PathBuf::from("/nonexistent/chromium")));
        let err = backend
            .capture(Path::new("slide1.html"), Path::new("slide1.png"), Viewport::default())
            .unwrap_err();
        assert!(err.is_missing_dependency());
    }

    #[cfg(unix)]
    #[test]
    fn failing_binary_is_render_failure() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("chromium");
        std::fs::write(&fake, "#!/bin/sh\necho 'no display' >&2\nexit 3\n").unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();
        let html = dir.path().join("s.html");
        std::fs::write(&html, "<p>x</p>").unwrap();

        let backend = ChromeCliBackend::new(Some(fake));
        let err = backend.capture(&html, &dir.path().join("s.png"), Viewport::default()).unwrap_err();
        assert!(matches!(err, Error::RenderFailure(_)), "unexpected error: {err}");
    }
}
