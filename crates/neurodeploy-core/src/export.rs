//! Preview and export of the rendered bundle.
//!
//! The host side effects (clipboard, file save) sit behind small traits so the
//! preview logic can be driven without a terminal or a desktop session.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::error::ExportError;
use crate::templates::GeneratedScript;

/// How long the "copied" indicator stays on after a copy
pub const COPY_FEEDBACK: Duration = Duration::from_secs(2);

pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ExportError>;
}

pub trait FileSink {
    fn save(&mut self, filename: &str, content: &str) -> Result<(), ExportError>;
}

/// OS clipboard, opened lazily on first copy
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ExportError> {
        if self.inner.is_none() {
            let clipboard = arboard::Clipboard::new()
                .map_err(|e| ExportError::Clipboard(e.to_string()))?;
            self.inner = Some(clipboard);
        }
        match self.inner.as_mut() {
            Some(clipboard) => clipboard
                .set_text(text.to_string())
                .map_err(|e| ExportError::Clipboard(e.to_string())),
            None => Err(ExportError::Clipboard("not initialized".to_string())),
        }
    }
}

/// Saves files into a directory, creating it on first write
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileSink for DirectorySink {
    fn save(&mut self, filename: &str, content: &str) -> Result<(), ExportError> {
        let path = self.dir.join(filename);
        fs::create_dir_all(&self.dir)
            .and_then(|_| fs::write(&path, content))
            .map_err(|source| ExportError::Write {
                filename: filename.to_string(),
                source,
            })?;
        info!(path = %path.display(), "saved script");
        Ok(())
    }
}

/// Which script is shown, and whether a copy just happened
#[derive(Debug, Default)]
pub struct PreviewState {
    active: usize,
    copied_at: Option<Instant>,
    pub scroll: u16,
}

impl PreviewState {
    pub fn active(&self) -> usize {
        self.active
    }

    /// Select a tab. Out-of-range indices clamp to the last script.
    pub fn select_tab(&mut self, index: usize, bundle_len: usize) {
        let index = index.min(bundle_len.saturating_sub(1));
        if index != self.active {
            self.scroll = 0;
        }
        self.active = index;
    }

    pub fn next_tab(&mut self, bundle_len: usize) {
        if bundle_len > 0 {
            self.select_tab((self.active + 1) % bundle_len, bundle_len);
        }
    }

    pub fn prev_tab(&mut self, bundle_len: usize) {
        if bundle_len > 0 {
            self.select_tab((self.active + bundle_len - 1) % bundle_len, bundle_len);
        }
    }

    pub fn active_script<'a>(&self, bundle: &'a [GeneratedScript]) -> Option<&'a GeneratedScript> {
        bundle.get(self.active)
    }

    pub fn copy_active(&mut self, bundle: &[GeneratedScript], clipboard: &mut impl Clipboard) {
        let Some(script) = self.active_script(bundle) else {
            return;
        };
        match clipboard.set_text(&script.content) {
            Ok(()) => {
                info!(filename = %script.filename, "copied to clipboard");
                self.copied_at = Some(Instant::now());
            }
            Err(e) => warn!("copy failed: {}", e),
        }
    }

    pub fn is_copied(&self) -> bool {
        self.copied_at.is_some_and(|at| at.elapsed() < COPY_FEEDBACK)
    }

    /// Drop the copy indicator once it has expired
    pub fn tick(&mut self) {
        if !self.is_copied() {
            self.copied_at = None;
        }
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines);
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
    }
}

/// Save a single script. Failures are logged, never retried.
pub fn download_one(script: &GeneratedScript, sink: &mut impl FileSink) -> bool {
    match sink.save(&script.filename, &script.content) {
        Ok(()) => true,
        Err(e) => {
            warn!("download failed: {}", e);
            false
        }
    }
}

/// Save every script in bundle order, returning how many were written
pub fn download_all(bundle: &[GeneratedScript], sink: &mut impl FileSink) -> usize {
    bundle
        .iter()
        .map(|script| download_one(script, sink))
        .filter(|saved| *saved)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::AppConfig;
    use crate::templates::{render, BUNDLE_FILENAMES};

    #[derive(Default)]
    struct RecordingSink {
        saved: Vec<(String, String)>,
        fail_on: Option<&'static str>,
    }

    impl FileSink for RecordingSink {
        fn save(&mut self, filename: &str, content: &str) -> Result<(), ExportError> {
            if self.fail_on == Some(filename) {
                return Err(ExportError::Write {
                    filename: filename.to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
                });
            }
            self.saved.push((filename.to_string(), content.to_string()));
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeClipboard {
        text: Option<String>,
        broken: bool,
    }

    impl Clipboard for FakeClipboard {
        fn set_text(&mut self, text: &str) -> Result<(), ExportError> {
            if self.broken {
                return Err(ExportError::Clipboard("permission denied".to_string()));
            }
            self.text = Some(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn download_all_saves_each_script_once_in_order() {
        let bundle = render(&AppConfig::default());
        let mut sink = RecordingSink::default();

        let saved = download_all(&bundle, &mut sink);

        assert_eq!(saved, 8);
        let names: Vec<&str> = sink.saved.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, BUNDLE_FILENAMES.to_vec());
        for ((_, content), script) in sink.saved.iter().zip(&bundle) {
            assert_eq!(content, &script.content);
        }
    }

    #[test]
    fn download_all_skips_failures_without_retrying() {
        let bundle = render(&AppConfig::default());
        let mut sink = RecordingSink {
            fail_on: Some("app.py"),
            ..Default::default()
        };

        assert_eq!(download_all(&bundle, &mut sink), 7);
        assert!(sink.saved.iter().all(|(n, _)| n != "app.py"));
        assert_eq!(sink.saved.last().map(|(n, _)| n.as_str()), Some("requirements.txt"));
    }

    #[test]
    fn directory_sink_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("bundle");
        let mut sink = DirectorySink::new(&target);
        let bundle = render(&AppConfig::default());

        assert!(download_one(&bundle[0], &mut sink));
        let written = fs::read_to_string(target.join("setup.bat")).unwrap();
        assert_eq!(written, bundle[0].content);
    }

    #[test]
    fn select_tab_starts_at_zero_and_clamps() {
        let mut preview = PreviewState::default();
        assert_eq!(preview.active(), 0);
        preview.select_tab(6, 8);
        assert_eq!(preview.active(), 6);
        preview.select_tab(42, 8);
        assert_eq!(preview.active(), 7);
        preview.next_tab(8);
        assert_eq!(preview.active(), 0);
        preview.prev_tab(8);
        assert_eq!(preview.active(), 7);
    }

    #[test]
    fn copy_sets_indicator_and_clipboard_text() {
        let bundle = render(&AppConfig::default());
        let mut preview = PreviewState::default();
        preview.select_tab(6, bundle.len());
        let mut clipboard = FakeClipboard::default();

        preview.copy_active(&bundle, &mut clipboard);

        assert_eq!(clipboard.text.as_deref(), Some(bundle[6].content.as_str()));
        assert!(preview.is_copied());
    }

    #[test]
    fn copy_failure_is_silent() {
        let bundle = render(&AppConfig::default());
        let mut preview = PreviewState::default();
        let mut clipboard = FakeClipboard {
            broken: true,
            ..Default::default()
        };

        preview.copy_active(&bundle, &mut clipboard);
        assert!(!preview.is_copied());
    }

    #[test]
    fn copy_indicator_expires() {
        let mut preview = PreviewState {
            copied_at: Instant::now().checked_sub(COPY_FEEDBACK + Duration::from_millis(10)),
            ..Default::default()
        };
        assert!(!preview.is_copied());
        preview.tick();
        assert!(preview.copied_at.is_none());
    }
}
