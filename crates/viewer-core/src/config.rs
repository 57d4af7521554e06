//! Viewer configuration.
//!
//! Built in code only; nothing is read from disk and nothing is persisted.

use std::path::{Path, PathBuf};

/// Limits and defaults for the viewer controller and the file browser.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// Maximum length of the status-bar path before it is shortened
    pub status_max_len: usize,
    /// Smallest zoom factor
    pub zoom_min: f32,
    /// Largest zoom factor
    pub zoom_max: f32,
    /// Amount added or removed by one zoom step
    pub zoom_step: f32,
    /// Zoom factor of a freshly opened document
    pub zoom_default: f32,
    /// Directory shown at the top of the file tree
    pub browser_root: PathBuf,
    /// Whether dot-prefixed entries are listed
    pub show_hidden: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            status_max_len: crate::path_format::DEFAULT_MAX_LEN,
            zoom_min: 0.5,
            zoom_max: 3.0,
            zoom_step: 0.25,
            zoom_default: 1.0,
            browser_root: Self::default_root(),
            show_hidden: false,
        }
    }
}

impl ViewerConfig {
    /// Sets the directory shown at the top of the file tree.
    pub fn with_root<P: AsRef<Path>>(mut self, root: P) -> Self {
        self.browser_root = root.as_ref().to_path_buf();
        self
    }

    /// The user's home directory, or the file system root when there is none.
    pub fn default_root() -> PathBuf {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"))
    }
}
