//! File system side of the viewer: a lazily expanded directory tree.
//!
//! Only directories the user has expanded are listed, one level at a time.
//! Listings are cached per directory and rebuilt when the filter changes.

use crate::config::ViewerConfig;
use crate::filter::NameFilter;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Dir,
    File,
}

/// One row of the tree: name plus the Size / Type / Modified columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub name: String,
    pub kind: EntryKind,
    pub size: u64,
    pub modified: Option<SystemTime>,
}

impl FileEntry {
    fn from_dir_entry(entry: &walkdir::DirEntry) -> Option<Self> {
        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(err) => {
                log::debug!("skipping {}: {err}", entry.path().display());
                return None;
            }
        };

        let kind = if metadata.is_dir() { EntryKind::Dir } else { EntryKind::File };

        Some(Self {
            path: entry.path().to_path_buf(),
            name: entry.file_name().to_string_lossy().into_owned(),
            kind,
            size: if kind == EntryKind::File { metadata.len() } else { 0 },
            modified: metadata.modified().ok(),
        })
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }

    /// Human readable size; empty for directories.
    pub fn size_label(&self) -> String {
        if self.is_dir() {
            return String::new();
        }

        const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

        if self.size < 1024 {
            return format!("{} bytes", self.size);
        }

        let mut value = self.size as f64 / 1024.0;
        let mut unit = 0;
        while value >= 1024.0 && unit < UNITS.len() - 1 {
            value /= 1024.0;
            unit += 1;
        }

        format!("{value:.1} {}", UNITS[unit])
    }

    pub fn type_label(&self) -> String {
        if self.is_dir() {
            return "Folder".to_owned();
        }

        match Path::new(&self.name).extension().and_then(|ext| ext.to_str()) {
            Some(ext) => format!("{} File", ext.to_uppercase()),
            None => "File".to_owned(),
        }
    }
}

#[derive(Debug)]
pub struct FileBrowser {
    root: PathBuf,
    filter: NameFilter,
    show_hidden: bool,
    listings: HashMap<PathBuf, Vec<FileEntry>>,
}

impl FileBrowser {
    pub fn new<P: AsRef<Path>>(root: P, filter: NameFilter, show_hidden: bool) -> Self {
        let mut browser = Self {
            root: root.as_ref().to_path_buf(),
            filter,
            show_hidden,
            listings: HashMap::new(),
        };
        let root = browser.root.clone();
        browser.expand(&root);
        browser
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        Self::new(&config.browser_root, NameFilter::default(), config.show_hidden)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn filter(&self) -> &NameFilter {
        &self.filter
    }

    /// Replaces the filter and relists every expanded directory. Returns
    /// false when the filter is unchanged.
    pub fn set_filter(&mut self, filter: NameFilter) -> bool {
        if filter == self.filter {
            return false;
        }

        self.filter = filter;
        self.refresh();
        true
    }

    /// Lists `dir` and keeps the listing until the directory is collapsed.
    pub fn expand(&mut self, dir: &Path) {
        let listing = self.list(dir);
        self.listings.insert(dir.to_path_buf(), listing);
    }

    /// Forgets the listing of `dir` and of everything below it. The root
    /// stays expanded.
    pub fn collapse(&mut self, dir: &Path) {
        if dir == self.root {
            return;
        }
        self.listings.retain(|path, _| !path.starts_with(dir));
    }

    pub fn is_expanded(&self, dir: &Path) -> bool {
        self.listings.contains_key(dir)
    }

    /// Cached children of an expanded directory.
    pub fn children(&self, dir: &Path) -> Option<&[FileEntry]> {
        self.listings.get(dir).map(Vec::as_slice)
    }

    /// Relists every expanded directory from disk.
    pub fn refresh(&mut self) {
        let expanded: Vec<PathBuf> = self.listings.keys().cloned().collect();
        for dir in expanded {
            let listing = self.list(&dir);
            self.listings.insert(dir, listing);
        }
    }

    /// Reads the immediate children of `dir` that pass the filter:
    /// directories first, then files, each sorted case-insensitively.
    pub fn list(&self, dir: &Path) -> Vec<FileEntry> {
        let mut dirs = Vec::new();
        let mut files = Vec::new();

        let walker = WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true);

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    log::warn!("cannot list {}: {err}", dir.display());
                    continue;
                }
            };

            let Some(meta) = FileEntry::from_dir_entry(&entry) else {
                continue;
            };

            if !self.show_hidden && meta.name.starts_with('.') {
                continue;
            }

            if !self.filter.matches(&meta.name, meta.is_dir()) {
                continue;
            }

            if meta.is_dir() {
                dirs.push(meta);
            } else {
                files.push(meta);
            }
        }

        dirs.sort_by_key(|entry| entry.name.to_lowercase());
        files.sort_by_key(|entry| entry.name.to_lowercase());

        dirs.extend(files);
        dirs
    }
}
