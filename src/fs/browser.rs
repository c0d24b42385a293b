//! Directory listing for the file browser panel.

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;

use super::detection::{detect_category, FileCategory};

/// One row of the file browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub category: FileCategory,
}

impl Entry {
    pub fn is_dir(&self) -> bool {
        self.category == FileCategory::Directory
    }
}

/// List `dir`, directories first, each group sorted case-insensitively.
/// An unreadable directory lists as empty.
pub fn load_entries(dir: &Path) -> Vec<Entry> {
    let read = match fs::read_dir(dir) {
        Ok(read) => read,
        Err(err) => {
            warn!("cannot list {}: {err}", dir.display());
            return Vec::new();
        }
    };

    let mut entries: Vec<Entry> = read
        .filter_map(Result::ok)
        .map(|e| {
            let name = e.file_name().to_string_lossy().into_owned();
            let path = e.path();
            let category = if path.is_dir() {
                FileCategory::Directory
            } else {
                detect_category(&path).unwrap_or(FileCategory::Other)
            };
            Entry { name, category }
        })
        .collect();

    entries.sort_by_key(|e| (!e.is_dir(), e.name.to_lowercase()));
    entries
}

/// The last `n` components of `path`, prefixed with `…/` when shortened.
pub fn tail_path(path: &Path, n: usize) -> String {
    let parts: Vec<_> = path.components().collect();
    if parts.len() <= n {
        return path.display().to_string();
    }
    let tail: PathBuf = parts[parts.len() - n..].iter().collect();
    format!("…/{}", tail.display())
}
