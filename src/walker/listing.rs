//! Directory listing
//!
//! Workers never touch the filesystem directly; they ask a [`DirLister`] for
//! the immediate children of a directory. [`FsLister`] is the local
//! filesystem implementation. Tests substitute in-memory listers.

use crate::error::{ListError, ListResult};
use crate::filter::rule::to_forward_slashes;
use std::fs;
use std::path::MAIN_SEPARATOR;

/// Type of directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
    /// Regular file
    File,
    /// Directory
    Directory,
    /// Symbolic link (never followed)
    Symlink,
    /// Device, FIFO, socket, ...
    Other,
}

impl EntryType {
    /// Classify a `std::fs::FileType` without following links
    pub fn from_file_type(file_type: fs::FileType) -> Self {
        if file_type.is_symlink() {
            EntryType::Symlink
        } else if file_type.is_dir() {
            EntryType::Directory
        } else if file_type.is_file() {
            EntryType::File
        } else {
            EntryType::Other
        }
    }

    /// Check if this is a directory (descended into, never emitted)
    pub fn is_dir(&self) -> bool {
        *self == EntryType::Directory
    }
}

/// A single child returned by a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedEntry {
    /// File name (no path components)
    pub name: String,

    /// Entry type
    pub entry_type: EntryType,
}

impl ListedEntry {
    /// Create a listed entry
    pub fn new(name: impl Into<String>, entry_type: EntryType) -> Self {
        Self {
            name: name.into(),
            entry_type,
        }
    }

    /// Check if this is the "." or ".." entry
    pub fn is_special(&self) -> bool {
        self.name == "." || self.name == ".."
    }
}

/// Children of one directory
///
/// Entries whose name or type could not be read are reported in `errors`
/// and left out of `entries`.
#[derive(Debug, Default)]
pub struct Listing {
    /// Readable children, in listing order
    pub entries: Vec<ListedEntry>,

    /// Per-entry failures
    pub errors: Vec<ListError>,
}

/// Source of directory contents
pub trait DirLister: Send + Sync {
    /// List the immediate children of `dir`
    ///
    /// An `Err` means the directory itself could not be read.
    fn list(&self, dir: &str) -> ListResult<Listing>;
}

/// Lists directories on the local filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLister;

impl DirLister for FsLister {
    fn list(&self, dir: &str) -> ListResult<Listing> {
        let read_dir = fs::read_dir(dir).map_err(|e| ListError::from_io(dir, &e))?;
        let mut listing = Listing::default();

        for entry in read_dir {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    listing.errors.push(ListError::from_io(dir, &e));
                    continue;
                }
            };

            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    listing.errors.push(ListError::NonUtf8Name {
                        dir: dir.to_string(),
                        name: raw.to_string_lossy().into_owned(),
                    });
                    continue;
                }
            };

            match entry.file_type() {
                Ok(file_type) => listing
                    .entries
                    .push(ListedEntry::new(name, EntryType::from_file_type(file_type))),
                Err(e) => listing.errors.push(ListError::StatFailed {
                    path: join_child(dir, &name),
                    reason: e.to_string(),
                }),
            }
        }

        Ok(listing)
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Build the full path of a child of `dir`
pub fn join_child(dir: &str, name: &str) -> String {
    let mut path = String::with_capacity(dir.len() + name.len() + 1);
    path.push_str(dir);
    if !dir.is_empty() && !dir.ends_with(is_separator) {
        path.push(MAIN_SEPARATOR);
    }
    path.push_str(name);
    path
}

/// Root-relative, forward-slash form of `full_path`
///
/// `root` is the normalized walk root; the separator that follows it (if
/// any) is dropped.
pub fn relative_to_root(root: &str, full_path: &str) -> String {
    let relative = full_path.strip_prefix(root).unwrap_or(full_path);
    to_forward_slashes(relative.trim_start_matches(is_separator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn test_special_entries() {
        assert!(ListedEntry::new(".", EntryType::Directory).is_special());
        assert!(ListedEntry::new("..", EntryType::Directory).is_special());
        assert!(!ListedEntry::new(".git", EntryType::Directory).is_special());
    }

    #[test]
    fn test_join_child() {
        let sep = MAIN_SEPARATOR;
        assert_eq!(join_child("/data/", "a.txt"), "/data/a.txt");
        assert_eq!(join_child("/data", "a.txt"), format!("/data{}a.txt", sep));
        assert_eq!(join_child("C:\\data\\", "a.txt"), "C:\\data\\a.txt");
    }

    #[test]
    fn test_relative_to_root() {
        assert_eq!(relative_to_root("/data/", "/data/a/b.txt"), "a/b.txt");
        assert_eq!(relative_to_root("/data", "/data/a/b.txt"), "a/b.txt");
        assert_eq!(relative_to_root("C:\\data\\", "C:\\data\\a\\b.txt"), "a/b.txt");
        assert_eq!(relative_to_root("/data/", "/data/"), "");
    }

    #[test]
    fn test_fs_lister() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("file.txt")).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        let root = dir.path().to_str().unwrap();
        let mut listing = FsLister.list(root).unwrap();
        listing.entries.sort_by(|a, b| a.name.cmp(&b.name));

        assert!(listing.errors.is_empty());
        assert_eq!(
            listing.entries,
            vec![
                ListedEntry::new("file.txt", EntryType::File),
                ListedEntry::new("sub", EntryType::Directory),
            ]
        );
    }

    #[test]
    fn test_fs_lister_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");
        let err = FsLister.list(missing.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ListError::NotFound { .. }));
        assert!(err.is_recoverable());
    }

    #[cfg(unix)]
    #[test]
    fn test_fs_lister_symlink_not_followed() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("real")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link")).unwrap();

        let listing = FsLister.list(dir.path().to_str().unwrap()).unwrap();
        let link = listing.entries.iter().find(|e| e.name == "link").unwrap();
        assert_eq!(link.entry_type, EntryType::Symlink);
        assert!(!link.entry_type.is_dir());
    }
}
