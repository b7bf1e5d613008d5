// src/core/directory.rs

//! Read-only access to the served directory: enumeration, the bracketed listing
//! format, exact-name lookup and bounded file reads.

use crate::core::FtServeError;
use bytes::Bytes;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// The result of looking a requested name up among the directory's entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Missing,
    /// The name exists but is a directory or some other non-file entry.
    NotAFile,
    File { path: PathBuf, len: u64 },
}

/// Lists every entry of `root` except the self and parent entries and names
/// that are not valid UTF-8, sorted so the order is stable within one listing.
pub async fn list_entries(root: &Path) -> Result<Vec<String>, FtServeError> {
    let mut dir = tokio::fs::read_dir(root).await?;
    let mut names = Vec::new();
    while let Some(entry) = dir.next_entry().await? {
        // A name that is not valid UTF-8 could not be requested back by a
        // client, so it is left out of the listing.
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if name == "." || name == ".." {
            continue;
        }
        names.push(name);
    }
    names.sort();
    Ok(names)
}

/// Wraps each name as `[name] ` and concatenates them.
pub fn format_listing(entries: &[String]) -> String {
    let mut listing = String::with_capacity(entries.iter().map(|e| e.len() + 3).sum());
    for entry in entries {
        listing.push('[');
        listing.push_str(entry);
        listing.push_str("] ");
    }
    listing
}

/// Finds `filename` among the entries of `root` by exact equality. Names that
/// merely share a prefix with an entry, or that contain path separators, never match.
pub async fn find_entry(root: &Path, filename: &str) -> Result<Lookup, FtServeError> {
    if filename.is_empty() || filename == "." || filename == ".." {
        return Ok(Lookup::Missing);
    }

    let wanted = OsStr::new(filename);
    let mut dir = tokio::fs::read_dir(root).await?;
    while let Some(entry) = dir.next_entry().await? {
        if entry.file_name() != wanted {
            continue;
        }
        let path = entry.path();
        // Follow symlinks so a link to a regular file is served like the file.
        // A dangling link has no target metadata and is not a file.
        let Ok(metadata) = tokio::fs::metadata(&path).await else {
            return Ok(Lookup::NotAFile);
        };
        if !metadata.is_file() {
            return Ok(Lookup::NotAFile);
        }
        return Ok(Lookup::File {
            path,
            len: metadata.len(),
        });
    }
    Ok(Lookup::Missing)
}

/// Reads a whole file into memory, refusing files larger than `max_len`.
pub async fn read_file(path: &Path, max_len: usize) -> Result<Bytes, FtServeError> {
    let len = tokio::fs::metadata(path).await?.len();
    if len > max_len as u64 {
        return Err(FtServeError::MessageTooLarge {
            size: usize::try_from(len).unwrap_or(usize::MAX),
            max: max_len,
        });
    }
    let contents = tokio::fs::read(path).await?;
    if contents.len() > max_len {
        return Err(FtServeError::MessageTooLarge {
            size: contents.len(),
            max: max_len,
        });
    }
    Ok(Bytes::from(contents))
}
