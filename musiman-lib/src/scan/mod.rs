//! Recursive discovery of music files by content type.

use std::{
    fs::{File, Metadata},
    io::{self, Read},
    path::{Component, Path, PathBuf},
};

use chrono::{DateTime, Utc};
use displaydoc::Display;
use slog::{debug, o, trace, Logger};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

use crate::audio::MusicTypes;
use crate::config::ScanConfig;
use crate::sniff::{FileType, SniffError, Sniffed, TypeSniffer};

#[cfg(test)]
mod tests;

/// Number of leading bytes handed to the sniffer.
pub const PREFIX_LEN: usize = 1024;

#[derive(Debug, Error, Display)]
pub enum ScanError {
    /// walkdir: {0}
    Walkdir(#[from] walkdir::Error),
    /// failed to detect the type of {path:?}: {source}
    Sniffer { path: PathBuf, source: SniffError },
}

/// A file whose content was recognised as music.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    pub file_type: FileType,
    pub size: u64,
    pub modified: DateTime<Utc>,
}

/// Lazily walks `root` and yields music [`Candidate`]s.
///
/// Unreadable entries, unknown types and non-music types are skipped. The
/// iterator yields at most one error and is exhausted afterwards.
pub fn scan<'a, S: TypeSniffer>(root: &Path, config: &'a ScanConfig, sniffer: S) -> Scan<'a, S> {
    Scan::new(root, config, sniffer)
}

pub struct Scan<'a, S> {
    root: PathBuf,
    walker: walkdir::IntoIter,
    ignore_paths: Vec<PathBuf>,
    min_size: u64,
    music_types: &'a MusicTypes,
    sniffer: S,
    logger: Logger,
    failed: bool,
}

impl<'a, S: TypeSniffer> Scan<'a, S> {
    pub fn new(root: &Path, config: &'a ScanConfig, sniffer: S) -> Self {
        let ignore_paths = config
            .ignore_paths
            .iter()
            .map(|path| normalize(path.strip_prefix(root).unwrap_or(path)))
            .collect();
        Self {
            root: root.to_path_buf(),
            walker: WalkDir::new(root).sort_by_file_name().into_iter(),
            ignore_paths,
            min_size: config.min_size,
            music_types: &config.music_types,
            sniffer,
            logger: Logger::root(slog::Discard, o!()),
            failed: false,
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger.new(o!("root" => self.root.display().to_string()));
        self
    }

    fn is_ignored(&self, path: &Path) -> bool {
        let relative = normalize(path.strip_prefix(&self.root).unwrap_or(path));
        self.ignore_paths
            .iter()
            .any(|ignored| relative.starts_with(ignored))
    }

    /// Classifies a regular file, returning `Ok(None)` when it is skipped.
    fn classify(&self, entry: &DirEntry) -> Result<Option<Candidate>, ScanError> {
        let path = entry.path();
        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(e) => {
                debug!(self.logger, "skipping file without metadata"; "path" => path.display(), "error" => %e);
                return Ok(None);
            }
        };
        if metadata.len() < self.min_size {
            trace!(self.logger, "skipping small file"; "path" => path.display(), "size" => metadata.len());
            return Ok(None);
        }

        let prefix = match read_prefix(path) {
            Ok(prefix) if prefix.is_empty() => {
                trace!(self.logger, "skipping empty file"; "path" => path.display());
                return Ok(None);
            }
            Ok(prefix) => prefix,
            Err(e) => {
                debug!(self.logger, "skipping unreadable file"; "path" => path.display(), "error" => %e);
                return Ok(None);
            }
        };

        let file_type = match self.sniffer.sniff(&prefix) {
            Sniffed::Matched(file_type) => file_type,
            Sniffed::Unknown => {
                trace!(self.logger, "skipping file of unknown type"; "path" => path.display());
                return Ok(None);
            }
            Sniffed::Failed(source) => {
                return Err(ScanError::Sniffer {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        if !self.music_types.contains(&file_type.extension) {
            trace!(self.logger, "skipping non-music file"; "path" => path.display(), "type" => file_type.extension.as_str());
            return Ok(None);
        }

        let modified = match modified(&metadata) {
            Ok(modified) => modified,
            Err(e) => {
                debug!(self.logger, "skipping file without modification time"; "path" => path.display(), "error" => %e);
                return Ok(None);
            }
        };

        Ok(Some(Candidate {
            path: path.to_path_buf(),
            file_type,
            size: metadata.len(),
            modified,
        }))
    }
}

impl<S: TypeSniffer> Iterator for Scan<'_, S> {
    type Item = Result<Candidate, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                // Failing to stat or list the root means there is nothing to scan.
                Err(e) if e.depth() == 0 => {
                    self.failed = true;
                    return Some(Err(e.into()));
                }
                Err(e) => {
                    debug!(self.logger, "skipping unreadable entry"; "error" => %e);
                    continue;
                }
            };

            if self.is_ignored(entry.path()) {
                debug!(self.logger, "ignoring path"; "path" => entry.path().display());
                if entry.file_type().is_dir() {
                    self.walker.skip_current_dir();
                }
                continue;
            }
            if !entry.file_type().is_file() {
                continue;
            }

            match self.classify(&entry) {
                Ok(Some(candidate)) => return Some(Ok(candidate)),
                Ok(None) => continue,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Reads at most [`PREFIX_LEN`] bytes from the start of the file.
fn read_prefix(path: &Path) -> io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut prefix = Vec::with_capacity(PREFIX_LEN);
    file.take(PREFIX_LEN as u64).read_to_end(&mut prefix)?;
    Ok(prefix)
}

fn modified(metadata: &Metadata) -> io::Result<DateTime<Utc>> {
    metadata.modified().map(DateTime::<Utc>::from)
}

/// Lexically cleans a path: drops `.` components and folds `..` into its parent.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                _ => normalized.push(component),
            },
            _ => normalized.push(component),
        }
    }
    normalized
}
