use std::path::PathBuf;

use crate::audio::MusicTypes;

/// Options for walking a directory in search of music.
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Files smaller than this many bytes are skipped; `0` disables the limit.
    pub min_size: u64,
    /// Subtrees to leave out, relative to the scan root.
    pub ignore_paths: Vec<PathBuf>,
    pub music_types: MusicTypes,
}

impl ScanConfig {
    pub fn with_min_size(mut self, min_size: u64) -> Self {
        self.min_size = min_size;
        self
    }

    pub fn with_ignore_paths<I, P>(mut self, ignore_paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.ignore_paths = ignore_paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_music_types(mut self, music_types: MusicTypes) -> Self {
        self.music_types = music_types;
        self
    }
}
