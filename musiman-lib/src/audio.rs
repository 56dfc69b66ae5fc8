use std::collections::BTreeSet;

/// Sniffed extensions accepted as music by default.
pub const DEFAULT_MUSIC_TYPES: [&str; 11] = [
    // MPEG-1/2 Audio Layer III
    "mp3",
    // Ogg
    "ogg", "oga",
    // Windows Media Audio
    "wma",
    // Free Lossless Audio Codec
    "flac",
    // Waveform Audio File Format
    "wav",
    // Audio Interchange File Format and its relatives
    "aiff", "aif", "aifc", "snd", "iff",
];

/// Closed allowlist of file type extensions that count as music.
///
/// Matching is exact and case sensitive, so entries are expected to be lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MusicTypes(BTreeSet<String>);

impl MusicTypes {
    pub fn new<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(types.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, extension: &str) -> bool {
        self.0.contains(extension)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for MusicTypes {
    fn default() -> Self {
        Self::new(DEFAULT_MUSIC_TYPES)
    }
}
