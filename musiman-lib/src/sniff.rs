//! Content based file type detection.

use displaydoc::Display;
use file_format::FileFormat;
use serde::Serialize;
use thiserror::Error;

/// Descriptor of a detected file type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileType {
    /// Canonical lowercase extension, e.g. `mp3`.
    pub extension: String,
    /// MIME type, when the detector knows one.
    pub media_type: Option<String>,
    pub description: String,
}

#[derive(Debug, Error, Display)]
/// {0}
pub struct SniffError(pub Box<dyn std::error::Error + Send + Sync>);

/// Outcome of sniffing a byte prefix.
///
/// `Unknown` and `Failed` are kept apart because the scanner skips the former
/// and aborts on the latter.
#[derive(Debug)]
pub enum Sniffed {
    Matched(FileType),
    Unknown,
    Failed(SniffError),
}

/// Guesses a file type from the leading bytes of a file.
pub trait TypeSniffer {
    fn sniff(&self, prefix: &[u8]) -> Sniffed;
}

impl<T: TypeSniffer + ?Sized> TypeSniffer for &T {
    fn sniff(&self, prefix: &[u8]) -> Sniffed {
        (**self).sniff(prefix)
    }
}

/// [`TypeSniffer`] backed by the signature database of the `file-format` crate.
///
/// Extensions are reported with the spellings [`crate::MusicTypes`] uses, so a
/// Sun audio file is `snd` and a compressed AIFF is `aifc`. A prefix that
/// starts with an ID3v2 tag is reported as `mp3` even when the tag is too large
/// for the first audio frame to be part of the prefix.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileFormatSniffer;

impl TypeSniffer for FileFormatSniffer {
    fn sniff(&self, prefix: &[u8]) -> Sniffed {
        let format = FileFormat::from_bytes(prefix);
        // The fallback format for anything without a known signature
        if format == FileFormat::ArbitraryBinaryData {
            return Sniffed::Unknown;
        }
        let file_type = match format.extension() {
            "id3" => FileType {
                extension: "mp3".to_string(),
                media_type: Some("audio/mpeg".to_string()),
                description: "MPEG-1/2 Audio Layer 3".to_string(),
            },
            "au" => FileType {
                extension: "snd".to_string(),
                ..file_type(format)
            },
            "aiff" if prefix.get(8..12) == Some(b"AIFC".as_slice()) => FileType {
                extension: "aifc".to_string(),
                media_type: Some("audio/x-aifc".to_string()),
                description: "Audio Interchange File Format Compressed".to_string(),
            },
            _ => file_type(format),
        };
        Sniffed::Matched(file_type)
    }
}

fn file_type(format: FileFormat) -> FileType {
    FileType {
        extension: format.extension().to_string(),
        media_type: Some(format.media_type().to_string()),
        description: format.name().to_string(),
    }
}
