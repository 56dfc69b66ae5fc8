//! Structural and security checks applied before a record is persisted.

use chrono::{DateTime, Utc};
use displaydoc::Display;
use thiserror::Error;

use crate::audio::MusicTypes;
use crate::record::{FileRecord, HASH_SIZE};


/// Characters that have a special meaning to common shells.
const FORBIDDEN_CHARACTERS: &str = "*?[]\"<>|(){}&'!;";

/// Substrings that denote a `.` or `..` path element.
const DOT_SEGMENTS: [&str; 4] = ["/../", "/./", "\\..\\", "\\.\\"];

/// Record field a validation error refers to.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// path
    Path,
    /// hash
    Hash,
    /// media type
    MediaType,
    /// size
    Size,
    /// mod time
    Mod,
}

/// Whether a field was absent or present but malformed.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Cause {
    /// missing argument value
    MissingArgumentValue,
    /// invalid argument value
    InvalidArgumentValue,
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum PathViolation {
    /// path is not valid UTF-8
    NotUtf8,
    /// path contains ASCII control characters
    ControlCharacter,
    /// path starts with a dash
    LeadingDash,
    /// path contains the problematic character {0:?}
    ForbiddenCharacter(char),
    /// path starts with a tilde
    LeadingTilde,
    /// path contains "." or ".." as an element
    DotSegment,
    /// path contains ":"
    Colon,
    /// path contains ":" after the drive name
    ColonAfterDrive,
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum HashViolation {
    /// content hash must consist of exactly {expected} bytes, but is {actual} bytes
    Length { expected: usize, actual: usize },
    /// content hash must not be zero
    Zero,
}

#[derive(Debug, Error, Display, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// {0} must not be empty
    Missing(Field),
    /// {path:?} is not a valid file path: {violation}
    InvalidPath {
        path: String,
        violation: PathViolation,
    },
    /// invalid hash: {0}
    InvalidHash(HashViolation),
    /// unknown or unsupported media type {0:?}
    InvalidMediaType(String),
}

impl ValidationError {
    /// The field that failed validation.
    pub fn field(&self) -> Field {
        match self {
            ValidationError::Missing(field) => *field,
            ValidationError::InvalidPath { .. } => Field::Path,
            ValidationError::InvalidHash(_) => Field::Hash,
            ValidationError::InvalidMediaType(_) => Field::MediaType,
        }
    }

    pub fn cause(&self) -> Cause {
        match self {
            ValidationError::Missing(_) => Cause::MissingArgumentValue,
            _ => Cause::InvalidArgumentValue,
        }
    }
}

/// Checks [`FileRecord`]s against a set of accepted media types.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    music_types: MusicTypes,
}

impl Validator {
    pub fn new(music_types: MusicTypes) -> Self {
        Self { music_types }
    }

    pub fn music_types(&self) -> &MusicTypes {
        &self.music_types
    }

    /// Validates `record`, reporting the first violation found.
    ///
    /// Presence of every field is checked before the content of any field.
    pub fn validate(&self, record: &FileRecord) -> Result<(), ValidationError> {
        if record.path.as_os_str().is_empty() {
            return Err(ValidationError::Missing(Field::Path));
        }
        if record.hash.is_empty() {
            return Err(ValidationError::Missing(Field::Hash));
        }
        if record.media_type.is_empty() {
            return Err(ValidationError::Missing(Field::MediaType));
        }
        if record.size == 0 {
            return Err(ValidationError::Missing(Field::Size));
        }
        if record.modified == DateTime::<Utc>::UNIX_EPOCH {
            return Err(ValidationError::Missing(Field::Mod));
        }

        let path = record
            .path
            .to_str()
            .ok_or_else(|| ValidationError::InvalidPath {
                path: record.path.to_string_lossy().into_owned(),
                violation: PathViolation::NotUtf8,
            })?;
        validate_path(path).map_err(|violation| ValidationError::InvalidPath {
            path: path.to_string(),
            violation,
        })?;

        validate_hash(&record.hash).map_err(ValidationError::InvalidHash)?;

        if !self.music_types.contains(&record.media_type) {
            return Err(ValidationError::InvalidMediaType(record.media_type.clone()));
        }

        Ok(())
    }
}

/// Rejects paths that are awkward or dangerous to handle in shells and scripts.
///
/// Based on <https://dwheeler.com/essays/fixing-unix-linux-filenames.html>.
pub fn validate_path(path: &str) -> Result<(), PathViolation> {
    if path.chars().any(|c| c.is_ascii_control()) {
        return Err(PathViolation::ControlCharacter);
    }
    if path.starts_with('-') {
        return Err(PathViolation::LeadingDash);
    }
    if let Some(c) = path.chars().find(|c| FORBIDDEN_CHARACTERS.contains(*c)) {
        return Err(PathViolation::ForbiddenCharacter(c));
    }
    if path.starts_with('~') {
        return Err(PathViolation::LeadingTilde);
    }
    if DOT_SEGMENTS.iter().any(|segment| path.contains(segment)) {
        return Err(PathViolation::DotSegment);
    }

    // A single colon is allowed right after a Windows drive letter.
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        if path[2..].contains(':') {
            return Err(PathViolation::ColonAfterDrive);
        }
    } else if path.contains(':') {
        return Err(PathViolation::Colon);
    }

    Ok(())
}

fn validate_hash(hash: &[u8]) -> Result<(), HashViolation> {
    if hash.len() != HASH_SIZE {
        return Err(HashViolation::Length {
            expected: HASH_SIZE,
            actual: hash.len(),
        });
    }
    if hash.iter().all(|b| *b == 0) {
        return Err(HashViolation::Zero);
    }
    Ok(())
}
