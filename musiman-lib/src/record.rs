use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_with::{hex::Hex, serde_as};

use crate::store::file_sql::FileSql;

/// Number of bytes in a content hash.
pub const HASH_SIZE: usize = 64;

/// A cataloged music file.
///
/// The hash is kept as a plain byte vector so that malformed values can be
/// represented and rejected by validation instead of by the type system.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub path: PathBuf,
    #[serde_as(as = "Hex")]
    pub hash: Vec<u8>,
    pub media_type: String,
    pub size: u64,
    pub modified: DateTime<Utc>,
}

impl From<FileSql> for FileRecord {
    fn from(value: FileSql) -> Self {
        Self {
            path: value.path.into(),
            hash: value.hash.into(),
            media_type: value.media_type,
            size: value.size,
            modified: value.modified,
        }
    }
}

impl From<&FileRecord> for FileSql {
    fn from(value: &FileRecord) -> Self {
        Self {
            path: value.path.clone().into(),
            hash: value.hash.clone().into(),
            media_type: value.media_type.clone(),
            size: value.size,
            modified: value.modified,
        }
    }
}
