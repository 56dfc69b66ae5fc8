use std::path::{Path, PathBuf};

use displaydoc::Display;
use rusqlite::{ffi, Connection, ErrorCode};
use serde::Serialize;
use slog::{debug, info, o, warn, Logger};
use thiserror::Error;

use crate::config::ScanConfig;
use crate::hash::hash_file;
use crate::record::FileRecord;
use crate::scan::{scan, ScanError};
use crate::sniff::{FileFormatSniffer, FileType, TypeSniffer};
use crate::store::converters::PathBufSql;
use crate::store::file_sql::FileSql;
use crate::validate::{ValidationError, Validator};


#[derive(Debug, Error, Display)]
pub enum StoreError {
    /// invalid record: {0}
    Invalid(#[from] ValidationError),
    /// {0:?} is already cataloged
    DuplicatePath(PathBuf),
    /// rusqlite: {0}
    Rusqlite(#[from] rusqlite::Error),
}

#[derive(Debug, Error, Display)]
pub enum Error {
    /// scan: {0}
    Scan(#[from] ScanError),
    /// store: {0}
    Store(#[from] StoreError),
    /// rusqlite: {0}
    Rusqlite(#[from] rusqlite::Error),
}

/// Outcome of adding a directory to the catalog.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    /// Newly cataloged files.
    pub added: u64,
    /// Files whose path was already cataloged.
    pub duplicates: u64,
    /// Files that failed validation.
    pub rejected: u64,
    /// Files that disappeared or became unreadable before they could be hashed.
    pub unreadable: u64,
}

/// Durable catalog of music files backed by sqlite.
pub struct Catalog {
    connection: Connection,
    validator: Validator,
    logger: Logger,
}

impl Catalog {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, Error> {
        let connection = Connection::open(path)?;
        Self::new_impl(connection)
    }

    pub fn new_in_memory() -> Result<Self, Error> {
        let connection = Connection::open_in_memory()?;
        Self::new_impl(connection)
    }

    fn new_impl(connection: Connection) -> Result<Self, Error> {
        FileSql::create_table(&connection)?;
        Ok(Self {
            connection,
            validator: Validator::default(),
            logger: Logger::root(slog::Discard, o!()),
        })
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    /// Validates and stores a single record.
    ///
    /// Paths are unique: storing a second record for a cataloged path fails
    /// with [`StoreError::DuplicatePath`] and leaves the first one untouched.
    pub fn persist(&self, record: &FileRecord) -> Result<(), StoreError> {
        self.validator.validate(record)?;
        match FileSql::from(record).insert(&self.connection) {
            Ok(()) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _)) if is_path_conflict(&e) => {
                Err(StoreError::DuplicatePath(record.path.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// All cataloged files ordered by path.
    pub fn files(&self) -> Result<Vec<FileRecord>, StoreError> {
        Ok(FileSql::get_rows(&self.connection)?
            .into_iter()
            .map(|row| row.into())
            .collect())
    }

    pub fn get(&self, path: &Path) -> Result<Option<FileRecord>, StoreError> {
        let path: PathBufSql = path.to_path_buf().into();
        Ok(FileSql::get_by_path(&self.connection, &path)?.map(|row| row.into()))
    }

    pub fn count(&self) -> Result<u64, StoreError> {
        Ok(FileSql::count(&self.connection)?)
    }

    /// Catalogs every music file below `root`, detecting types with [`FileFormatSniffer`].
    pub fn add_directory(&self, root: &Path, config: &ScanConfig) -> Result<ScanSummary, Error> {
        self.add_directory_with(root, config, FileFormatSniffer)
    }

    /// Scans `root`, hashes each candidate and persists it.
    ///
    /// Files that are already cataloged or fail validation are counted and
    /// skipped. A scan error ends the run; files persisted before it stay in
    /// the catalog.
    pub fn add_directory_with<S: TypeSniffer>(
        &self,
        root: &Path,
        config: &ScanConfig,
        sniffer: S,
    ) -> Result<ScanSummary, Error> {
        let mut summary = ScanSummary::default();
        for candidate in scan(root, config, sniffer).with_logger(self.logger.clone()) {
            let candidate = candidate?;
            let hash = match hash_file(&candidate.path) {
                Ok(hash) => hash,
                Err(e) => {
                    warn!(self.logger, "failed to hash file"; "path" => candidate.path.display(), "error" => %e);
                    summary.unreadable += 1;
                    continue;
                }
            };
            let FileType {
                extension,
                media_type: mime,
                description,
            } = candidate.file_type;
            let record = FileRecord {
                path: candidate.path,
                hash,
                media_type: extension,
                size: candidate.size,
                modified: candidate.modified,
            };

            match self.persist(&record) {
                Ok(()) => {
                    debug!(self.logger, "cataloged file";
                        "path" => record.path.display(),
                        "type" => record.media_type.as_str(),
                        "mime" => mime.as_deref().unwrap_or("unknown"),
                        "description" => description.as_str()
                    );
                    summary.added += 1;
                }
                Err(StoreError::DuplicatePath(path)) => {
                    debug!(self.logger, "file already cataloged"; "path" => path.display());
                    summary.duplicates += 1;
                }
                Err(StoreError::Invalid(e)) => {
                    warn!(self.logger, "rejected file"; "path" => record.path.display(), "error" => %e);
                    summary.rejected += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
        info!(self.logger, "scan finished";
            "root" => root.display(),
            "added" => summary.added,
            "duplicates" => summary.duplicates,
            "rejected" => summary.rejected,
            "unreadable" => summary.unreadable
        );
        Ok(summary)
    }
}

fn is_path_conflict(e: &ffi::Error) -> bool {
    e.code == ErrorCode::ConstraintViolation
        && matches!(
            e.extended_code,
            ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE
        )
}
