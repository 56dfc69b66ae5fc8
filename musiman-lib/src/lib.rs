//! Catalogs music files below a directory, identified by their content rather than their names.

pub mod audio;
pub mod catalog;
pub mod config;
pub mod hash;
pub mod record;
pub mod scan;
pub mod sniff;
mod store;
pub mod validate;

pub use audio::MusicTypes;
pub use catalog::{Catalog, Error, ScanSummary, StoreError};
pub use config::ScanConfig;
pub use record::{FileRecord, HASH_SIZE};
pub use scan::{scan, Candidate, Scan, ScanError};
pub use sniff::{FileFormatSniffer, FileType, SniffError, Sniffed, TypeSniffer};
pub use validate::{ValidationError, Validator};
