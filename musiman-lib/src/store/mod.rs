//! Low level sqlite access for cataloged files.

pub(crate) mod converters;
pub(crate) mod file_sql;
