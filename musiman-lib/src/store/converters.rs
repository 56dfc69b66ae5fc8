//! Wrapper types for converting from higher level types to sql data types

use derive_more::{From, Into};
use std::{ffi::OsStr, path::PathBuf};

use rusqlite::{
    types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef},
    Error, ToSql,
};

#[derive(Debug, From, Into)]
pub(crate) struct HashSql(pub Vec<u8>);

impl ToSql for HashSql {
    fn to_sql(&self) -> Result<ToSqlOutput<'_>, Error> {
        Ok(self.0.as_slice().into())
    }
}

impl FromSql for HashSql {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Ok(HashSql(value.as_blob()?.to_vec()))
    }
}

#[derive(Debug, From, Into)]
pub(crate) struct PathBufSql(pub PathBuf);

impl ToSql for PathBufSql {
    fn to_sql(&self) -> Result<ToSqlOutput<'_>, Error> {
        let v: &OsStr = self.0.as_ref();
        <&str>::try_from(v)
            .map(|v| v.into())
            .map_err(|e| Error::ToSqlConversionFailure(e.into()))
    }
}

impl FromSql for PathBufSql {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Ok(PathBufSql(PathBuf::from(value.as_str()?)))
    }
}
