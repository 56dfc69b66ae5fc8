use chrono::{DateTime, Utc};
use const_format::formatcp;
use rusqlite::{named_params, Connection, Error, OptionalExtension, Row};

use super::converters::{HashSql, PathBufSql};

const COLUMNS: &str = "path, hash, media_type, size, mod";

/// Low level type for interacting with file rows
#[derive(Debug)]
pub(crate) struct FileSql {
    pub path: PathBufSql,
    pub hash: HashSql,
    pub media_type: String,
    pub size: u64,
    pub modified: DateTime<Utc>,
}

impl FileSql {
    pub fn create_table(conn: &Connection) -> Result<(), Error> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS files (
                    path TEXT NOT NULL PRIMARY KEY,
                    hash BLOB NOT NULL,
                    media_type TEXT NOT NULL,
                    size INTEGER NOT NULL,
                    mod TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Inserts the row, failing with a constraint violation if the path is taken.
    pub fn insert(&self, conn: &Connection) -> Result<(), Error> {
        let mut stmt = conn.prepare_cached(formatcp!(
            "INSERT INTO files ({COLUMNS}) \
            VALUES (:path, :hash, :media_type, :size, :mod)"
        ))?;
        stmt.execute(named_params! {
            ":path": self.path,
            ":hash": self.hash,
            ":media_type": self.media_type,
            ":size": self.size,
            ":mod": self.modified,
        })?;
        Ok(())
    }

    pub fn get_rows(conn: &Connection) -> Result<Vec<FileSql>, Error> {
        let mut stmt = conn.prepare(formatcp!("SELECT {COLUMNS} FROM files ORDER BY path"))?;
        let rows = stmt
            .query_map([], |row| FileSql::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn get_by_path(conn: &Connection, path: &PathBufSql) -> Result<Option<FileSql>, Error> {
        conn.query_row(
            formatcp!("SELECT {COLUMNS} FROM files WHERE path = :path"),
            named_params! { ":path": path },
            |row| FileSql::try_from(row),
        )
        .optional()
    }

    pub fn count(conn: &Connection) -> Result<u64, Error> {
        conn.query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))
    }
}

impl TryFrom<&Row<'_>> for FileSql {
    type Error = Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            path: row.get(0)?,
            hash: row.get(1)?,
            media_type: row.get(2)?,
            size: row.get(3)?,
            modified: row.get(4)?,
        })
    }
}
