//! SQLite-backed member table.

use std::path::Path;

use rusqlite::{Connection, params};
use tracing::debug;

use crate::{member::MemberRecord, types::MemberId};

use super::{PersistError, PersistResult, RecordSink, RecordSource};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS members (
    id          INTEGER PRIMARY KEY,
    first_name  TEXT NOT NULL,
    last_name   TEXT NOT NULL,
    email       TEXT NOT NULL
);
";

/// SQLite implementation of [`RecordSource`] and [`RecordSink`].
pub struct SqliteMemberTable {
    conn: Connection,
}

impl SqliteMemberTable {
    /// Opens or creates a SQLite member table at `path`.
    ///
    /// Enables WAL mode and sets `synchronous=NORMAL`.
    pub fn open(path: impl AsRef<Path>) -> PersistResult<Self> {
        let conn = Connection::open(path)?;
        Self::init_connection(conn)
    }

    /// Opens an in-memory table.
    pub fn open_in_memory() -> PersistResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_connection(conn)
    }

    fn init_connection(conn: Connection) -> PersistResult<Self> {
        conn.execute_batch(SCHEMA)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Ok(Self { conn })
    }

    /// Number of stored rows.
    pub fn row_count(&self) -> PersistResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM members", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl RecordSource for SqliteMemberTable {
    fn load_records(&mut self) -> PersistResult<Vec<MemberRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, first_name, last_name, email FROM members ORDER BY id ASC")?;

        let rows = stmt.query_map([], |row| {
            let id: i64 = row.get(0)?;
            Ok((
                id,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut out = Vec::new();
        for (line, row) in rows.enumerate() {
            let (id, first_name, last_name, email) = row?;
            let id = MemberId::try_from(id).map_err(|_| PersistError::InvalidIdentifier {
                line: line + 1,
                value: id.to_string(),
            })?;
            out.push(MemberRecord {
                id,
                first_name,
                last_name,
                email,
            });
        }
        debug!(rows = out.len(), "read member table");
        Ok(out)
    }
}

impl RecordSink for SqliteMemberTable {
    fn write_records(&mut self, records: &[MemberRecord]) -> PersistResult<usize> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM members", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO members(id, first_name, last_name, email) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for rec in records {
                stmt.execute(params![
                    i64::from(rec.id),
                    rec.first_name,
                    rec.last_name,
                    rec.email,
                ])?;
            }
        }
        tx.commit()?;
        debug!(rows = records.len(), "rewrote member table");
        Ok(records.len())
    }

    fn flush(&mut self) -> PersistResult<()> {
        self.conn.execute_batch("PRAGMA wal_checkpoint(PASSIVE);")?;
        Ok(())
    }
}
