/// SQLite-backed crosswalk table
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::bio::taxonomy::{MatchRecord, MatchType};
use crate::storage::traits::CrosswalkSink;
use crate::{Result, TaxbridgeError};

pub const CROSSWALK_TABLE: &str = "source_to_coldp_taxon_map";

pub struct SqliteSink {
    db_path: Option<PathBuf>,
    conn: Connection,
}

impl SqliteSink {
    /// Create or open a crosswalk database at the given path
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path)?;
        Self::configure_connection(&conn)?;
        Self::ensure_schema(&conn)?;

        Ok(Self {
            db_path: Some(db_path.to_path_buf()),
            conn,
        })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::ensure_schema(&conn)?;
        Ok(Self {
            db_path: None,
            conn,
        })
    }

    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "
            PRAGMA journal_mode=WAL;
            PRAGMA busy_timeout=30000;
            PRAGMA synchronous=NORMAL;
            ",
        )?;
        Ok(())
    }

    fn ensure_schema(conn: &Connection) -> Result<()> {
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {CROSSWALK_TABLE} (
                    source_taxon_id INTEGER NOT NULL,
                    col_taxon_id TEXT NOT NULL,
                    match_type TEXT NOT NULL,
                    match_score REAL,
                    source_scientific_name TEXT,
                    col_scientific_name TEXT,
                    PRIMARY KEY (source_taxon_id, col_taxon_id)
                )"
            ),
            [],
        )?;
        conn.execute(
            &format!(
                "CREATE INDEX IF NOT EXISTS idx_{CROSSWALK_TABLE}_col ON {CROSSWALK_TABLE}(col_taxon_id)"
            ),
            [],
        )?;
        Ok(())
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {CROSSWALK_TABLE}"),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Read the crosswalk back, ordered by source taxon
    pub fn read_all(&self) -> Result<Vec<MatchRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT source_taxon_id, col_taxon_id, match_type, match_score,
                    source_scientific_name, col_scientific_name
             FROM {CROSSWALK_TABLE}
             ORDER BY source_taxon_id, col_taxon_id"
        ))?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<f64>>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, Option<String>>(5)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (source_taxon_id, candidate_id, match_type, score, source_name, candidate_name) =
                row?;
            let match_type = MatchType::parse(&match_type).ok_or_else(|| {
                TaxbridgeError::Parse(format!("unknown match type '{}' in crosswalk", match_type))
            })?;
            records.push(MatchRecord {
                source_taxon_id,
                candidate_id,
                match_type,
                match_score: score.unwrap_or_default(),
                source_name: source_name.unwrap_or_default(),
                candidate_name: candidate_name.unwrap_or_default(),
            });
        }
        Ok(records)
    }
}

impl CrosswalkSink for SqliteSink {
    fn clear(&mut self) -> Result<()> {
        let deleted = self
            .conn
            .execute(&format!("DELETE FROM {CROSSWALK_TABLE}"), [])?;
        debug!("Cleared {} rows from {}", deleted, CROSSWALK_TABLE);
        Ok(())
    }

    fn append(&mut self, chunk: &[MatchRecord]) -> Result<()> {
        // Dropping the transaction without commit rolls the chunk back
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(&format!(
                "INSERT INTO {CROSSWALK_TABLE} (source_taxon_id, col_taxon_id, match_type,
                     match_score, source_scientific_name, col_scientific_name)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
            ))?;
            for record in chunk {
                stmt.execute(params![
                    record.source_taxon_id,
                    record.candidate_id,
                    record.match_type.as_str(),
                    record.match_score,
                    record.source_name,
                    record.candidate_name,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn describe(&self) -> String {
        match &self.db_path {
            Some(path) => format!("SQLite table {} in {}", CROSSWALK_TABLE, path.display()),
            None => format!("in-memory SQLite table {}", CROSSWALK_TABLE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(source_id: i64, candidate_id: &str) -> MatchRecord {
        MatchRecord {
            source_taxon_id: source_id,
            candidate_id: candidate_id.to_string(),
            match_type: MatchType::ExactNameRankAccepted,
            match_score: 1.0,
            source_name: format!("taxon {}", source_id),
            candidate_name: format!("taxon {}", source_id),
        }
    }

    #[test]
    fn test_append_and_read_back() {
        let mut sink = SqliteSink::in_memory().unwrap();
        sink.append(&[record(2, "B"), record(1, "A")]).unwrap();

        let records = sink.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].source_taxon_id, 1);
        assert_eq!(records[0].match_type, MatchType::ExactNameRankAccepted);
    }

    #[test]
    fn test_clear_replaces_previous_run() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("crosswalk.db");

        let mut sink = SqliteSink::open(&path).unwrap();
        sink.append(&[record(1, "A"), record(2, "B")]).unwrap();
        sink.clear().unwrap();
        sink.append(&[record(3, "C")]).unwrap();
        assert_eq!(sink.count().unwrap(), 1);
        drop(sink);

        let reopened = SqliteSink::open(&path).unwrap();
        assert_eq!(reopened.read_all().unwrap()[0].candidate_id, "C");
    }

    #[test]
    fn test_failed_chunk_rolls_back_only_itself() {
        let mut sink = SqliteSink::in_memory().unwrap();
        sink.append(&[record(1, "A")]).unwrap();

        // Duplicate primary key inside the second chunk
        let result = sink.append(&[record(2, "B"), record(2, "B")]);
        assert!(result.is_err());

        let records = sink.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source_taxon_id, 1);
    }
}
