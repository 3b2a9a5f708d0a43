use crate::domain::entities::reflection::{ReflectionEntry, ReflectionLevel};
use crate::domain::error::DomainError;
use crate::domain::ports::reflection_repository::ReflectionRepository;
use crate::infrastructure::sqlite::{lock, parse_ts, ts, SharedConn};
use rusqlite::params;

pub struct SqliteReflectionRepo {
    conn: SharedConn,
}

impl SqliteReflectionRepo {
    pub fn new(conn: SharedConn) -> Self {
        Self { conn }
    }

    fn row_to_entry(row: &rusqlite::Row) -> Result<ReflectionEntry, rusqlite::Error> {
        let timestamp: String = row.get(1)?;
        let level: u8 = row.get(2)?;
        Ok(ReflectionEntry {
            id: Some(row.get(0)?),
            timestamp: parse_ts(&timestamp)?,
            level: ReflectionLevel::try_from(level).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    2,
                    rusqlite::types::Type::Integer,
                    Box::<dyn std::error::Error + Send + Sync>::from(e),
                )
            })?,
            text: row.get(3)?,
            regime: row.get(4)?,
            performance_summary: row.get(5)?,
        })
    }
}

impl ReflectionRepository for SqliteReflectionRepo {
    fn insert(&self, entry: &ReflectionEntry) -> Result<i64, DomainError> {
        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO reflections (timestamp, level, text, regime, performance_summary)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                ts(&entry.timestamp),
                entry.level.as_u8(),
                entry.text,
                entry.regime,
                entry.performance_summary,
            ],
        )
        .map_err(|e| DomainError::Database(format!("Failed to store reflection: {e}")))?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(id)
    }

    fn latest(&self, level: ReflectionLevel, limit: usize) -> Result<Vec<ReflectionEntry>, DomainError> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT id, timestamp, level, text, regime, performance_summary
             FROM reflections WHERE level = ?1 ORDER BY id DESC LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![level.as_u8(), limit as i64], Self::row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn count_since_last_cross_trial(&self) -> Result<usize, DomainError> {
        let conn = lock(&self.conn)?;
        let n: i64 = conn.query_row(
            "SELECT COUNT(*) FROM reflections
             WHERE level = 1
               AND id > COALESCE((SELECT MAX(id) FROM reflections WHERE level = 2), 0)",
            [],
            |r| r.get(0),
        )?;
        Ok(n as usize)
    }

    fn count(&self) -> Result<usize, DomainError> {
        let conn = lock(&self.conn)?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM reflections", [], |r| r.get(0))?;
        Ok(n as usize)
    }
}
