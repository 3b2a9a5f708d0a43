use crate::domain::entities::signal::{LoggedSignal, PriceSnapshot, Signal, SignalOutcome};
use crate::domain::error::DomainError;
use crate::domain::ports::signal_repository::*;
use crate::domain::values::confidence::Confidence;
use crate::domain::values::direction::Direction;
use crate::domain::values::signal_source::SignalSource;
use crate::domain::values::timeframe::Timeframe;
use crate::infrastructure::sqlite::{lock, parse_col, parse_ts, ts, SharedConn};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

pub struct SqliteSignalRepo {
    conn: SharedConn,
}

impl SqliteSignalRepo {
    pub fn new(conn: SharedConn) -> Self {
        Self { conn }
    }

    fn row_to_signal(row: &rusqlite::Row) -> Result<LoggedSignal, rusqlite::Error> {
        let timestamp: String = row.get(1)?;
        let source: String = row.get(4)?;
        let direction: String = row.get(5)?;
        let confidence = Confidence::new(row.get(6)?).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Real, e.into())
        })?;
        Ok(LoggedSignal {
            id: row.get(0)?,
            timestamp: parse_ts(&timestamp)?,
            instrument: row.get(2)?,
            signal: Signal {
                name: row.get(3)?,
                source: parse_col::<SignalSource>(4, &source)?,
                direction: parse_col::<Direction>(5, &direction)?,
                confidence,
                raw_value: row.get(7)?,
            },
        })
    }

    fn row_to_outcome(row: &rusqlite::Row) -> Result<SignalOutcome, rusqlite::Error> {
        let timeframe: String = row.get(1)?;
        let evaluated_at: String = row.get(6)?;
        Ok(SignalOutcome {
            signal_id: row.get(0)?,
            timeframe: parse_col::<Timeframe>(1, &timeframe)?,
            price_at_signal: row.get(2)?,
            price_at_eval: row.get(3)?,
            price_change_pct: row.get(4)?,
            direction_correct: row.get::<_, i64>(5)? != 0,
            evaluated_at: parse_ts(&evaluated_at)?,
        })
    }
}

impl SignalRepository for SqliteSignalRepo {
    fn log_batch(&self, snapshot: &PriceSnapshot, signals: &[Signal]) -> Result<Vec<i64>, DomainError> {
        let stamp = ts(&snapshot.timestamp);
        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO price_snapshots (timestamp, instrument, price, volume_24h) VALUES (?1, ?2, ?3, ?4)",
            params![stamp, snapshot.instrument, snapshot.price, snapshot.volume_24h],
        )
        .map_err(|e| DomainError::Database(format!("Failed to log price snapshot: {e}")))?;

        let mut ids = Vec::with_capacity(signals.len());
        {
            let mut stmt = tx.prepare(
                "INSERT INTO signals (timestamp, instrument, name, source, direction, confidence, raw_value)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for s in signals {
                stmt.execute(params![
                    stamp,
                    snapshot.instrument,
                    s.name,
                    s.source.to_string(),
                    s.direction.to_string(),
                    s.confidence.value(),
                    s.raw_value,
                ])
                .map_err(|e| DomainError::Database(format!("Failed to log signal {}: {e}", s.name)))?;
                ids.push(tx.last_insert_rowid());
            }
        }
        tx.commit()?;
        Ok(ids)
    }

    fn unevaluated(
        &self,
        instrument: &str,
        timeframe: Timeframe,
        logged_before: DateTime<Utc>,
    ) -> Result<Vec<LoggedSignal>, DomainError> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT s.id, s.timestamp, s.instrument, s.name, s.source, s.direction, s.confidence, s.raw_value
             FROM signals s
             WHERE s.instrument = ?1
               AND s.timestamp <= ?2
               AND NOT EXISTS (
                   SELECT 1 FROM signal_outcomes o
                   WHERE o.signal_id = s.id AND o.timeframe = ?3
               )
             ORDER BY s.timestamp ASC, s.id ASC",
        )?;
        let rows = stmt
            .query_map(
                params![instrument, ts(&logged_before), timeframe.label()],
                Self::row_to_signal,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn price_at_or_before(&self, instrument: &str, at: DateTime<Utc>) -> Result<Option<f64>, DomainError> {
        let conn = lock(&self.conn)?;
        let price = conn
            .query_row(
                "SELECT price FROM price_snapshots
                 WHERE instrument = ?1 AND timestamp <= ?2
                 ORDER BY timestamp DESC, id DESC LIMIT 1",
                params![instrument, ts(&at)],
                |r| r.get::<_, f64>(0),
            )
            .optional()?;
        Ok(price)
    }

    fn insert_outcomes(&self, outcomes: &[SignalOutcome]) -> Result<usize, DomainError> {
        if outcomes.is_empty() {
            return Ok(0);
        }
        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;
        let mut written = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO signal_outcomes
                 (signal_id, timeframe, price_at_signal, price_at_eval, price_change_pct, direction_correct, evaluated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for o in outcomes {
                written += stmt
                    .execute(params![
                        o.signal_id,
                        o.timeframe.label(),
                        o.price_at_signal,
                        o.price_at_eval,
                        o.price_change_pct,
                        o.direction_correct as i64,
                        ts(&o.evaluated_at),
                    ])
                    .map_err(|e| DomainError::Database(format!("Failed to store outcome: {e}")))?;
            }
        }
        tx.commit()?;
        Ok(written)
    }

    fn count_outcomes(&self, instrument: &str, evaluated_since: DateTime<Utc>) -> Result<usize, DomainError> {
        let conn = lock(&self.conn)?;
        let n: i64 = conn.query_row(
            "SELECT COUNT(*) FROM signal_outcomes o
             JOIN signals s ON s.id = o.signal_id
             WHERE s.instrument = ?1 AND o.evaluated_at >= ?2",
            params![instrument, ts(&evaluated_since)],
            |r| r.get(0),
        )?;
        Ok(n as usize)
    }

    fn accuracy(
        &self,
        instrument: &str,
        evaluated_since: DateTime<Utc>,
        min_samples: usize,
    ) -> Result<Vec<AccuracyRow>, DomainError> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT s.name, o.timeframe, COUNT(*), SUM(o.direction_correct), AVG(o.price_change_pct)
             FROM signal_outcomes o
             JOIN signals s ON s.id = o.signal_id
             WHERE s.instrument = ?1 AND o.evaluated_at >= ?2
             GROUP BY s.name, o.timeframe
             HAVING COUNT(*) >= ?3
             ORDER BY s.name ASC",
        )?;
        let mut rows = stmt
            .query_map(
                params![instrument, ts(&evaluated_since), min_samples as i64],
                |row| {
                    let timeframe: String = row.get(1)?;
                    Ok(AccuracyRow {
                        name: row.get(0)?,
                        timeframe: parse_col::<Timeframe>(1, &timeframe)?,
                        samples: row.get::<_, i64>(2)? as usize,
                        correct: row.get::<_, i64>(3)? as usize,
                        avg_change_pct: row.get(4)?,
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;
        rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.timeframe.cmp(&b.timeframe)));
        Ok(rows)
    }

    fn outcomes_for(&self, signal_id: i64) -> Result<Vec<SignalOutcome>, DomainError> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT signal_id, timeframe, price_at_signal, price_at_eval, price_change_pct, direction_correct, evaluated_at
             FROM signal_outcomes WHERE signal_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt
            .query_map(params![signal_id], Self::row_to_outcome)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn counts(&self) -> Result<SignalCounts, DomainError> {
        let conn = lock(&self.conn)?;
        let count = |table: &str| -> Result<usize, rusqlite::Error> {
            conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get::<_, i64>(0))
                .map(|n| n as usize)
        };
        Ok(SignalCounts {
            signals: count("signals")?,
            price_snapshots: count("price_snapshots")?,
            signal_outcomes: count("signal_outcomes")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::sqlite::open;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_logged_confidence_reads_back() {
        let repo = SqliteSignalRepo::new(open(":memory:").unwrap());
        let snapshot = PriceSnapshot {
            timestamp: t0(),
            instrument: "SOL".into(),
            price: 100.0,
            volume_24h: None,
        };
        let signal = Signal::new("rsi_14", SignalSource::Technical, Direction::Bullish, 0.8, 22.0);
        repo.log_batch(&snapshot, &[signal]).unwrap();

        let pending = repo
            .unevaluated("SOL", Timeframe::FourHours, t0() + chrono::Duration::hours(5))
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].signal.confidence.value(), 0.8);
    }

    #[test]
    fn test_out_of_range_confidence_is_a_read_error() {
        let conn = open(":memory:").unwrap();
        lock(&conn)
            .unwrap()
            .execute(
                "INSERT INTO signals (timestamp, instrument, name, source, direction, confidence)
                 VALUES (?1, 'SOL', 'rsi_14', 'technical', 'bullish', 1.5)",
                params![ts(&t0())],
            )
            .unwrap();
        let repo = SqliteSignalRepo::new(conn);

        let err = repo
            .unevaluated("SOL", Timeframe::FourHours, t0() + chrono::Duration::hours(5))
            .unwrap_err();
        assert!(matches!(err, DomainError::Database(_)));
    }
}
