use crate::domain::error::DomainError;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<(), DomainError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS trades (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT NOT NULL,
            action TEXT NOT NULL CHECK (action IN ('BUY', 'SELL')),
            instrument TEXT NOT NULL,
            price REAL NOT NULL,
            quantity REAL NOT NULL,
            fee REAL NOT NULL,
            cost REAL,
            proceeds REAL,
            net_worth_after REAL NOT NULL,
            portfolio_snapshot TEXT NOT NULL,
            decision TEXT NOT NULL,
            regime TEXT NOT NULL,
            confidence INTEGER NOT NULL,
            risk_verdict TEXT
        );

        CREATE TABLE IF NOT EXISTS reflections (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT NOT NULL,
            level INTEGER NOT NULL CHECK (level IN (1, 2)),
            text TEXT NOT NULL,
            regime TEXT NOT NULL,
            performance_summary TEXT
        );

        CREATE TABLE IF NOT EXISTS price_snapshots (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT NOT NULL,
            instrument TEXT NOT NULL,
            price REAL NOT NULL,
            volume_24h REAL
        );

        CREATE TABLE IF NOT EXISTS signals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT NOT NULL,
            instrument TEXT NOT NULL,
            name TEXT NOT NULL,
            source TEXT NOT NULL,
            direction TEXT NOT NULL CHECK (direction IN ('bullish', 'bearish', 'neutral')),
            confidence REAL NOT NULL,
            raw_value REAL
        );

        CREATE TABLE IF NOT EXISTS signal_outcomes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            signal_id INTEGER NOT NULL REFERENCES signals(id),
            timeframe TEXT NOT NULL,
            price_at_signal REAL NOT NULL,
            price_at_eval REAL NOT NULL,
            price_change_pct REAL NOT NULL,
            direction_correct INTEGER NOT NULL,
            evaluated_at TEXT NOT NULL,
            UNIQUE (signal_id, timeframe)
        );

        CREATE INDEX IF NOT EXISTS idx_trades_timestamp ON trades(timestamp);
        CREATE INDEX IF NOT EXISTS idx_reflections_level ON reflections(level, id);
        CREATE INDEX IF NOT EXISTS idx_snapshots_instrument_ts ON price_snapshots(instrument, timestamp);
        CREATE INDEX IF NOT EXISTS idx_signals_instrument_ts ON signals(instrument, timestamp);
        CREATE INDEX IF NOT EXISTS idx_outcomes_evaluated ON signal_outcomes(evaluated_at);
        ",
    )
    .map_err(|e| DomainError::Database(format!("Migration failed: {e}")))
}
