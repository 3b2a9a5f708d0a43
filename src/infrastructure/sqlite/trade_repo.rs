use crate::domain::entities::trade::{TradeLogEntry, TradeRecord};
use crate::domain::error::DomainError;
use crate::domain::ports::trade_repository::*;
use crate::domain::values::trade_action::TradeAction;
use crate::infrastructure::sqlite::{lock, parse_col, parse_ts, ts, SharedConn};
use rusqlite::params;

const COLUMNS: &str = "id, timestamp, action, instrument, price, quantity, fee, cost, proceeds, \
     net_worth_after, portfolio_snapshot, decision, regime, confidence, risk_verdict";

pub struct SqliteTradeRepo {
    conn: SharedConn,
}

impl SqliteTradeRepo {
    pub fn new(conn: SharedConn) -> Self {
        Self { conn }
    }

    fn row_to_entry(row: &rusqlite::Row) -> Result<TradeLogEntry, rusqlite::Error> {
        let timestamp: String = row.get(1)?;
        let action: String = row.get(2)?;
        let snapshot: String = row.get(10)?;
        let decision: String = row.get(11)?;
        let verdict: Option<String> = row.get(14)?;
        let confidence: i64 = row.get(13)?;

        Ok(TradeLogEntry {
            id: Some(row.get(0)?),
            record: TradeRecord {
                timestamp: parse_ts(&timestamp)?,
                action: parse_col::<TradeAction>(2, &action)?,
                instrument: row.get(3)?,
                price: row.get(4)?,
                quantity: row.get(5)?,
                fee: row.get(6)?,
                cost: row.get(7)?,
                proceeds: row.get(8)?,
            },
            net_worth_after: row.get(9)?,
            portfolio_snapshot: serde_json::from_str(&snapshot).unwrap_or(serde_json::Value::Null),
            decision: serde_json::from_str(&decision).unwrap_or(serde_json::Value::Null),
            regime: row.get(12)?,
            confidence: confidence.clamp(0, u8::MAX as i64) as u8,
            risk_verdict: verdict.and_then(|v| serde_json::from_str(&v).ok()),
        })
    }
}

impl TradeRepository for SqliteTradeRepo {
    fn add_trade(&self, entry: &TradeLogEntry) -> Result<i64, DomainError> {
        if entry.record.action.is_hold() {
            return Err(DomainError::InvalidInput("HOLD is not a trade".into()));
        }
        let snapshot = serde_json::to_string(&entry.portfolio_snapshot)?;
        let decision = serde_json::to_string(&entry.decision)?;
        let verdict = entry
            .risk_verdict
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;
        let r = &entry.record;
        tx.execute(
            "INSERT INTO trades (timestamp, action, instrument, price, quantity, fee, cost, proceeds,
                                 net_worth_after, portfolio_snapshot, decision, regime, confidence, risk_verdict)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                ts(&r.timestamp),
                r.action.to_string(),
                r.instrument,
                r.price,
                r.quantity,
                r.fee,
                r.cost,
                r.proceeds,
                entry.net_worth_after,
                snapshot,
                decision,
                entry.regime,
                entry.confidence as i64,
                verdict,
            ],
        )
        .map_err(|e| DomainError::Database(format!("Failed to add trade: {e}")))?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(id)
    }

    fn list_trades(&self, filter: &TradeFilter) -> Result<Vec<TradeLogEntry>, DomainError> {
        let conn = lock(&self.conn)?;
        let mut sql = format!("SELECT {COLUMNS} FROM trades WHERE 1=1");
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(since) = &filter.since {
            sql.push_str(&format!(" AND timestamp >= ?{}", param_values.len() + 1));
            param_values.push(Box::new(ts(since)));
        }
        if let Some(until) = &filter.until {
            sql.push_str(&format!(" AND timestamp < ?{}", param_values.len() + 1));
            param_values.push(Box::new(ts(until)));
        }
        if let Some(instrument) = &filter.instrument {
            sql.push_str(&format!(" AND UPPER(instrument) = ?{}", param_values.len() + 1));
            param_values.push(Box::new(instrument.to_uppercase()));
        }
        // Newest N, then flipped so callers always see oldest first.
        sql.push_str(" ORDER BY timestamp DESC, id DESC");
        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT ?{}", param_values.len() + 1));
            param_values.push(Box::new(limit as i64));
        }

        let params_refs: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let mut trades = stmt
            .query_map(params_refs.as_slice(), Self::row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;
        trades.reverse();
        Ok(trades)
    }

    fn count(&self) -> Result<usize, DomainError> {
        let conn = lock(&self.conn)?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM trades", [], |r| r.get(0))?;
        Ok(n as usize)
    }
}
