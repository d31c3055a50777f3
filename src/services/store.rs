//! SQLite persistence for generated recommendations and prediction
//! history. Written once per successful generation; this service never
//! reads the rows back on the hot path.

use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, error, info};

use crate::types::{AnalystCounts, PredictionResult, Recommendation, RecommendationRecord};

pub struct RecommendationStore {
    conn: Mutex<Connection>,
}

impl RecommendationStore {
    /// Create a new store at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        info!("Recommendation store initialized");
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn new_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        debug!("In-memory recommendation store initialized");
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), rusqlite::Error> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS recommendations (
                id TEXT PRIMARY KEY,
                symbol TEXT NOT NULL,
                period TEXT NOT NULL,
                strong_buy INTEGER NOT NULL,
                buy INTEGER NOT NULL,
                hold INTEGER NOT NULL,
                sell INTEGER NOT NULL,
                strong_sell INTEGER NOT NULL,
                recommendation TEXT NOT NULL,
                metadata_json TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_recommendations_symbol
             ON recommendations(symbol)",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS prediction_history (
                symbol TEXT NOT NULL,
                forecast_days INTEGER NOT NULL,
                prediction_date TEXT NOT NULL,
                current_price REAL NOT NULL,
                predicted_price REAL NOT NULL,
                change_percent REAL NOT NULL,
                recommendation TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_prediction_history_symbol
             ON prediction_history(symbol, created_at DESC)",
            [],
        )?;

        Ok(())
    }

    /// Persist one recommendation record.
    pub fn save_recommendation(&self, record: &RecommendationRecord) -> Result<(), rusqlite::Error> {
        let conn = self.conn.lock().unwrap();
        let metadata_json = serde_json::to_string(&record.metadata).unwrap_or_default();

        conn.execute(
            "INSERT OR REPLACE INTO recommendations
             (id, symbol, period, strong_buy, buy, hold, sell, strong_sell,
              recommendation, metadata_json, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                record.id.to_string(),
                record.symbol,
                record.period.to_string(),
                record.counts.strong_buy,
                record.counts.buy,
                record.counts.hold,
                record.counts.sell,
                record.counts.strong_sell,
                record.recommendation.as_str(),
                metadata_json,
                record.created_at.to_rfc3339(),
                record.updated_at.to_rfc3339(),
            ],
        )?;
        debug!("Saved recommendation for {}", record.symbol);
        Ok(())
    }

    /// Archive one prediction result.
    pub fn save_prediction(&self, prediction: &PredictionResult) -> Result<(), rusqlite::Error> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO prediction_history
             (symbol, forecast_days, prediction_date, current_price,
              predicted_price, change_percent, recommendation, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                prediction.symbol,
                prediction.forecast_days,
                prediction.prediction_date.to_string(),
                prediction.current_price,
                prediction.predicted_price,
                prediction.change_percent,
                prediction.recommendation.as_str(),
                prediction.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Recent recommendations for a symbol, newest first.
    pub fn recent_recommendations(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Vec<(String, AnalystCounts, Recommendation)> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = match conn.prepare(
            "SELECT symbol, strong_buy, buy, hold, sell, strong_sell, recommendation
             FROM recommendations WHERE symbol = ?1
             ORDER BY created_at DESC LIMIT ?2",
        ) {
            Ok(stmt) => stmt,
            Err(e) => {
                error!("Error preparing recommendation query: {}", e);
                return Vec::new();
            }
        };

        let rows = stmt.query_map(params![symbol, limit], |row| {
            let label: String = row.get(6)?;
            Ok((
                row.get::<_, String>(0)?,
                AnalystCounts {
                    strong_buy: row.get(1)?,
                    buy: row.get(2)?,
                    hold: row.get(3)?,
                    sell: row.get(4)?,
                    strong_sell: row.get(5)?,
                },
                Recommendation::from_str(&label).unwrap_or(Recommendation::Hold),
            ))
        });

        match rows {
            Ok(mapped) => mapped.filter_map(|r| r.ok()).collect(),
            Err(e) => {
                error!("Error querying recommendations: {}", e);
                Vec::new()
            }
        }
    }
}
