//! Database Connection Pool Module
//!
//! PostgreSQL connection pooling using deadpool-postgres, and the
//! `PgEventRepository` storage engine built on it.
//!
//! Events live in a single `event` table keyed by `event_id`, with an index on
//! `user_id` for the per-user lookup. `TIMESTAMP` columns hold microseconds,
//! so sub-microsecond digits are truncated by the engine and the returned
//! record reflects what was actually stored.

use async_trait::async_trait;
use deadpool_postgres::{
    Config, ManagerConfig, Pool, PoolConfig, PoolError, RecyclingMethod, Runtime, Timeouts,
};
use eventlog_core::{truncate_to_micros, Event, EventType, LocalTimestamp, RepositoryError};
use eventlog_storage::{EventRepository, RepositoryResult};
use std::time::Duration;
use tokio_postgres::{NoTls, Row};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// PostgreSQL host
    pub host: String,
    /// PostgreSQL port
    pub port: u16,
    /// Database name
    pub dbname: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Connection timeout
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "eventlog".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: 16,
            timeout: Duration::from_secs(30),
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("EVENTLOG_DB_HOST").unwrap_or(defaults.host),
            port: std::env::var("EVENTLOG_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            dbname: std::env::var("EVENTLOG_DB_NAME").unwrap_or(defaults.dbname),
            user: std::env::var("EVENTLOG_DB_USER").unwrap_or(defaults.user),
            password: std::env::var("EVENTLOG_DB_PASSWORD").unwrap_or(defaults.password),
            max_size: std::env::var("EVENTLOG_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_size),
            timeout: std::env::var("EVENTLOG_DB_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }

    /// Create a connection pool from this configuration.
    ///
    /// No connection is opened until the first checkout.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });
        cfg.pool = Some(PoolConfig {
            max_size: self.max_size,
            timeouts: Timeouts {
                wait: Some(self.timeout),
                create: Some(self.timeout),
                recycle: Some(self.timeout),
            },
            ..PoolConfig::default()
        });

        cfg.create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::internal_error(format!("Failed to create pool: {}", e)))
    }
}

// ============================================================================
// SCHEMA
// ============================================================================

const CREATE_EVENT_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS event (
        event_id     UUID PRIMARY KEY,
        user_id      UUID NOT NULL,
        event_type   TEXT NOT NULL,
        \"time\"     TIMESTAMP NOT NULL,
        content_hash BIGINT NOT NULL
    )";

const CREATE_USER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS event_user_id_idx ON event (user_id)";

const UPSERT_EVENT: &str = "
    INSERT INTO event (event_id, user_id, event_type, \"time\", content_hash)
    VALUES ($1, $2, $3, $4, $5)
    ON CONFLICT (event_id) DO UPDATE SET
        user_id = EXCLUDED.user_id,
        event_type = EXCLUDED.event_type,
        \"time\" = EXCLUDED.\"time\",
        content_hash = EXCLUDED.content_hash
    RETURNING event_id, user_id, event_type, \"time\", content_hash";

const SELECT_EVENT_BY_ID: &str = "
    SELECT event_id, user_id, event_type, \"time\", content_hash
    FROM event
    WHERE event_id = $1";

const SELECT_EVENTS_BY_USER: &str = "
    SELECT event_id, user_id, event_type, \"time\", content_hash
    FROM event
    WHERE user_id = $1
    ORDER BY \"time\", event_id";

// ============================================================================
// POSTGRES EVENT REPOSITORY
// ============================================================================

/// `EventRepository` backed by a PostgreSQL connection pool.
#[derive(Clone)]
pub struct PgEventRepository {
    pool: Pool,
}

impl PgEventRepository {
    /// Create a new repository with the given pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a new repository from configuration.
    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        let pool = config.create_pool()?;
        Ok(Self::new(pool))
    }

    /// Get the current pool size for observability.
    pub fn pool_size(&self) -> usize {
        self.pool.status().size
    }

    /// Create the `event` table and its user index if they do not exist.
    pub async fn migrate(&self) -> RepositoryResult<()> {
        let conn = self.get_conn().await?;
        conn.batch_execute(&format!("{};\n{};", CREATE_EVENT_TABLE, CREATE_USER_INDEX))
            .await
            .map_err(map_pg_error)?;
        tracing::info!("Event schema is up to date");
        Ok(())
    }

    /// Get a connection from the pool.
    async fn get_conn(&self) -> RepositoryResult<deadpool_postgres::Object> {
        self.pool.get().await.map_err(map_pool_error)
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn save(&self, event: &Event) -> RepositoryResult<Event> {
        let conn = self.get_conn().await?;
        let stored = storable_event(event);
        let event_type = stored.event_type().as_str();
        let time = stored.time();
        let content_hash = hash_to_column(stored.content_hash());

        let row = conn
            .query_one(
                UPSERT_EVENT,
                &[
                    &stored.event_id(),
                    &stored.user_id(),
                    &event_type,
                    &time,
                    &content_hash,
                ],
            )
            .await
            .map_err(map_pg_error)?;

        event_from_row(&row)
    }

    async fn find_by_id(&self, event_id: Uuid) -> RepositoryResult<Option<Event>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(SELECT_EVENT_BY_ID, &[&event_id])
            .await
            .map_err(map_pg_error)?;

        row.as_ref().map(event_from_row).transpose()
    }

    async fn find_all_by_user_id(&self, user_id: Uuid) -> RepositoryResult<Vec<Event>> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query(SELECT_EVENTS_BY_USER, &[&user_id])
            .await
            .map_err(map_pg_error)?;

        rows.iter().map(event_from_row).collect()
    }

    async fn health_check(&self) -> RepositoryResult<()> {
        let conn = self.get_conn().await?;
        conn.simple_query("SELECT 1").await.map_err(map_pg_error)?;
        Ok(())
    }
}

// ============================================================================
// ROW MAPPING
// ============================================================================

/// The event as the `event` table can hold it, with its hash recomputed.
fn storable_event(event: &Event) -> Event {
    let time = truncate_to_micros(event.time());
    if time == event.time() {
        event.clone()
    } else {
        event.clone().with_time(time)
    }
}

/// BIGINT is signed; the hash round-trips through its two's complement bits.
fn hash_to_column(hash: u64) -> i64 {
    hash as i64
}

fn hash_from_column(value: i64) -> u64 {
    value as u64
}

fn event_from_row(row: &Row) -> RepositoryResult<Event> {
    let event_id: Uuid = row.try_get("event_id").map_err(|e| corrupt("unknown", e))?;
    let id = event_id.to_string();

    let user_id: Uuid = row.try_get("user_id").map_err(|e| corrupt(&id, e))?;
    let raw_type: String = row.try_get("event_type").map_err(|e| corrupt(&id, e))?;
    let time: LocalTimestamp = row.try_get("time").map_err(|e| corrupt(&id, e))?;
    let stored_hash: i64 = row.try_get("content_hash").map_err(|e| corrupt(&id, e))?;

    let event_type: EventType = raw_type.parse().map_err(|e| corrupt(&id, e))?;
    let event = Event::new(event_id, event_type, user_id, time);

    if event.content_hash() != hash_from_column(stored_hash) {
        return Err(corrupt(&id, "content hash does not match stored fields"));
    }
    Ok(event)
}

fn corrupt(id: &str, reason: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::CorruptRecord {
        id: id.to_string(),
        reason: reason.to_string(),
    }
}

// ============================================================================
// ERROR MAPPING
// ============================================================================

/// Classify a driver error by SQLSTATE.
fn map_pg_error(err: tokio_postgres::Error) -> RepositoryError {
    if err.is_closed() {
        return RepositoryError::Connection {
            reason: err.to_string(),
        };
    }

    match err.as_db_error() {
        Some(db) if db.code().code().starts_with("23") => RepositoryError::ConstraintViolation {
            constraint: db.constraint().unwrap_or("unknown").to_string(),
            reason: db.message().to_string(),
        },
        Some(db) if db.code().code().starts_with("08") => RepositoryError::Connection {
            reason: db.message().to_string(),
        },
        Some(db) => RepositoryError::Query {
            reason: format!("{} ({})", db.message(), db.code().code()),
        },
        // No server response: the socket or TLS layer failed.
        None => RepositoryError::Connection {
            reason: err.to_string(),
        },
    }
}

fn map_pool_error(err: PoolError) -> RepositoryError {
    match err {
        PoolError::Backend(e) => map_pg_error(e),
        other => RepositoryError::Connection {
            reason: other.to_string(),
        },
    }
}
