//! Postgres repository implementation using Diesel.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures, including serialization failures
//!   raised by concurrent booking transactions
//! - Connection health monitoring
//! - Automatic migration execution
//!
//! Booking writes run inside SERIALIZABLE transactions that re-check for
//! overlapping bookings before writing. A partial unique index on
//! `(event_type_id, start_time) WHERE status = 'confirmed'` backs this up for
//! identical start times.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel::upsert::excluded;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::task;

use crate::db::repository::{
    AvailabilityRepository, BookingRepository, ErrorContext, EventTypeRepository,
    RepositoryError, RepositoryResult,
};
use crate::models::{
    Availability, AvailabilityId, AvailabilityUpdate, Booking, BookingId, BookingStatus,
    ConflictPolicy, DateOverride, EventType, EventTypeId, EventTypeUpdate, HostId,
    NewAvailability, NewBooking, NewDateOverride, NewEventType, OverrideId, Reservation,
    StatusChange,
};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let defaults = Self::default();
        Ok(Self {
            database_url,
            max_pool_size: env_or("PG_POOL_MAX", defaults.max_pool_size),
            min_pool_size: env_or("PG_POOL_MIN", defaults.min_pool_size),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", defaults.connection_timeout_sec),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", defaults.idle_timeout_sec),
            max_retries: env_or("PG_MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: env_or("PG_RETRY_DELAY_MS", defaults.retry_delay_ms),
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Pool health statistics.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Number of connections currently in use
    pub connections_in_use: u32,
    /// Number of idle connections
    pub idle_connections: u32,
    /// Total number of connections in the pool
    pub total_connections: u32,
    /// Maximum pool size
    pub max_size: u32,
    /// Total successful queries executed
    pub total_queries: u64,
    /// Total failed queries
    pub failed_queries: u64,
    /// Total retried operations
    pub retried_operations: u64,
}

/// Diesel-backed repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
    // Metrics counters
    total_queries: std::sync::Arc<AtomicU64>,
    failed_queries: std::sync::Arc<AtomicU64>,
    retried_operations: std::sync::Arc<AtomicU64>,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        log::info!(
            "Postgres repository ready (pool max={}, retries={})",
            config.max_pool_size,
            config.max_retries
        );

        Ok(Self {
            pool,
            config,
            total_queries: std::sync::Arc::new(AtomicU64::new(0)),
            failed_queries: std::sync::Arc::new(AtomicU64::new(0)),
            retried_operations: std::sync::Arc::new(AtomicU64::new(0)),
        })
    }

    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Execute a database operation with automatic retry for transient failures.
    ///
    /// The closure is replayed from scratch on retry, so every transaction it opens
    /// re-reads current state.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;
        let total_queries = self.total_queries.clone();
        let failed_queries = self.failed_queries.clone();
        let retried_operations = self.retried_operations.clone();

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    retried_operations.fetch_add(1, Ordering::Relaxed);
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2; // Exponential backoff
                }

                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1)),
                        );
                        if attempt < max_retries {
                            last_error = Some(err);
                            continue;
                        }
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(err);
                    }
                };

                total_queries.fetch_add(1, Ordering::Relaxed);
                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        log::debug!("Retrying after transient error: {}", e);
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => {
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(e);
                    }
                }
            }

            failed_queries.fetch_add(1, Ordering::Relaxed);
            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }

    /// Get pool health statistics.
    pub fn get_pool_stats(&self) -> PoolStats {
        let state = self.pool.state();
        PoolStats {
            connections_in_use: state.connections - state.idle_connections,
            idle_connections: state.idle_connections,
            total_connections: state.connections,
            max_size: self.config.max_pool_size,
            total_queries: self.total_queries.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
            retried_operations: self.retried_operations.load(Ordering::Relaxed),
        }
    }

    pub async fn is_healthy(&self) -> bool {
        self.health_check().await.unwrap_or(false)
    }

    /// Returns a tuple of (is_healthy, latency_ms, error_message).
    pub async fn health_check_detailed(&self) -> (bool, Option<u64>, Option<String>) {
        let start = Instant::now();
        match self.health_check().await {
            Ok(true) => (true, Some(start.elapsed().as_millis() as u64), None),
            Ok(false) => (
                false,
                Some(start.elapsed().as_millis() as u64),
                Some("Health check returned false".to_string()),
            ),
            Err(e) => (
                false,
                Some(start.elapsed().as_millis() as u64),
                Some(e.to_string()),
            ),
        }
    }
}

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

fn not_found_or(
    entity: &'static str,
    id: i64,
) -> impl Fn(diesel::result::Error) -> RepositoryError {
    move |err| match err {
        diesel::result::Error::NotFound => RepositoryError::not_found_entity(entity, id),
        other => map_diesel_error(other),
    }
}

fn status_strings(policy: ConflictPolicy) -> Vec<String> {
    policy
        .blocking_statuses()
        .iter()
        .map(|s| s.as_str().to_string())
        .collect()
}

/// Attach rules and overrides to availability rows, preserving row order.
fn hydrate_availabilities(
    conn: &mut PgConnection,
    rows: Vec<AvailabilityRow>,
) -> RepositoryResult<Vec<Availability>> {
    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();

    let mut rules: HashMap<i64, Vec<RuleRow>> = HashMap::new();
    for rule in availability_rules::table
        .filter(availability_rules::availability_id.eq_any(ids.clone()))
        .order((availability_rules::day_of_week.asc(), availability_rules::id.asc()))
        .select(RuleRow::as_select())
        .load::<RuleRow>(conn)
        .map_err(map_diesel_error)?
    {
        rules.entry(rule.availability_id).or_default().push(rule);
    }

    let mut overrides: HashMap<i64, Vec<OverrideRow>> = HashMap::new();
    for row in date_overrides::table
        .filter(date_overrides::availability_id.eq_any(ids))
        .order(date_overrides::override_date.asc())
        .select(OverrideRow::as_select())
        .load::<OverrideRow>(conn)
        .map_err(map_diesel_error)?
    {
        overrides.entry(row.availability_id).or_default().push(row);
    }

    Ok(rows
        .into_iter()
        .map(|row| Availability {
            id: AvailabilityId(row.id),
            host_id: HostId(row.host_id),
            name: row.name,
            is_default: row.is_default,
            rules: rules
                .remove(&row.id)
                .unwrap_or_default()
                .into_iter()
                .map(Into::into)
                .collect(),
            overrides: overrides
                .remove(&row.id)
                .unwrap_or_default()
                .into_iter()
                .map(Into::into)
                .collect(),
        })
        .collect())
}

fn load_availability(conn: &mut PgConnection, id: i64) -> RepositoryResult<Availability> {
    let row = availabilities::table
        .find(id)
        .select(AvailabilityRow::as_select())
        .first::<AvailabilityRow>(conn)
        .map_err(not_found_or("availability", id))?;
    hydrate_availabilities(conn, vec![row])?
        .pop()
        .ok_or_else(|| RepositoryError::not_found_entity("availability", id))
}

fn clear_default_flags(
    conn: &mut PgConnection,
    host_id: i64,
    keep: Option<i64>,
) -> RepositoryResult<()> {
    diesel::update(
        availabilities::table
            .filter(availabilities::host_id.eq(host_id))
            .filter(availabilities::id.ne(keep.unwrap_or(-1))),
    )
    .set(availabilities::is_default.eq(false))
    .execute(conn)
    .map_err(map_diesel_error)?;
    Ok(())
}

fn load_booking(conn: &mut PgConnection, id: i64) -> RepositoryResult<Option<Booking>> {
    bookings::table
        .find(id)
        .select(BookingRow::as_select())
        .first::<BookingRow>(conn)
        .optional()
        .map_err(map_diesel_error)?
        .map(BookingRow::into_booking)
        .transpose()
}

fn query_conflict(
    conn: &mut PgConnection,
    event_type_id: i64,
    start: NaiveDateTime,
    end: NaiveDateTime,
    exclude: Option<i64>,
    policy: ConflictPolicy,
) -> RepositoryResult<Option<Booking>> {
    let mut query = bookings::table
        .filter(bookings::event_type_id.eq(event_type_id))
        .filter(bookings::status.eq_any(status_strings(policy)))
        .filter(bookings::start_time.lt(end))
        .filter(bookings::end_time.gt(start))
        .into_boxed();
    if let Some(exclude) = exclude {
        query = query.filter(bookings::id.ne(exclude));
    }

    query
        .order(bookings::start_time.asc())
        .select(BookingRow::as_select())
        .first::<BookingRow>(conn)
        .optional()
        .map_err(map_diesel_error)?
        .map(BookingRow::into_booking)
        .transpose()
}

/// A unique-index violation means another transaction won the slot; report the
/// winner as the conflict.
fn conflict_from_unique_violation(
    conn: &mut PgConnection,
    err: RepositoryError,
    event_type_id: i64,
    start: NaiveDateTime,
    end: NaiveDateTime,
    exclude: Option<i64>,
    policy: ConflictPolicy,
) -> RepositoryResult<Reservation> {
    if !matches!(err, RepositoryError::ConflictError { .. }) {
        return Err(err);
    }
    match query_conflict(conn, event_type_id, start, end, exclude, policy)? {
        Some(existing) => Ok(Reservation::Conflict(existing)),
        None => Err(err),
    }
}

#[async_trait]
impl EventTypeRepository for PostgresRepository {
    async fn list_event_types(&self, host_id: HostId) -> RepositoryResult<Vec<EventType>> {
        self.with_conn(move |conn| {
            let rows = event_types::table
                .filter(event_types::host_id.eq(host_id.value()))
                .order((event_types::created_at.desc(), event_types::id.desc()))
                .select(EventTypeRow::as_select())
                .load::<EventTypeRow>(conn)
                .map_err(map_diesel_error)?;
            Ok(rows.into_iter().map(Into::into).collect())
        })
        .await
    }

    async fn get_event_type(&self, id: EventTypeId) -> RepositoryResult<EventType> {
        self.with_conn(move |conn| {
            event_types::table
                .find(id.value())
                .select(EventTypeRow::as_select())
                .first::<EventTypeRow>(conn)
                .map(Into::into)
                .map_err(not_found_or("event_type", id.value()))
        })
        .await
    }

    async fn get_event_type_by_slug(
        &self,
        host_id: HostId,
        slug: &str,
    ) -> RepositoryResult<Option<EventType>> {
        let slug = slug.to_string();
        self.with_conn(move |conn| {
            let row = event_types::table
                .filter(event_types::host_id.eq(host_id.value()))
                .filter(event_types::slug.eq(&slug))
                .select(EventTypeRow::as_select())
                .first::<EventTypeRow>(conn)
                .optional()
                .map_err(map_diesel_error)?;
            Ok(row.map(Into::into))
        })
        .await
    }

    async fn insert_event_type(
        &self,
        host_id: HostId,
        event_type: &NewEventType,
    ) -> RepositoryResult<EventType> {
        let row = NewEventTypeRow::new(host_id, event_type);
        self.with_conn(move |conn| {
            diesel::insert_into(event_types::table)
                .values(&row)
                .returning(EventTypeRow::as_returning())
                .get_result::<EventTypeRow>(conn)
                .map(Into::into)
                .map_err(|e| map_diesel_error(e).with_operation("insert_event_type"))
        })
        .await
    }

    async fn update_event_type(
        &self,
        id: EventTypeId,
        update: &EventTypeUpdate,
    ) -> RepositoryResult<EventType> {
        let update = update.clone();
        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                let mut event_type: EventType = event_types::table
                    .find(id.value())
                    .select(EventTypeRow::as_select())
                    .for_update()
                    .first::<EventTypeRow>(tx)
                    .map_err(not_found_or("event_type", id.value()))?
                    .into();
                update.apply_to(&mut event_type);

                diesel::update(event_types::table.find(id.value()))
                    .set((
                        event_types::name.eq(&event_type.name),
                        event_types::slug.eq(&event_type.slug),
                        event_types::description.eq(&event_type.description),
                        event_types::duration_minutes.eq(event_type.duration_minutes as i32),
                        event_types::is_active.eq(event_type.is_active),
                        event_types::color.eq(&event_type.color),
                    ))
                    .returning(EventTypeRow::as_returning())
                    .get_result::<EventTypeRow>(tx)
                    .map(Into::into)
                    .map_err(|e| map_diesel_error(e).with_operation("update_event_type"))
            })
        })
        .await
    }

    async fn delete_event_type(&self, id: EventTypeId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let deleted = diesel::delete(event_types::table.find(id.value()))
                .execute(conn)
                .map_err(map_diesel_error)?;
            if deleted == 0 {
                return Err(RepositoryError::not_found_entity("event_type", id));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl AvailabilityRepository for PostgresRepository {
    async fn list_availabilities(&self, host_id: HostId) -> RepositoryResult<Vec<Availability>> {
        self.with_conn(move |conn| {
            let rows = availabilities::table
                .filter(availabilities::host_id.eq(host_id.value()))
                .order((availabilities::is_default.desc(), availabilities::id.asc()))
                .select(AvailabilityRow::as_select())
                .load::<AvailabilityRow>(conn)
                .map_err(map_diesel_error)?;
            hydrate_availabilities(conn, rows)
        })
        .await
    }

    async fn get_availability(&self, id: AvailabilityId) -> RepositoryResult<Availability> {
        self.with_conn(move |conn| load_availability(conn, id.value()))
            .await
    }

    async fn get_default_availability(
        &self,
        host_id: HostId,
    ) -> RepositoryResult<Option<Availability>> {
        self.with_conn(move |conn| {
            let row = availabilities::table
                .filter(availabilities::host_id.eq(host_id.value()))
                .filter(availabilities::is_default.eq(true))
                .order(availabilities::id.asc())
                .select(AvailabilityRow::as_select())
                .first::<AvailabilityRow>(conn)
                .optional()
                .map_err(map_diesel_error)?;
            match row {
                Some(row) => Ok(hydrate_availabilities(conn, vec![row])?.pop()),
                None => Ok(None),
            }
        })
        .await
    }

    async fn insert_availability(
        &self,
        host_id: HostId,
        availability: &NewAvailability,
    ) -> RepositoryResult<Availability> {
        let availability = availability.clone();
        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                if availability.is_default {
                    clear_default_flags(tx, host_id.value(), None)?;
                }

                let id: i64 = diesel::insert_into(availabilities::table)
                    .values(&NewAvailabilityRow {
                        host_id: host_id.value(),
                        name: availability.name.clone(),
                        is_default: availability.is_default,
                    })
                    .returning(availabilities::id)
                    .get_result(tx)
                    .map_err(map_diesel_error)?;

                let rules: Vec<NewRuleRow> = availability
                    .rules
                    .iter()
                    .map(|rule| NewRuleRow::new(id, rule))
                    .collect();
                if !rules.is_empty() {
                    diesel::insert_into(availability_rules::table)
                        .values(&rules)
                        .execute(tx)
                        .map_err(map_diesel_error)?;
                }

                load_availability(tx, id)
            })
        })
        .await
    }

    async fn update_availability(
        &self,
        id: AvailabilityId,
        update: &AvailabilityUpdate,
    ) -> RepositoryResult<Availability> {
        let update = update.clone();
        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                let current = availabilities::table
                    .find(id.value())
                    .select(AvailabilityRow::as_select())
                    .for_update()
                    .first::<AvailabilityRow>(tx)
                    .map_err(not_found_or("availability", id.value()))?;

                if update.is_default == Some(true) {
                    clear_default_flags(tx, current.host_id, Some(current.id))?;
                }

                diesel::update(availabilities::table.find(current.id))
                    .set((
                        availabilities::name.eq(update.name.as_ref().unwrap_or(&current.name)),
                        availabilities::is_default
                            .eq(update.is_default.unwrap_or(current.is_default)),
                    ))
                    .execute(tx)
                    .map_err(map_diesel_error)?;

                if let Some(rules) = &update.rules {
                    diesel::delete(
                        availability_rules::table
                            .filter(availability_rules::availability_id.eq(current.id)),
                    )
                    .execute(tx)
                    .map_err(map_diesel_error)?;

                    let rows: Vec<NewRuleRow> =
                        rules.iter().map(|r| NewRuleRow::new(current.id, r)).collect();
                    if !rows.is_empty() {
                        diesel::insert_into(availability_rules::table)
                            .values(&rows)
                            .execute(tx)
                            .map_err(map_diesel_error)?;
                    }
                }

                load_availability(tx, current.id)
            })
        })
        .await
    }

    async fn upsert_date_override(
        &self,
        availability_id: AvailabilityId,
        date_override: &NewDateOverride,
    ) -> RepositoryResult<DateOverride> {
        let row = NewOverrideRow::new(availability_id.value(), date_override);
        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                availabilities::table
                    .find(row.availability_id)
                    .select(availabilities::id)
                    .first::<i64>(tx)
                    .map_err(not_found_or("availability", row.availability_id))?;

                diesel::insert_into(date_overrides::table)
                    .values(&row)
                    .on_conflict((date_overrides::availability_id, date_overrides::override_date))
                    .do_update()
                    .set((
                        date_overrides::start_time.eq(excluded(date_overrides::start_time)),
                        date_overrides::end_time.eq(excluded(date_overrides::end_time)),
                        date_overrides::is_unavailable.eq(excluded(date_overrides::is_unavailable)),
                    ))
                    .returning(OverrideRow::as_returning())
                    .get_result::<OverrideRow>(tx)
                    .map(Into::into)
                    .map_err(map_diesel_error)
            })
        })
        .await
    }

    async fn delete_date_override(&self, id: OverrideId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let deleted = diesel::delete(date_overrides::table.find(id.value()))
                .execute(conn)
                .map_err(map_diesel_error)?;
            if deleted == 0 {
                return Err(RepositoryError::not_found_entity("date_override", id));
            }
            Ok(())
        })
        .await
    }

    async fn find_date_override(
        &self,
        availability_id: AvailabilityId,
        date: NaiveDate,
    ) -> RepositoryResult<Option<DateOverride>> {
        self.with_conn(move |conn| {
            let row = date_overrides::table
                .filter(date_overrides::availability_id.eq(availability_id.value()))
                .filter(date_overrides::override_date.eq(date))
                .select(OverrideRow::as_select())
                .first::<OverrideRow>(conn)
                .optional()
                .map_err(map_diesel_error)?;
            Ok(row.map(Into::into))
        })
        .await
    }
}

#[async_trait]
impl BookingRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn get_booking(&self, id: BookingId) -> RepositoryResult<Booking> {
        self.with_conn(move |conn| {
            load_booking(conn, id.value())?
                .ok_or_else(|| RepositoryError::not_found_entity("booking", id))
        })
        .await
    }

    async fn list_bookings_for_host(&self, host_id: HostId) -> RepositoryResult<Vec<Booking>> {
        self.with_conn(move |conn| {
            bookings::table
                .filter(bookings::host_id.eq(host_id.value()))
                .order((bookings::start_time.asc(), bookings::id.asc()))
                .select(BookingRow::as_select())
                .load::<BookingRow>(conn)
                .map_err(map_diesel_error)?
                .into_iter()
                .map(BookingRow::into_booking)
                .collect()
        })
        .await
    }

    async fn fetch_bookings_starting_between(
        &self,
        event_type_id: EventTypeId,
        from: NaiveDateTime,
        to: NaiveDateTime,
        policy: ConflictPolicy,
    ) -> RepositoryResult<Vec<Booking>> {
        self.with_conn(move |conn| {
            bookings::table
                .filter(bookings::event_type_id.eq(event_type_id.value()))
                .filter(bookings::status.eq_any(status_strings(policy)))
                .filter(bookings::start_time.ge(from))
                .filter(bookings::start_time.lt(to))
                .order(bookings::start_time.asc())
                .select(BookingRow::as_select())
                .load::<BookingRow>(conn)
                .map_err(map_diesel_error)?
                .into_iter()
                .map(BookingRow::into_booking)
                .collect()
        })
        .await
    }

    async fn find_conflicting_booking(
        &self,
        event_type_id: EventTypeId,
        start: NaiveDateTime,
        end: NaiveDateTime,
        exclude: Option<BookingId>,
        policy: ConflictPolicy,
    ) -> RepositoryResult<Option<Booking>> {
        self.with_conn(move |conn| {
            query_conflict(
                conn,
                event_type_id.value(),
                start,
                end,
                exclude.map(|id| id.value()),
                policy,
            )
        })
        .await
    }

    async fn insert_booking_if_free(
        &self,
        booking: &NewBooking,
        policy: ConflictPolicy,
    ) -> RepositoryResult<Reservation> {
        let row = NewBookingRow::from(booking);
        self.with_conn(move |conn| {
            let attempt = conn.build_transaction().serializable().run(|tx| {
                if let Some(existing) = query_conflict(
                    tx,
                    row.event_type_id,
                    row.start_time,
                    row.end_time,
                    None,
                    policy,
                )? {
                    return Ok(Reservation::Conflict(existing));
                }

                diesel::insert_into(bookings::table)
                    .values(&row)
                    .returning(BookingRow::as_returning())
                    .get_result::<BookingRow>(tx)
                    .map_err(map_diesel_error)?
                    .into_booking()
                    .map(Reservation::Reserved)
            });

            attempt.or_else(|err| {
                conflict_from_unique_violation(
                    conn,
                    err,
                    row.event_type_id,
                    row.start_time,
                    row.end_time,
                    None,
                    policy,
                )
            })
        })
        .await
    }

    async fn reschedule_booking_if_free(
        &self,
        id: BookingId,
        start: NaiveDateTime,
        end: NaiveDateTime,
        policy: ConflictPolicy,
    ) -> RepositoryResult<Reservation> {
        let id = id.value();
        self.with_conn(move |conn| {
            let mut event_type_id = None;
            let attempt = conn.build_transaction().serializable().run(|tx| {
                let current = load_booking(tx, id)?
                    .ok_or_else(|| RepositoryError::not_found_entity("booking", id))?;
                if current.is_cancelled() {
                    return Ok(Reservation::Cancelled(current));
                }
                event_type_id = Some(current.event_type_id.value());

                if let Some(existing) = query_conflict(
                    tx,
                    current.event_type_id.value(),
                    start,
                    end,
                    Some(id),
                    policy,
                )? {
                    return Ok(Reservation::Conflict(existing));
                }

                diesel::update(bookings::table.find(id))
                    .set((
                        bookings::start_time.eq(start),
                        bookings::end_time.eq(end),
                        bookings::status.eq(BookingStatus::Rescheduled.as_str()),
                    ))
                    .returning(BookingRow::as_returning())
                    .get_result::<BookingRow>(tx)
                    .map_err(map_diesel_error)?
                    .into_booking()
                    .map(Reservation::Reserved)
            });

            match (attempt, event_type_id) {
                (Err(err), Some(event_type_id)) => conflict_from_unique_violation(
                    conn,
                    err,
                    event_type_id,
                    start,
                    end,
                    Some(id),
                    policy,
                ),
                (result, _) => result,
            }
        })
        .await
    }

    async fn cancel_booking(&self, id: BookingId) -> RepositoryResult<Option<StatusChange>> {
        let id = id.value();
        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                let cancelled = diesel::update(
                    bookings::table
                        .find(id)
                        .filter(bookings::status.ne(BookingStatus::Cancelled.as_str())),
                )
                .set(bookings::status.eq(BookingStatus::Cancelled.as_str()))
                .returning(BookingRow::as_returning())
                .get_result::<BookingRow>(tx)
                .optional()
                .map_err(map_diesel_error)?;

                match cancelled {
                    Some(row) => Ok(Some(StatusChange::Applied(row.into_booking()?))),
                    None => Ok(load_booking(tx, id)?.map(StatusChange::Unchanged)),
                }
            })
        })
        .await
    }
}
