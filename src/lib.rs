pub mod api;
pub mod config;
pub mod deadline;
pub mod errors;
pub mod identity;
pub mod models;
pub mod observability;
pub mod schema;
pub mod security;
pub mod store;
pub mod subscriptions;
#[cfg(test)]
pub mod test_helpers;

use std::{sync::Arc, time::Duration};

use actix_web::web;
use diesel::connection::SimpleConnection;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::{
    identity::IdentityResolver,
    observability::SubscriptionTelemetry,
    store::SubscriptionStore,
    subscriptions::{CountResolver, ToggleCoordinator},
};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/migrations");

pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;
pub type RqDbPool = web::Data<DbPool>;

/// Per-connection SQLite settings applied when the pool opens a connection.
/// Without a busy timeout a second writer fails at once with
/// "database is locked" instead of waiting its turn.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionOptions {
    pub busy_timeout: Duration,
    pub enable_wal: bool,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_millis(5000),
            enable_wal: true,
        }
    }
}

impl CustomizeConnection<SqliteConnection, r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        let mut pragmas = format!("PRAGMA busy_timeout = {};", self.busy_timeout.as_millis());
        if self.enable_wal {
            pragmas.push_str(" PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;");
        }
        conn.batch_execute(&pragmas).map_err(r2d2::Error::QueryError)
    }
}

pub fn initialize_db_pool(db_path: &str) -> Result<DbPool, r2d2::PoolError> {
    let manager = ConnectionManager::<SqliteConnection>::new(db_path);
    r2d2::Pool::builder()
        .connection_customizer(Box::new(ConnectionOptions::default()))
        .build(manager)
}

pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    tracing::info!(applied = applied.len(), "Database migrations complete");
    Ok(())
}

/// Everything the HTTP layer needs, wired once at startup.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub store: Arc<dyn SubscriptionStore>,
    pub counts: CountResolver,
    pub coordinator: ToggleCoordinator,
    pub identity: Arc<dyn IdentityResolver>,
}

impl AppState {
    pub fn new(
        pool: DbPool,
        store: Arc<dyn SubscriptionStore>,
        identity: Arc<dyn IdentityResolver>,
        telemetry: Arc<dyn SubscriptionTelemetry>,
        count_deadline: Duration,
        toggle_deadline: Duration,
    ) -> Self {
        let counts = CountResolver::new(store.clone(), telemetry.clone()).with_deadline(count_deadline);
        let coordinator = ToggleCoordinator::new(store.clone(), counts.clone(), telemetry)
            .with_deadline(toggle_deadline);

        Self {
            pool,
            store,
            counts,
            coordinator,
            identity,
        }
    }

    /// Register shared data plus the unauthenticated health checks.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.pool.clone()))
            .app_data(web::Data::from(self.store.clone()))
            .app_data(web::Data::new(self.counts.clone()))
            .app_data(web::Data::new(self.coordinator.clone()))
            .app_data(web::Data::from(self.identity.clone()))
            .service(api::health::routes());
    }
}
