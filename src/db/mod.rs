mod filter;
pub mod queries;
mod rest;
mod schema;
mod sqlite;

pub use filter::{Filter, matches_all};
pub use rest::RestDatabase;
pub use schema::init_db;
pub use sqlite::{DbPool, SqliteDatabase, create_pool};

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;

use crate::config::{Config, DatabaseUrl};
use crate::error::Result;
use crate::models::{AuthUser, CreateAuthUser};
use crate::receipt::ReceiptValidator;

/// A table row as a JSON object.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Generic table CRUD plus the auth-admin operations the seed needs.
///
/// Backends are schema-agnostic: rows go in and come out as JSON objects and
/// the typed layer in [`queries`] converts them to models.
#[async_trait]
pub trait Database: Send + Sync {
    /// Rows of `table` matching every filter, in insertion order.
    async fn select(&self, table: &str, filters: &[Filter]) -> Result<Vec<Row>>;

    /// Insert rows and return them as stored (with generated columns).
    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>>;

    /// Merge `patch` into every matching row. Returns the updated rows.
    async fn update(&self, table: &str, filters: &[Filter], patch: Row) -> Result<Vec<Row>>;

    /// Delete matching rows. Returns how many were removed.
    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<usize>;

    async fn list_auth_users(&self) -> Result<Vec<AuthUser>>;

    async fn create_auth_user(&self, input: &CreateAuthUser) -> Result<AuthUser>;

    async fn update_auth_user_password(&self, user_id: &str, password: &str) -> Result<AuthUser>;
}

/// Application state shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn Database>,
    pub validator: Arc<dyn ReceiptValidator>,
}

static SHARED: OnceLock<Arc<dyn Database>> = OnceLock::new();

/// The process-wide database client, created on first use.
///
/// Later calls return the same client regardless of the config passed.
pub fn shared(config: &Config) -> Result<Arc<dyn Database>> {
    if let Some(db) = SHARED.get() {
        return Ok(db.clone());
    }
    let db = connect(config)?;
    Ok(SHARED.get_or_init(|| db).clone())
}

/// Build a fresh client for the configured backend.
pub fn connect(config: &Config) -> Result<Arc<dyn Database>> {
    let db: Arc<dyn Database> = match &config.database_url {
        DatabaseUrl::Hosted(url) => {
            tracing::info!("Using hosted database at {}", url);
            Arc::new(RestDatabase::new(url, &config.database_service_key)?)
        }
        DatabaseUrl::SqliteFile(path) => {
            tracing::info!("Using SQLite database at {}", path);
            Arc::new(SqliteDatabase::new(create_pool(path)?)?)
        }
        DatabaseUrl::SqliteMemory => {
            tracing::warn!("Using in-memory SQLite database; data is lost on exit");
            Arc::new(SqliteDatabase::in_memory()?)
        }
    };
    Ok(db)
}
