//! Local backend: JSON rows in SQLite behind an r2d2 pool.
//!
//! Filtering happens in Rust after a per-table scan, which keeps the backend
//! schema-agnostic. Each write runs inside one SQLite transaction.

use async_trait::async_trait;
use chrono::Utc;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, params};
use serde_json::Value;
use uuid::Uuid;

use crate::crypto::hash_password;
use crate::error::{AppError, Result};
use crate::models::{AuthUser, CreateAuthUser};
use crate::util::to_iso;

use super::{Database, Filter, Row, init_db, matches_all};

pub type DbPool = Pool<SqliteConnectionManager>;

/// Logical table holding auth-admin users.
const AUTH_USERS: &str = "auth.users";

pub fn create_pool(database_path: &str) -> std::result::Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(database_path);
    Pool::builder().max_size(10).build(manager)
}

#[derive(Clone)]
pub struct SqliteDatabase {
    pool: DbPool,
}

impl SqliteDatabase {
    /// Wrap a pool, creating the schema if needed.
    pub fn new(pool: DbPool) -> Result<Self> {
        let conn = pool.get()?;
        init_db(&conn)?;
        Ok(Self { pool })
    }

    /// Single-connection in-memory database.
    ///
    /// Each SQLite memory connection is its own database, so the pool holds
    /// exactly one connection and never recycles it.
    pub fn in_memory() -> Result<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .max_lifetime(None)
            .idle_timeout(None)
            .build(manager)?;
        Self::new(pool)
    }
}

fn load(conn: &Connection, table: &str) -> Result<Vec<(i64, Row)>> {
    let mut stmt = conn.prepare("SELECT seq, data FROM records WHERE tbl = ?1 ORDER BY seq")?;
    let raw = stmt
        .query_map(params![table], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    raw.into_iter()
        .map(|(seq, data)| {
            serde_json::from_str::<Row>(&data)
                .map(|row| (seq, row))
                .map_err(AppError::from)
        })
        .collect()
}

/// Fill the columns a hosted database would default: `id`, `created_at`, `updated_at`.
fn with_defaults(mut row: Row) -> Row {
    let now = to_iso(Utc::now());
    row.entry("id")
        .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
    row.entry("created_at")
        .or_insert_with(|| Value::String(now.clone()));
    row.entry("updated_at").or_insert_with(|| Value::String(now));
    row
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn select(&self, table: &str, filters: &[Filter]) -> Result<Vec<Row>> {
        let conn = self.pool.get()?;
        Ok(load(&conn, table)?
            .into_iter()
            .map(|(_, row)| row)
            .filter(|row| matches_all(row, filters))
            .collect())
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let mut inserted = Vec::with_capacity(rows.len());
        for row in rows {
            let row = with_defaults(row);
            tx.execute(
                "INSERT INTO records (tbl, data) VALUES (?1, ?2)",
                params![table, serde_json::to_string(&row)?],
            )?;
            inserted.push(row);
        }

        tx.commit()?;
        Ok(inserted)
    }

    async fn update(&self, table: &str, filters: &[Filter], patch: Row) -> Result<Vec<Row>> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let mut updated = Vec::new();
        for (seq, mut row) in load(&tx, table)? {
            if !matches_all(&row, filters) {
                continue;
            }
            for (k, v) in &patch {
                row.insert(k.clone(), v.clone());
            }
            tx.execute(
                "UPDATE records SET data = ?1 WHERE seq = ?2",
                params![serde_json::to_string(&row)?, seq],
            )?;
            updated.push(row);
        }

        tx.commit()?;
        Ok(updated)
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<usize> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let mut deleted = 0;
        for (seq, row) in load(&tx, table)? {
            if matches_all(&row, filters) {
                deleted += tx.execute("DELETE FROM records WHERE seq = ?1", params![seq])?;
            }
        }

        tx.commit()?;
        Ok(deleted)
    }

    async fn list_auth_users(&self) -> Result<Vec<AuthUser>> {
        self.select(AUTH_USERS, &[])
            .await?
            .into_iter()
            .map(|row| serde_json::from_value(Value::Object(row)).map_err(AppError::from))
            .collect()
    }

    async fn create_auth_user(&self, input: &CreateAuthUser) -> Result<AuthUser> {
        let email = input.email.trim().to_lowercase();
        let existing = self
            .select(AUTH_USERS, &[Filter::eq("email", email.clone())])
            .await?;
        if !existing.is_empty() {
            return Err(AppError::Database(
                "A user with this email address has already been registered".into(),
            ));
        }

        let mut row = Row::new();
        row.insert("email".into(), Value::String(email));
        row.insert(
            "encrypted_password".into(),
            Value::String(hash_password(&input.password)?),
        );
        let confirmed_at = input.email_confirm.then(|| to_iso(Utc::now()));
        row.insert("email_confirmed_at".into(), confirmed_at.into());

        let created = self.insert(AUTH_USERS, vec![row]).await?;
        let row = created
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Internal("insert returned no row".into()))?;
        Ok(serde_json::from_value(Value::Object(row))?)
    }

    async fn update_auth_user_password(&self, user_id: &str, password: &str) -> Result<AuthUser> {
        let mut patch = Row::new();
        patch.insert(
            "encrypted_password".into(),
            Value::String(hash_password(password)?),
        );
        patch.insert("updated_at".into(), Value::String(to_iso(Utc::now())));

        let updated = self
            .update(AUTH_USERS, &[Filter::eq("id", user_id)], patch)
            .await?;
        let row = updated
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Database("User not found".into()))?;
        Ok(serde_json::from_value(Value::Object(row))?)
    }
}
