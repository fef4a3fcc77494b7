//! PostgreSQL-backed store and database bootstrap.

use super::{CupcakeDraft, CupcakeStore, MAX_TEXT_LEN};
use crate::error::{AppError, ConfigError, StoreError};
use crate::model::{Cupcake, DEFAULT_IMAGE};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{ConnectOptions, Postgres, Transaction};
use std::str::FromStr;

const RETURNING: &str = "RETURNING id, flavor, size, rating, image";

pub struct PgCupcakeStore {
    pool: PgPool,
}

impl PgCupcakeStore {
    pub fn new(pool: PgPool) -> Self {
        PgCupcakeStore { pool }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(PgCupcakeStore { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Commit on success, roll back on failure. The driver error is classified
/// before it leaves the store.
async fn finish<T>(tx: Transaction<'_, Postgres>, result: Result<T, sqlx::Error>) -> Result<T, StoreError> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(error = %rollback_err, "rollback failed");
            }
            Err(StoreError::classify(err))
        }
    }
}

#[async_trait]
impl CupcakeStore for PgCupcakeStore {
    async fn list(&self) -> Result<Vec<Cupcake>, StoreError> {
        let sql = "SELECT id, flavor, size, rating, image FROM cupcakes ORDER BY id";
        tracing::debug!(sql = %sql, "query");
        let rows = sqlx::query_as::<_, Cupcake>(sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn get(&self, id: i32) -> Result<Option<Cupcake>, StoreError> {
        let sql = "SELECT id, flavor, size, rating, image FROM cupcakes WHERE id = $1";
        tracing::debug!(sql = %sql, id, "query");
        let row = sqlx::query_as::<_, Cupcake>(sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cupcakes")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    async fn insert(&self, draft: &CupcakeDraft) -> Result<Cupcake, StoreError> {
        let sql = format!(
            "INSERT INTO cupcakes (flavor, size, rating, image) VALUES ($1, $2, $3, $4) {}",
            RETURNING
        );
        tracing::debug!(sql = %sql, draft = ?draft, "query (tx)");
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query_as::<_, Cupcake>(&sql)
            .bind(&draft.flavor)
            .bind(&draft.size)
            .bind(draft.rating)
            .bind(&draft.image)
            .fetch_one(&mut *tx)
            .await;
        finish(tx, result).await
    }

    async fn update(&self, id: i32, draft: &CupcakeDraft) -> Result<Option<Cupcake>, StoreError> {
        let sql = format!(
            "UPDATE cupcakes SET flavor = $1, size = $2, rating = $3, image = $4 WHERE id = $5 {}",
            RETURNING
        );
        tracing::debug!(sql = %sql, id, draft = ?draft, "query (tx)");
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query_as::<_, Cupcake>(&sql)
            .bind(&draft.flavor)
            .bind(&draft.size)
            .bind(draft.rating)
            .bind(&draft.image)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await;
        finish(tx, result).await
    }

    async fn delete(&self, id: i32) -> Result<Option<Cupcake>, StoreError> {
        let sql = format!("DELETE FROM cupcakes WHERE id = $1 {}", RETURNING);
        tracing::debug!(sql = %sql, id, "query (tx)");
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query_as::<_, Cupcake>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await;
        finish(tx, result).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

/// Create the `cupcakes` table if it does not exist.
pub async fn ensure_cupcakes_table(pool: &PgPool) -> Result<(), AppError> {
    let ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS cupcakes (
            id SERIAL PRIMARY KEY,
            flavor VARCHAR({max}) NOT NULL,
            size VARCHAR({max}) NOT NULL,
            rating DOUBLE PRECISION NOT NULL,
            image TEXT NOT NULL DEFAULT '{image}'
        )
        "#,
        max = MAX_TEXT_LEN,
        image = DEFAULT_IMAGE.replace('\'', "''"),
    );
    tracing::debug!(sql = %ddl, "ddl");
    sqlx::query(&ddl).execute(pool).await?;
    Ok(())
}

/// Connect to the server's `postgres` database and create the database named
/// in `database_url` when it is missing.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url).map_err(|_| {
        ConfigError::InvalidValue {
            key: "DATABASE_URL",
            value: database_url.to_string(),
        }
    })?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!("creating database {}", db_name);
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        key: "DATABASE_URL",
        value: url.to_string(),
    };
    let scheme_end = url.find("://").ok_or_else(invalid)? + 3;
    let path_start = url[scheme_end..].find('/').map(|i| scheme_end + i + 1).ok_or_else(invalid)?;
    let db_name = url[path_start..].split('?').next().unwrap_or("").trim();
    let admin_url = format!("{}postgres", &url[..path_start]);
    Ok((admin_url, db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
