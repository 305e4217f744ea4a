//! Lazy process-wide PostgreSQL pool. The first caller connects; everyone
//! after that shares the same pool.

use crate::error::AppError;
use sqlx::postgres::PgPoolOptions;
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;
use tokio::sync::OnceCell;

static POOL: OnceCell<PgPool> = OnceCell::const_new();

/// Connection settings come from the environment (`.env` is loaded on first
/// use): `DATABASE_URL` is required, `DB_MAX_CONNECTIONS` defaults to 5.
pub struct Database;

impl Database {
    pub async fn connect() -> Result<&'static PgPool, AppError> {
        POOL.get_or_try_init(|| async {
            let url = database_url()?;
            let max_connections = std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5);
            PgPoolOptions::new()
                .max_connections(max_connections)
                .connect(&url)
                .await
                .map_err(AppError::Db)
        })
        .await
    }
}

/// `DATABASE_URL` from the environment, loading `.env` first.
pub fn database_url() -> Result<String, AppError> {
    dotenvy::dotenv().ok();
    std::env::var("DATABASE_URL").map_err(|_| AppError::Config("DATABASE_URL not set".into()))
}

/// Ensure the database in `database_url` exists; create it if not. Connects to
/// the default `postgres` database to run CREATE DATABASE. Call before the
/// first `Database::connect()`.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = split_db_name(database_url);
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| AppError::Config(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await.map_err(AppError::Db)?;
    let exists: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(&db_name)
            .fetch_one(&mut conn)
            .await
            .map_err(AppError::Db)?;
    if !exists.0 {
        let sql = format!("CREATE DATABASE {}", crate::sql::quoted(&db_name));
        tracing::debug!(sql = %sql, "query");
        sqlx::query(&sql).execute(&mut conn).await.map_err(AppError::Db)?;
    }
    Ok(())
}

/// Split a connection URL into (admin URL pointing at the default `postgres`
/// database, database name). Query parameters carry over to the admin URL.
/// A URL with no path after the authority yields an empty name.
fn split_db_name(url: &str) -> (String, String) {
    let authority_start = url.find("://").map(|i| i + 3).unwrap_or(0);
    let Some(slash) = url[authority_start..].find('/') else {
        return (format!("{}/postgres", url), String::new());
    };
    let path_start = authority_start + slash + 1;
    let (db_name, query) = match url[path_start..].find('?') {
        Some(q) => (&url[path_start..path_start + q], &url[path_start + q..]),
        None => (&url[path_start..], ""),
    };
    (
        format!("{}postgres{}", &url[..path_start], query),
        db_name.trim().to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_db_name_extracts_admin_url_and_name() {
        let (admin, name) = split_db_name("postgres://localhost:5432/myapp");
        assert_eq!(admin, "postgres://localhost:5432/postgres");
        assert_eq!(name, "myapp");
    }

    #[test]
    fn split_db_name_carries_query_params_to_admin_url() {
        let (admin, name) = split_db_name("postgres://localhost/myapp?sslmode=disable");
        assert_eq!(admin, "postgres://localhost/postgres?sslmode=disable");
        assert_eq!(name, "myapp");
    }

    #[test]
    fn split_db_name_handles_url_without_path() {
        let (admin, name) = split_db_name("postgres://localhost:5432");
        assert_eq!(admin, "postgres://localhost:5432/postgres");
        assert_eq!(name, "");
    }
}
