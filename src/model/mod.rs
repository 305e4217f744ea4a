//! Active-record-style models: a declared table schema plus provided CRUD
//! methods and a schema-sync step.

mod crud;
mod schema;
mod sync;

pub use schema::{ColumnDef, TableSchema};
pub use sync::sync_schema;

use crate::error::AppError;
use crate::sql::{self, OrderDir};
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::PgPool;

/// A database-backed model. Implementors declare their table schema; CRUD and
/// sync come for free. Identifier arguments (column names, order-by) must be
/// declared columns; values are always bound as parameters.
#[async_trait]
pub trait Model {
    fn schema() -> TableSchema;

    /// Reconcile the live table with the declared schema (see [`sync_schema`]).
    async fn sync(pool: &PgPool) -> Result<(), AppError> {
        sync_schema(pool, &Self::schema()).await
    }

    /// First row where column = value, as a JSON object.
    async fn find(pool: &PgPool, column: &str, value: Value) -> Result<Option<Value>, AppError> {
        let q = sql::select_where(&Self::schema(), column, value)?;
        crud::fetch_optional(pool, &q).await
    }

    /// All rows, sorted. `order` falls back to ASC for anything that is not
    /// DESC.
    async fn find_all(
        pool: &PgPool,
        order_by: &str,
        order: OrderDir,
    ) -> Result<Vec<Value>, AppError> {
        let q = sql::select_all(&Self::schema(), order_by, order)?;
        crud::fetch_all(pool, &q).await
    }

    /// Insert a row; returns the new primary-key id.
    async fn create(pool: &PgPool, data: &Map<String, Value>) -> Result<i64, AppError> {
        let q = sql::insert(&Self::schema(), data)?;
        crud::execute_returning_id(pool, &q).await
    }

    /// Update rows where where_column = where_value; true when any row changed.
    async fn update(
        pool: &PgPool,
        where_column: &str,
        where_value: Value,
        data: &Map<String, Value>,
    ) -> Result<bool, AppError> {
        let q = sql::update(&Self::schema(), where_column, where_value, data)?;
        crud::execute(pool, &q).await
    }

    /// Delete rows where column = value; true when any row was removed.
    async fn delete(pool: &PgPool, column: &str, value: Value) -> Result<bool, AppError> {
        let q = sql::delete(&Self::schema(), column, value)?;
        crud::execute(pool, &q).await
    }
}
