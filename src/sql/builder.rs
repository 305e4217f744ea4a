//! Builds parameterized SELECT, INSERT, UPDATE, DELETE from a table schema.
//! Identifier names are quoted and concatenated into the statement; values are
//! always bound as parameters.

use crate::error::AppError;
use crate::model::{ColumnDef, TableSchema};
use serde_json::{Map, Value};

/// Quote an identifier for PostgreSQL.
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Sort direction for `find_all`. Anything that is not DESC (case-insensitive)
/// falls back to ASC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OrderDir {
    #[default]
    Asc,
    Desc,
}

impl OrderDir {
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("desc") {
            OrderDir::Desc
        } else {
            OrderDir::Asc
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderDir::Asc => "ASC",
            OrderDir::Desc => "DESC",
        }
    }
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

/// Column names used in WHERE/ORDER BY positions must be declared on the
/// schema; they end up concatenated into the statement.
fn require_column<'a>(schema: &'a TableSchema, column: &str) -> Result<&'a ColumnDef, AppError> {
    schema.column_def(column).ok_or_else(|| {
        AppError::BadRequest(format!(
            "unknown column '{}' for table '{}'",
            column, schema.table
        ))
    })
}

/// Placeholder for param n, with a cast when the declared column type needs
/// one (string values bind as text).
fn placeholder(n: usize, col: &ColumnDef) -> String {
    match col.cast_type() {
        Some(t) => format!("${}::{}", n, t),
        None => format!("${}", n),
    }
}

/// SELECT * WHERE column = $1 LIMIT 1.
pub fn select_where(
    schema: &TableSchema,
    column: &str,
    value: Value,
) -> Result<QueryBuf, AppError> {
    let col = require_column(schema, column)?;
    let mut q = QueryBuf::new();
    let n = q.push_param(value);
    q.sql = format!(
        "SELECT * FROM {} WHERE {} = {} LIMIT 1",
        quoted(&schema.table),
        quoted(column),
        placeholder(n, col)
    );
    Ok(q)
}

/// SELECT * ORDER BY order_by ASC|DESC.
pub fn select_all(
    schema: &TableSchema,
    order_by: &str,
    order: OrderDir,
) -> Result<QueryBuf, AppError> {
    require_column(schema, order_by)?;
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT * FROM {} ORDER BY {} {}",
        quoted(&schema.table),
        quoted(order_by),
        order.as_str()
    );
    Ok(q)
}

/// INSERT from a data map. Keys not declared on the schema are dropped, the
/// way the generic executors ignore unknown body keys. Returns the new
/// primary-key value via RETURNING.
pub fn insert(schema: &TableSchema, data: &Map<String, Value>) -> Result<QueryBuf, AppError> {
    let pk = schema
        .primary_key()
        .ok_or_else(|| AppError::Schema(format!("table '{}' declares no primary key", schema.table)))?;
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for (k, v) in data {
        let Some(col) = schema.column_def(k) else {
            continue;
        };
        let n = q.push_param(v.clone());
        cols.push(quoted(k));
        placeholders.push(placeholder(n, col));
    }
    if cols.is_empty() {
        return Err(AppError::BadRequest("no insertable columns in data".into()));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        quoted(&schema.table),
        cols.join(", "),
        placeholders.join(", "),
        quoted(pk)
    );
    Ok(q)
}

/// UPDATE: SET every declared column present in data, filtered by one column.
pub fn update(
    schema: &TableSchema,
    where_column: &str,
    where_value: Value,
    data: &Map<String, Value>,
) -> Result<QueryBuf, AppError> {
    let where_col = require_column(schema, where_column)?;
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for (k, v) in data {
        let Some(col) = schema.column_def(k) else {
            continue;
        };
        let n = q.push_param(v.clone());
        sets.push(format!("{} = {}", quoted(k), placeholder(n, col)));
    }
    if sets.is_empty() {
        return Err(AppError::BadRequest("no updatable columns in data".into()));
    }
    let n = q.push_param(where_value);
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = {}",
        quoted(&schema.table),
        sets.join(", "),
        quoted(where_column),
        placeholder(n, where_col)
    );
    Ok(q)
}

/// DELETE filtered by one column.
pub fn delete(schema: &TableSchema, column: &str, value: Value) -> Result<QueryBuf, AppError> {
    let col = require_column(schema, column)?;
    let mut q = QueryBuf::new();
    let n = q.push_param(value);
    q.sql = format!(
        "DELETE FROM {} WHERE {} = {}",
        quoted(&schema.table),
        quoted(column),
        placeholder(n, col)
    );
    Ok(q)
}
