//! Schema sync: create the table from the declared column map, then reconcile
//! the live table against it with ALTER TABLE ADD/DROP COLUMN. Single pass, no
//! migration history, no rollback.

use crate::error::AppError;
use crate::model::TableSchema;
use crate::sql::quoted;
use sqlx::PgPool;

/// Bring the live table in line with the declared schema. Declared columns
/// missing from the live table are added; live columns not declared are
/// dropped. The declared map wins unconditionally.
pub async fn sync_schema(pool: &PgPool, schema: &TableSchema) -> Result<(), AppError> {
    if schema.columns.is_empty() {
        return Err(AppError::Schema(format!(
            "table '{}' declares no columns",
            schema.table
        )));
    }

    let col_defs: Vec<String> = schema
        .columns
        .iter()
        .map(|c| format!("{} {}", quoted(&c.name), c.sql_type))
        .collect();
    let create = format!(
        "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
        quoted(&schema.table),
        col_defs.join(",\n  ")
    );
    tracing::debug!(sql = %create, "query");
    sqlx::query(&create).execute(pool).await?;

    let live = live_columns(pool, &schema.table).await?;
    let declared: Vec<String> = schema.columns.iter().map(|c| c.name.clone()).collect();
    let (to_add, to_drop) = diff_columns(&declared, &live);

    for name in &to_add {
        let def = schema
            .columns
            .iter()
            .find(|c| c.name == *name)
            .map(|c| c.sql_type.as_str())
            .unwrap_or("TEXT");
        let sql = format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            quoted(&schema.table),
            quoted(name),
            def
        );
        tracing::debug!(sql = %sql, "query");
        sqlx::query(&sql).execute(pool).await?;
    }

    for name in &to_drop {
        let sql = format!(
            "ALTER TABLE {} DROP COLUMN {}",
            quoted(&schema.table),
            quoted(name)
        );
        tracing::debug!(sql = %sql, "query");
        sqlx::query(&sql).execute(pool).await?;
    }

    if !to_add.is_empty() || !to_drop.is_empty() {
        tracing::info!(
            table = %schema.table,
            added = to_add.len(),
            dropped = to_drop.len(),
            "schema synced"
        );
    }
    Ok(())
}

/// Column names of the live table, from information_schema.
async fn live_columns(pool: &PgPool, table: &str) -> Result<Vec<String>, AppError> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT column_name FROM information_schema.columns \
         WHERE table_schema = 'public' AND table_name = $1 \
         ORDER BY ordinal_position",
    )
    .bind(table)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(name,)| name).collect())
}

/// Diff declared columns against live columns: (to add, to drop).
fn diff_columns(declared: &[String], live: &[String]) -> (Vec<String>, Vec<String>) {
    let to_add = declared
        .iter()
        .filter(|d| !live.contains(d))
        .cloned()
        .collect();
    let to_drop = live
        .iter()
        .filter(|l| !declared.contains(l))
        .cloned()
        .collect();
    (to_add, to_drop)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn in_sync_tables_need_no_changes() {
        let cols = names(&["id", "name", "email"]);
        let (add, drop) = diff_columns(&cols, &cols);
        assert!(add.is_empty());
        assert!(drop.is_empty());
    }

    #[test]
    fn missing_declared_columns_are_added_in_declaration_order() {
        let declared = names(&["id", "name", "email", "created_at"]);
        let live = names(&["id", "email"]);
        let (add, drop) = diff_columns(&declared, &live);
        assert_eq!(add, names(&["name", "created_at"]));
        assert!(drop.is_empty());
    }

    #[test]
    fn undeclared_live_columns_are_dropped() {
        let declared = names(&["id", "name"]);
        let live = names(&["id", "name", "legacy_flag"]);
        let (add, drop) = diff_columns(&declared, &live);
        assert!(add.is_empty());
        assert_eq!(drop, names(&["legacy_flag"]));
    }

    #[test]
    fn add_and_drop_can_happen_in_one_pass() {
        let declared = names(&["id", "email"]);
        let live = names(&["id", "name"]);
        let (add, drop) = diff_columns(&declared, &live);
        assert_eq!(add, names(&["email"]));
        assert_eq!(drop, names(&["name"]));
    }
}
