//! Declared table schema: ordered column map of name -> raw SQL type fragment.

/// One declared column, e.g. ("name", "VARCHAR(255) NOT NULL").
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub sql_type: String,
}

impl ColumnDef {
    /// SQL cast for bound parameters, from the leading type token. String
    /// values bind as text, so uuid and timestamp columns need an explicit
    /// conversion in the statement.
    pub fn cast_type(&self) -> Option<&'static str> {
        let first = self.sql_type.split_whitespace().next().unwrap_or("");
        let first = first.split('(').next().unwrap_or("").to_lowercase();
        match first.as_str() {
            "uuid" => Some("uuid"),
            "timestamptz" => Some("timestamptz"),
            "timestamp" => Some("timestamp"),
            "date" => Some("date"),
            _ => None,
        }
    }
}

/// A model's declared table: the source of truth the live table is synced to.
#[derive(Clone, Debug)]
pub struct TableSchema {
    pub table: String,
    pub columns: Vec<ColumnDef>,
}

impl TableSchema {
    pub fn new(table: impl Into<String>) -> Self {
        TableSchema {
            table: table.into(),
            columns: Vec::new(),
        }
    }

    /// Declare a column. Order is preserved and used in CREATE TABLE.
    pub fn column(mut self, name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        self.columns.push(ColumnDef {
            name: name.into(),
            sql_type: sql_type.into(),
        });
        self
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column_def(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// The first column whose type fragment declares PRIMARY KEY.
    pub fn primary_key(&self) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.sql_type.to_uppercase().contains("PRIMARY KEY"))
            .map(|c| c.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_key_is_detected_from_type_fragment() {
        let schema = TableSchema::new("users")
            .column("id", "SERIAL PRIMARY KEY")
            .column("name", "VARCHAR(255) NOT NULL");
        assert_eq!(schema.primary_key(), Some("id"));
        assert!(schema.has_column("name"));
        assert!(!schema.has_column("missing"));
    }

    #[test]
    fn pk_detection_is_case_insensitive() {
        let schema = TableSchema::new("t").column("id", "serial primary key");
        assert_eq!(schema.primary_key(), Some("id"));
    }

    #[test]
    fn no_pk_declared_means_none() {
        let schema = TableSchema::new("log").column("line", "TEXT");
        assert_eq!(schema.primary_key(), None);
    }

    #[test]
    fn cast_type_derives_from_leading_type_token() {
        let col = |t: &str| ColumnDef {
            name: "c".into(),
            sql_type: t.into(),
        };
        assert_eq!(col("UUID PRIMARY KEY").cast_type(), Some("uuid"));
        assert_eq!(col("TIMESTAMPTZ NOT NULL DEFAULT NOW()").cast_type(), Some("timestamptz"));
        assert_eq!(col("timestamp").cast_type(), Some("timestamp"));
        assert_eq!(col("VARCHAR(255) NOT NULL").cast_type(), None);
        assert_eq!(col("SERIAL PRIMARY KEY").cast_type(), None);
    }
}
