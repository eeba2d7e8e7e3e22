use serde::{Deserialize, Serialize};

use crate::constraints::{Constraint, ForeignKey};

/// Top-level schema snapshot for a database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSchema {
    /// Contract version for this schema format.
    pub schema_version: String,
    /// Database engine identifier (e.g. `sqlite`).
    pub engine: String,
    /// Tables in declaration order.
    pub tables: Vec<Table>,
}

impl DatabaseSchema {
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|table| table.name == name)
    }
}

/// A table declared by the schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub comment: Option<String>,
    pub columns: Vec<Column>,
    pub constraints: Vec<Constraint>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Name of the primary key column when the key is a single column.
    pub fn primary_key_column(&self) -> Option<&str> {
        self.constraints.iter().find_map(|constraint| match constraint {
            Constraint::PrimaryKey(pk) if pk.columns.len() == 1 => {
                pk.columns.first().map(String::as_str)
            }
            _ => None,
        })
    }

    pub fn foreign_keys(&self) -> impl Iterator<Item = &ForeignKey> {
        self.constraints.iter().filter_map(|constraint| match constraint {
            Constraint::ForeignKey(fk) => Some(fk),
            _ => None,
        })
    }

    /// Columns supplied on insert, in ordinal order. The auto-assigned
    /// primary key is left out.
    pub fn insertable_columns(&self) -> Vec<&Column> {
        let pk = self.primary_key_column();
        let mut columns: Vec<&Column> = self
            .columns
            .iter()
            .filter(|column| Some(column.name.as_str()) != pk)
            .collect();
        columns.sort_by_key(|column| column.ordinal_position);
        columns
    }
}

/// Storage class of a column as declared in DDL.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SqlType {
    Integer,
    Real,
    Text,
    Date,
    DateTime,
}

impl SqlType {
    pub fn as_sql(self) -> &'static str {
        match self {
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Text => "TEXT",
            SqlType::Date => "DATE",
            SqlType::DateTime => "DATETIME",
        }
    }
}

/// Column metadata for a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub ordinal_position: i16,
    pub name: String,
    pub sql_type: SqlType,
    pub is_nullable: bool,
}
