use std::collections::{BTreeMap, BTreeSet};

use crate::constraints::Constraint;
use crate::error::{Error, Result};
use crate::schema::DatabaseSchema;

/// Validate internal consistency of a database schema.
///
/// This checks:
/// - duplicate tables/columns
/// - every table has a primary key whose columns exist
/// - foreign key columns and referenced targets exist
pub fn validate_schema(schema: &DatabaseSchema) -> Result<()> {
    let mut catalog: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

    for table in &schema.tables {
        if catalog.contains_key(table.name.as_str()) {
            return Err(Error::InvalidSchema(format!(
                "duplicate table name: {}",
                table.name
            )));
        }

        let mut columns = BTreeSet::new();
        for column in &table.columns {
            if !columns.insert(column.name.as_str()) {
                return Err(Error::InvalidSchema(format!(
                    "duplicate column name: {}.{}",
                    table.name, column.name
                )));
            }
        }

        catalog.insert(table.name.as_str(), columns);
    }

    for table in &schema.tables {
        let columns = catalog.get(table.name.as_str()).ok_or_else(|| {
            Error::InvalidSchema(format!("missing table in catalog: {}", table.name))
        })?;

        let mut has_primary_key = false;
        for constraint in &table.constraints {
            match constraint {
                Constraint::PrimaryKey(pk) => {
                    has_primary_key = true;
                    for column in &pk.columns {
                        if !columns.contains(column.as_str()) {
                            return Err(Error::InvalidSchema(format!(
                                "primary key column not found: {}.{}",
                                table.name, column
                            )));
                        }
                    }
                }
                Constraint::ForeignKey(fk) => {
                    if fk.columns.len() != fk.referenced_columns.len() {
                        return Err(Error::InvalidSchema(format!(
                            "foreign key column count mismatch: {} -> {}",
                            table.name, fk.referenced_table
                        )));
                    }

                    for column in &fk.columns {
                        if !columns.contains(column.as_str()) {
                            return Err(Error::InvalidSchema(format!(
                                "foreign key column not found: {}.{}",
                                table.name, column
                            )));
                        }
                    }

                    let ref_columns =
                        catalog.get(fk.referenced_table.as_str()).ok_or_else(|| {
                            Error::InvalidSchema(format!(
                                "referenced table not found: {}",
                                fk.referenced_table
                            ))
                        })?;

                    for column in &fk.referenced_columns {
                        if !ref_columns.contains(column.as_str()) {
                            return Err(Error::InvalidSchema(format!(
                                "referenced column not found: {}.{}",
                                fk.referenced_table, column
                            )));
                        }
                    }
                }
                Constraint::Check(check) => {
                    if check.expression.trim().is_empty() {
                        return Err(Error::InvalidSchema(format!(
                            "empty check expression on {}",
                            table.name
                        )));
                    }
                }
            }
        }

        if !has_primary_key {
            return Err(Error::InvalidSchema(format!(
                "table without primary key: {}",
                table.name
            )));
        }
    }

    Ok(())
}
