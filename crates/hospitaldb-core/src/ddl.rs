use crate::constraints::Constraint;
use crate::schema::Table;

/// Render a presence-checked `CREATE TABLE` statement (SQLite dialect).
///
/// A single-column primary key is declared inline as `INTEGER PRIMARY KEY`
/// so the engine assigns keys on insert.
pub fn render_create_table(table: &Table) -> String {
    let inline_pk = table.primary_key_column();
    let mut columns = table.columns.clone();
    columns.sort_by_key(|column| column.ordinal_position);

    let mut lines: Vec<String> = columns
        .iter()
        .map(|column| {
            if Some(column.name.as_str()) == inline_pk {
                format!("    {} {} PRIMARY KEY", column.name, column.sql_type.as_sql())
            } else if column.is_nullable {
                format!("    {} {}", column.name, column.sql_type.as_sql())
            } else {
                format!("    {} {} NOT NULL", column.name, column.sql_type.as_sql())
            }
        })
        .collect();

    for constraint in &table.constraints {
        let clause = match constraint {
            Constraint::PrimaryKey(pk) if inline_pk.is_none() => {
                format!("PRIMARY KEY ({})", pk.columns.join(", "))
            }
            Constraint::PrimaryKey(_) => continue,
            Constraint::Check(check) => format!("CHECK ({})", check.expression),
            Constraint::ForeignKey(fk) => format!(
                "FOREIGN KEY ({}) REFERENCES {}({})",
                fk.columns.join(", "),
                fk.referenced_table,
                fk.referenced_columns.join(", ")
            ),
        };
        let name = match constraint {
            Constraint::PrimaryKey(pk) => pk.name.as_deref(),
            Constraint::Check(check) => check.name.as_deref(),
            Constraint::ForeignKey(fk) => fk.name.as_deref(),
        };
        lines.push(match name {
            Some(name) => format!("    CONSTRAINT {name} {clause}"),
            None => format!("    {clause}"),
        });
    }

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
        table.name,
        lines.join(",\n")
    )
}
