use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::schema::DatabaseSchema;

/// Summary of FK graph structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FkGraphSummary {
    pub nodes: usize,
    pub edges: usize,
}

/// Report for FK dependency ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FkGraphReport {
    pub summary: FkGraphSummary,
    pub topo_order: Option<Vec<String>>,
    pub cycle: Option<Vec<String>>,
}

/// Build a deterministic FK dependency report for a database schema.
///
/// Parents always precede their children in `topo_order`. Tables that become
/// ready at the same time keep their declaration order.
pub fn build_fk_graph_report(schema: &DatabaseSchema) -> FkGraphReport {
    let positions = declaration_positions(schema);
    let graph = build_adjacency(schema);
    let nodes = graph.len();
    let edges = graph.values().map(|targets| targets.len()).sum();
    let summary = FkGraphSummary { nodes, edges };

    match toposort(&graph, &positions) {
        Ok(order) => FkGraphReport {
            summary,
            topo_order: Some(order),
            cycle: None,
        },
        Err(cycle) => FkGraphReport {
            summary,
            topo_order: None,
            cycle: Some(cycle),
        },
    }
}

fn declaration_positions(schema: &DatabaseSchema) -> BTreeMap<String, usize> {
    let mut positions = BTreeMap::new();
    for table in &schema.tables {
        let next = positions.len();
        positions.entry(table.name.clone()).or_insert(next);
    }
    positions
}

fn build_adjacency(schema: &DatabaseSchema) -> BTreeMap<String, BTreeSet<String>> {
    let mut graph: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for table in &schema.tables {
        graph.entry(table.name.clone()).or_default();

        for fk in table.foreign_keys() {
            graph
                .entry(fk.referenced_table.clone())
                .or_default()
                .insert(table.name.clone());
        }
    }

    graph
}

fn toposort(
    graph: &BTreeMap<String, BTreeSet<String>>,
    positions: &BTreeMap<String, usize>,
) -> Result<Vec<String>, Vec<String>> {
    let mut indegree: BTreeMap<String, usize> = BTreeMap::new();

    for (node, targets) in graph {
        indegree.entry(node.clone()).or_insert(0);
        for target in targets {
            *indegree.entry(target.clone()).or_insert(0) += 1;
        }
    }

    // Undeclared (referenced-only) tables sort after declared ones.
    let rank = |node: &str| positions.get(node).copied().unwrap_or(usize::MAX);

    let mut ready: BTreeSet<(usize, String)> = indegree
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(node, _)| (rank(node), node.clone()))
        .collect();

    let mut order = Vec::with_capacity(graph.len());

    while let Some(entry) = ready.pop_first() {
        let node = entry.1;
        if let Some(targets) = graph.get(&node) {
            for target in targets {
                if let Some(count) = indegree.get_mut(target) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        ready.insert((rank(target), target.clone()));
                    }
                }
            }
        }
        order.push(node);
    }

    if order.len() == graph.len() {
        Ok(order)
    } else {
        let cycle_nodes: Vec<String> = indegree
            .into_iter()
            .filter_map(|(node, count)| if count > 0 { Some(node) } else { None })
            .collect();
        Err(cycle_nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{Constraint, ForeignKey};
    use crate::schema::{Column, SqlType, Table};

    fn column(name: &str) -> Column {
        Column {
            ordinal_position: 1,
            name: name.to_string(),
            sql_type: SqlType::Integer,
            is_nullable: false,
        }
    }

    fn table(name: &str, fks: Vec<ForeignKey>) -> Table {
        let mut columns = vec![column("id")];
        columns.extend(fks.iter().map(|fk| column(&fk.columns[0])));
        Table {
            name: name.to_string(),
            comment: None,
            columns,
            constraints: fks.into_iter().map(Constraint::ForeignKey).collect(),
        }
    }

    fn schema(tables: Vec<Table>) -> DatabaseSchema {
        DatabaseSchema {
            schema_version: "0.1".to_string(),
            engine: "sqlite".to_string(),
            tables,
        }
    }

    #[test]
    fn toposort_reports_cycle() {
        let report = build_fk_graph_report(&schema(vec![table(
            "users",
            vec![ForeignKey::simple("parent_id", "users", "id")],
        )]));

        assert!(report.topo_order.is_none());
        assert!(
            report
                .cycle
                .as_ref()
                .unwrap()
                .contains(&"users".to_string())
        );
    }

    #[test]
    fn toposort_orders_dependencies() {
        let report = build_fk_graph_report(&schema(vec![
            table("orders", vec![ForeignKey::simple("user_id", "users", "id")]),
            table("users", Vec::new()),
        ]));

        let order = report.topo_order.expect("expected toposort");
        let users_idx = order.iter().position(|item| item == "users").unwrap();
        let orders_idx = order.iter().position(|item| item == "orders").unwrap();
        assert!(users_idx < orders_idx);
        assert_eq!(report.summary.edges, 1);
    }

    #[test]
    fn ties_keep_declaration_order() {
        let report = build_fk_graph_report(&schema(vec![
            table("zeta", Vec::new()),
            table("alpha", Vec::new()),
            table("child", vec![ForeignKey::simple("zeta_id", "zeta", "id")]),
        ]));

        assert_eq!(
            report.topo_order.expect("expected toposort"),
            vec!["zeta", "alpha", "child"]
        );
    }
}
