use hospitaldb_core::{DatabaseSchema, Entity, PopulateConfig};

use crate::errors::PopulateError;

/// Planned population step for a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulationTask {
    pub entity: Entity,
    pub rows: u64,
}

/// Build the ordered population plan: parents strictly before children.
pub fn plan_population(
    schema: &DatabaseSchema,
    config: &PopulateConfig,
) -> Result<Vec<PopulationTask>, PopulateError> {
    let order = hospitaldb_core::build_fk_graph_report(schema)
        .topo_order
        .ok_or_else(|| {
            hospitaldb_core::Error::InvalidSchema("cyclic FK graph".to_string())
        })?;

    let mut tasks = Vec::with_capacity(order.len());
    for name in order {
        let entity =
            Entity::from_table_name(&name).ok_or_else(|| PopulateError::UnknownTable(name))?;
        tasks.push(PopulationTask {
            entity,
            rows: rows_for(entity, config),
        });
    }

    Ok(tasks)
}

fn rows_for(entity: Entity, config: &PopulateConfig) -> u64 {
    let volumes = &config.volumes;
    match entity {
        Entity::Patient => volumes.patients,
        Entity::Doctor => volumes.doctors,
        Entity::Inventory => volumes.inventory_items,
        Entity::MachineInventory => config.total_machine_units(),
        Entity::Appointment => volumes.appointments,
        // One invoice per patient.
        Entity::Billing => volumes.patients,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hospitaldb_core::{EquipmentEntry, hospital_schema};

    #[test]
    fn plans_every_table_in_dependency_order() {
        let tasks = plan_population(&hospital_schema(), &PopulateConfig::default()).unwrap();
        let plan: Vec<(Entity, u64)> = tasks.iter().map(|task| (task.entity, task.rows)).collect();

        assert_eq!(
            plan,
            vec![
                (Entity::Patient, 50),
                (Entity::Doctor, 20),
                (Entity::Inventory, 10),
                (Entity::MachineInventory, 32),
                (Entity::Appointment, 100),
                (Entity::Billing, 50),
            ]
        );
    }

    #[test]
    fn machine_rows_follow_the_catalog() {
        let mut config = PopulateConfig::default();
        config.equipment = vec![
            EquipmentEntry::new("Infusion Pump", 4),
            EquipmentEntry::new("Ultrasound", 1),
        ];
        let tasks = plan_population(&hospital_schema(), &config).unwrap();
        let machines = tasks
            .iter()
            .find(|task| task.entity == Entity::MachineInventory)
            .unwrap();
        assert_eq!(machines.rows, 5);
    }

    #[test]
    fn rejects_tables_outside_the_model() {
        let mut schema = hospital_schema();
        let mut extra = schema.tables[0].clone();
        extra.name = "Ward".to_string();
        schema.tables.push(extra);

        let err = plan_population(&schema, &PopulateConfig::default()).unwrap_err();
        assert!(matches!(err, PopulateError::UnknownTable(name) if name == "Ward"));
    }
}
