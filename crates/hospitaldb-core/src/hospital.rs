//! The hospital-operations table catalog.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::SCHEMA_VERSION;
use crate::constraints::{CheckConstraint, Constraint, ForeignKey, PrimaryKey};
use crate::domain::{
    AppointmentStatus, AvailabilityStatus, Gender, InsuranceCategory, PaymentStatus,
    Specialization, in_list_check,
};
use crate::schema::{Column, DatabaseSchema, SqlType, Table};

/// Entities of the hospital model, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Entity {
    Patient,
    Doctor,
    Inventory,
    MachineInventory,
    Appointment,
    Billing,
}

impl Entity {
    pub const ALL: [Entity; 6] = [
        Entity::Patient,
        Entity::Doctor,
        Entity::Inventory,
        Entity::MachineInventory,
        Entity::Appointment,
        Entity::Billing,
    ];

    pub fn table_name(self) -> &'static str {
        match self {
            Entity::Patient => "Patient",
            Entity::Doctor => "Doctor",
            Entity::Inventory => "Inventory",
            Entity::MachineInventory => "MachineInventory",
            Entity::Appointment => "Appointment",
            Entity::Billing => "Billing",
        }
    }

    pub fn primary_key(self) -> &'static str {
        match self {
            Entity::Patient => "patient_id",
            Entity::Doctor => "doctor_id",
            Entity::Inventory => "inventory_id",
            Entity::MachineInventory => "machine_id",
            Entity::Appointment => "appointment_id",
            Entity::Billing => "billing_id",
        }
    }

    pub fn from_table_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|entity| entity.table_name() == name)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// Build the six-table hospital schema.
pub fn hospital_schema() -> DatabaseSchema {
    DatabaseSchema {
        schema_version: SCHEMA_VERSION.to_string(),
        engine: "sqlite".to_string(),
        tables: vec![
            patient_table(),
            doctor_table(),
            inventory_table(),
            machine_inventory_table(),
            appointment_table(),
            billing_table(),
        ],
    }
}

fn patient_table() -> Table {
    TableBuilder::new(Entity::Patient, "Registered patients.")
        .column("first_name", SqlType::Text, false)
        .column("last_name", SqlType::Text, false)
        .column("dob", SqlType::Date, false)
        .column("gender", SqlType::Text, false)
        .column("address", SqlType::Text, true)
        .column("phone", SqlType::Text, true)
        .column("insurance_info", SqlType::Text, true)
        .check(in_list_check(Gender::COLUMN, Gender::labels()))
        .check(in_list_check(
            InsuranceCategory::COLUMN,
            InsuranceCategory::labels(),
        ))
        .build()
}

fn doctor_table() -> Table {
    TableBuilder::new(Entity::Doctor, "Medical staff and their schedules.")
        .column("first_name", SqlType::Text, false)
        .column("last_name", SqlType::Text, false)
        .column("specialization", SqlType::Text, false)
        .column("schedule", SqlType::Text, true)
        .check(in_list_check(
            Specialization::COLUMN,
            Specialization::labels(),
        ))
        .build()
}

fn inventory_table() -> Table {
    TableBuilder::new(Entity::Inventory, "Consumable stock.")
        .column("item_name", SqlType::Text, false)
        .column("quantity", SqlType::Integer, false)
        .column("expiration_date", SqlType::Date, true)
        .check("quantity >= 0".to_string())
        .build()
}

fn machine_inventory_table() -> Table {
    TableBuilder::new(Entity::MachineInventory, "Durable equipment units.")
        .column("machine_name", SqlType::Text, false)
        .column("availability_status", SqlType::Text, false)
        .column("location", SqlType::Text, true)
        .column("last_maintenance_date", SqlType::Date, true)
        .column("next_maintenance_date", SqlType::Date, true)
        .column("inventory_id", SqlType::Integer, false)
        .check(in_list_check(
            AvailabilityStatus::COLUMN,
            AvailabilityStatus::labels(),
        ))
        .references("inventory_id", Entity::Inventory)
        .build()
}

fn appointment_table() -> Table {
    TableBuilder::new(Entity::Appointment, "Patient visits.")
        .column("patient_id", SqlType::Integer, false)
        .column("doctor_id", SqlType::Integer, false)
        .column("appointment_date", SqlType::DateTime, false)
        .column("status", SqlType::Text, false)
        .column("machine_id", SqlType::Integer, true)
        .check(in_list_check(
            AppointmentStatus::COLUMN,
            AppointmentStatus::labels(),
        ))
        .references("patient_id", Entity::Patient)
        .references("doctor_id", Entity::Doctor)
        .references("machine_id", Entity::MachineInventory)
        .build()
}

fn billing_table() -> Table {
    TableBuilder::new(Entity::Billing, "One invoice per patient.")
        .column("patient_id", SqlType::Integer, false)
        .column("amount", SqlType::Real, false)
        .column("billing_date", SqlType::Date, false)
        .column("payment_status", SqlType::Text, false)
        .check("amount >= 0".to_string())
        .check(in_list_check(
            PaymentStatus::COLUMN,
            PaymentStatus::labels(),
        ))
        .references("patient_id", Entity::Patient)
        .build()
}

struct TableBuilder {
    table: Table,
}

impl TableBuilder {
    fn new(entity: Entity, comment: &str) -> Self {
        let pk = entity.primary_key().to_string();
        Self {
            table: Table {
                name: entity.table_name().to_string(),
                comment: Some(comment.to_string()),
                columns: vec![Column {
                    ordinal_position: 1,
                    name: pk.clone(),
                    sql_type: SqlType::Integer,
                    is_nullable: false,
                }],
                constraints: vec![Constraint::PrimaryKey(PrimaryKey {
                    name: None,
                    columns: vec![pk],
                })],
            },
        }
    }

    fn column(mut self, name: &str, sql_type: SqlType, is_nullable: bool) -> Self {
        let ordinal_position = self.table.columns.len() as i16 + 1;
        self.table.columns.push(Column {
            ordinal_position,
            name: name.to_string(),
            sql_type,
            is_nullable,
        });
        self
    }

    fn check(mut self, expression: String) -> Self {
        self.table.constraints.push(Constraint::Check(CheckConstraint {
            name: None,
            expression,
        }));
        self
    }

    fn references(mut self, column: &str, parent: Entity) -> Self {
        self.table
            .constraints
            .push(Constraint::ForeignKey(ForeignKey::simple(
                column,
                parent.table_name(),
                parent.primary_key(),
            )));
        self
    }

    fn build(self) -> Table {
        self.table
    }
}
