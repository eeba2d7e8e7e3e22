//! Insertable rows for each entity, before a primary key is assigned.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::{
    AppointmentStatus, AvailabilityStatus, Gender, InsuranceCategory, PaymentStatus,
    Specialization,
};
use crate::hospital::Entity;
use crate::value::SqlValue;

/// A row that can be written to its entity's table.
///
/// `into_values` yields one value per insertable column of the table, in
/// ordinal order (see [`crate::Table::insertable_columns`]).
pub trait Record {
    const ENTITY: Entity;

    fn into_values(self) -> Vec<SqlValue>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub dob: NaiveDate,
    pub gender: Gender,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub insurance: InsuranceCategory,
}

impl Record for NewPatient {
    const ENTITY: Entity = Entity::Patient;

    fn into_values(self) -> Vec<SqlValue> {
        vec![
            self.first_name.into(),
            self.last_name.into(),
            self.dob.into(),
            self.gender.as_str().into(),
            self.address.into(),
            self.phone.into(),
            self.insurance.as_str().into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDoctor {
    pub first_name: String,
    pub last_name: String,
    pub specialization: Specialization,
    pub schedule: Option<String>,
}

impl Record for NewDoctor {
    const ENTITY: Entity = Entity::Doctor;

    fn into_values(self) -> Vec<SqlValue> {
        vec![
            self.first_name.into(),
            self.last_name.into(),
            self.specialization.as_str().into(),
            self.schedule.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInventoryItem {
    pub item_name: String,
    pub quantity: u32,
    pub expiration_date: Option<NaiveDate>,
}

impl Record for NewInventoryItem {
    const ENTITY: Entity = Entity::Inventory;

    fn into_values(self) -> Vec<SqlValue> {
        vec![
            self.item_name.into(),
            SqlValue::Int(i64::from(self.quantity)),
            self.expiration_date.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMachine {
    pub machine_name: String,
    pub availability: AvailabilityStatus,
    pub location: Option<String>,
    pub last_maintenance_date: Option<NaiveDate>,
    pub next_maintenance_date: Option<NaiveDate>,
    pub inventory_id: i64,
}

impl Record for NewMachine {
    const ENTITY: Entity = Entity::MachineInventory;

    fn into_values(self) -> Vec<SqlValue> {
        vec![
            self.machine_name.into(),
            self.availability.as_str().into(),
            self.location.into(),
            self.last_maintenance_date.into(),
            self.next_maintenance_date.into(),
            self.inventory_id.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub appointment_date: NaiveDateTime,
    pub status: AppointmentStatus,
    pub machine_id: Option<i64>,
}

impl Record for NewAppointment {
    const ENTITY: Entity = Entity::Appointment;

    fn into_values(self) -> Vec<SqlValue> {
        vec![
            self.patient_id.into(),
            self.doctor_id.into(),
            self.appointment_date.into(),
            self.status.as_str().into(),
            self.machine_id.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBilling {
    pub patient_id: i64,
    pub amount: f64,
    pub billing_date: NaiveDate,
    pub payment_status: PaymentStatus,
}

impl Record for NewBilling {
    const ENTITY: Entity = Entity::Billing;

    fn into_values(self) -> Vec<SqlValue> {
        vec![
            self.patient_id.into(),
            self.amount.into(),
            self.billing_date.into(),
            self.payment_status.as_str().into(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hospital::hospital_schema;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn insertable_len(entity: Entity) -> usize {
        hospital_schema()
            .table(entity.table_name())
            .unwrap()
            .insertable_columns()
            .len()
    }

    #[test]
    fn values_line_up_with_insertable_columns() {
        let patient = NewPatient {
            first_name: "Ada".to_string(),
            last_name: "Byron".to_string(),
            dob: date(1990, 1, 2),
            gender: Gender::Female,
            address: None,
            phone: Some("555-0100".to_string()),
            insurance: InsuranceCategory::Public,
        };
        assert_eq!(patient.into_values().len(), insertable_len(Entity::Patient));

        let doctor = NewDoctor {
            first_name: "Gregory".to_string(),
            last_name: "House".to_string(),
            specialization: Specialization::Neurology,
            schedule: None,
        };
        assert_eq!(doctor.into_values().len(), insertable_len(Entity::Doctor));

        let item = NewInventoryItem {
            item_name: "gauze".to_string(),
            quantity: 4,
            expiration_date: None,
        };
        assert_eq!(item.into_values().len(), insertable_len(Entity::Inventory));

        let machine = NewMachine {
            machine_name: "Ventilator".to_string(),
            availability: AvailabilityStatus::Available,
            location: Some("ICU".to_string()),
            last_maintenance_date: None,
            next_maintenance_date: None,
            inventory_id: 1,
        };
        assert_eq!(
            machine.into_values().len(),
            insertable_len(Entity::MachineInventory)
        );

        let appointment = NewAppointment {
            patient_id: 1,
            doctor_id: 2,
            appointment_date: date(2026, 3, 1).and_hms_opt(9, 30, 0).unwrap(),
            status: AppointmentStatus::Scheduled,
            machine_id: None,
        };
        assert_eq!(
            appointment.into_values().len(),
            insertable_len(Entity::Appointment)
        );

        let billing = NewBilling {
            patient_id: 1,
            amount: 120.5,
            billing_date: date(2026, 1, 5),
            payment_status: PaymentStatus::Pending,
        };
        assert_eq!(billing.into_values().len(), insertable_len(Entity::Billing));
    }

    #[test]
    fn optional_columns_become_null() {
        let values = NewAppointment {
            patient_id: 3,
            doctor_id: 4,
            appointment_date: date(2026, 3, 1).and_hms_opt(9, 30, 0).unwrap(),
            status: AppointmentStatus::Cancelled,
            machine_id: None,
        }
        .into_values();

        assert_eq!(values[0], SqlValue::Int(3));
        assert_eq!(values[3], SqlValue::Text("Cancelled".to_string()));
        assert!(values[4].is_null());
    }
}
