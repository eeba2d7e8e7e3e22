//! Core contracts for hospitaldb.
//!
//! This crate defines the hospital table catalog, the schema model it is
//! expressed in, the domain value sets, insertable record types, and the
//! generation settings shared by the populator, report, and CLI crates.

pub mod config;
pub mod constraints;
pub mod ddl;
pub mod domain;
pub mod error;
pub mod graph;
pub mod hospital;
pub mod records;
pub mod schema;
pub mod validation;
pub mod value;

pub use config::{
    AgeRange, AmountRange, DateWindows, DayWindow, EquipmentEntry, ExistingRows, PopulateConfig,
    QuantityRange, Volumes,
};
pub use constraints::{CheckConstraint, Constraint, ForeignKey, PrimaryKey};
pub use ddl::render_create_table;
pub use domain::{
    AppointmentStatus, AvailabilityStatus, Gender, InsuranceCategory, PaymentStatus,
    Specialization,
};
pub use error::{Error, Result};
pub use graph::{FkGraphReport, FkGraphSummary, build_fk_graph_report};
pub use hospital::{Entity, hospital_schema};
pub use records::{
    NewAppointment, NewBilling, NewDoctor, NewInventoryItem, NewMachine, NewPatient, Record,
};
pub use schema::{Column, DatabaseSchema, SqlType, Table};
pub use validation::validate_schema;
pub use value::SqlValue;

/// Current contract version of the schema model.
pub const SCHEMA_VERSION: &str = "0.1";
