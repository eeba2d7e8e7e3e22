//! Generation settings for a population run.
//!
//! Every field defaults to the volumes and windows of the reference dataset,
//! so an empty config file reproduces it.

use chrono::{Duration, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// What to do when the target tables already hold rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExistingRows {
    /// Abort before writing anything.
    #[default]
    Refuse,
    /// Keep existing rows and add a new batch next to them.
    Append,
    /// Delete existing rows, children first, then populate.
    Reset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PopulateConfig {
    /// Seed for every random draw. A random seed is chosen (and logged) when absent.
    pub seed: Option<u64>,
    /// Instant treated as "now" by all date windows. Defaults to the current UTC time.
    pub anchor: Option<NaiveDateTime>,
    pub volumes: Volumes,
    /// Equipment types and how many units of each to create.
    pub equipment: Vec<EquipmentEntry>,
    /// Locations assigned to equipment units. Units get no location when empty.
    pub locations: Vec<String>,
    pub windows: DateWindows,
    pub inventory_quantity: QuantityRange,
    pub billing_amount: AmountRange,
    /// Probability that an appointment references a machine.
    pub appointment_machine_rate: f64,
    /// Probability that an inventory item carries an expiration date.
    pub inventory_expiration_rate: f64,
    /// Upper bound on the length of a doctor's schedule text.
    pub schedule_max_chars: usize,
    pub if_populated: ExistingRows,
}

impl Default for PopulateConfig {
    fn default() -> Self {
        Self {
            seed: None,
            anchor: None,
            volumes: Volumes::default(),
            equipment: default_equipment(),
            locations: ["ER Room 1", "ER Room 2", "ER Room 3", "Radiology", "ICU"]
                .iter()
                .map(|location| location.to_string())
                .collect(),
            windows: DateWindows::default(),
            inventory_quantity: QuantityRange { min: 1, max: 100 },
            billing_amount: AmountRange {
                min: 50.0,
                max: 5000.0,
            },
            appointment_machine_rate: 1.0,
            inventory_expiration_rate: 1.0,
            schedule_max_chars: 50,
            if_populated: ExistingRows::Refuse,
        }
    }
}

/// Row counts for the independently sized tables. Billing always gets one
/// row per patient and machine rows follow the equipment catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Volumes {
    pub patients: u64,
    pub doctors: u64,
    pub inventory_items: u64,
    pub appointments: u64,
}

impl Default for Volumes {
    fn default() -> Self {
        Self {
            patients: 50,
            doctors: 20,
            inventory_items: 10,
            appointments: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EquipmentEntry {
    pub name: String,
    pub units: u64,
}

impl EquipmentEntry {
    pub fn new(name: &str, units: u64) -> Self {
        Self {
            name: name.to_string(),
            units,
        }
    }
}

fn default_equipment() -> Vec<EquipmentEntry> {
    vec![
        EquipmentEntry::new("X-Ray Machine", 5),
        EquipmentEntry::new("MRI Scanner", 3),
        EquipmentEntry::new("Ventilator", 10),
        EquipmentEntry::new("ECG Machine", 8),
        EquipmentEntry::new("Defibrillator", 6),
    ]
}

/// Date windows, all relative to the anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DateWindows {
    pub patient_age: AgeRange,
    pub inventory_expiration: DayWindow,
    pub last_maintenance: DayWindow,
    pub next_maintenance: DayWindow,
    pub appointment: DayWindow,
    pub billing: DayWindow,
}

impl Default for DateWindows {
    fn default() -> Self {
        Self {
            patient_age: AgeRange {
                min_years: 1,
                max_years: 90,
            },
            inventory_expiration: DayWindow::new(0, 2191),
            last_maintenance: DayWindow::new(-365, 0),
            next_maintenance: DayWindow::new(0, 365),
            appointment: DayWindow::new(0, 7),
            billing: DayWindow::new(-182, 0),
        }
    }
}

/// Inclusive day offsets from the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DayWindow {
    pub start_days: i64,
    pub end_days: i64,
}

impl DayWindow {
    pub const fn new(start_days: i64, end_days: i64) -> Self {
        Self {
            start_days,
            end_days,
        }
    }

    pub fn dates(&self, anchor: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
        Ok((
            shift_date(anchor, self.start_days)?,
            shift_date(anchor, self.end_days)?,
        ))
    }

    pub fn instants(&self, anchor: NaiveDateTime) -> Result<(NaiveDateTime, NaiveDateTime)> {
        Ok((
            shift_instant(anchor, self.start_days)?,
            shift_instant(anchor, self.end_days)?,
        ))
    }
}

/// Inclusive age bounds in whole years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgeRange {
    pub min_years: u32,
    pub max_years: u32,
}

impl AgeRange {
    /// Earliest and latest birth dates for the range as of `anchor`.
    pub fn birth_dates(&self, anchor: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
        let years_back = |years: u32| {
            anchor
                .checked_sub_months(Months::new(years.saturating_mul(12)))
                .ok_or_else(|| {
                    Error::InvalidConfig(format!("age of {years} years is out of range"))
                })
        };
        Ok((years_back(self.max_years)?, years_back(self.min_years)?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuantityRange {
    pub min: u32,
    pub max: u32,
}

/// Inclusive currency bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AmountRange {
    pub min: f64,
    pub max: f64,
}

impl PopulateConfig {
    /// Total number of machine rows the catalog produces.
    pub fn total_machine_units(&self) -> u64 {
        self.equipment.iter().map(|entry| entry.units).sum()
    }

    /// Anchor for date windows, falling back to the current UTC time.
    pub fn resolve_anchor(&self) -> NaiveDateTime {
        self.anchor
            .unwrap_or_else(|| chrono::Utc::now().naive_utc())
    }

    /// Reject settings that cannot produce a consistent dataset.
    pub fn validate(&self) -> Result<()> {
        if self.inventory_quantity.min > self.inventory_quantity.max {
            return Err(invalid("inventory_quantity.min must be <= max"));
        }

        let amount = self.billing_amount;
        if !amount.min.is_finite() || !amount.max.is_finite() {
            return Err(invalid("billing_amount bounds must be finite"));
        }
        if amount.min < 0.0 {
            return Err(invalid("billing_amount.min must be >= 0"));
        }
        if amount.min > amount.max {
            return Err(invalid("billing_amount.min must be <= max"));
        }

        for (name, rate) in [
            ("appointment_machine_rate", self.appointment_machine_rate),
            ("inventory_expiration_rate", self.inventory_expiration_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(invalid(&format!("{name} must be within [0, 1]")));
            }
        }

        if self.windows.patient_age.min_years > self.windows.patient_age.max_years {
            return Err(invalid("windows.patient_age.min_years must be <= max_years"));
        }
        for (name, window) in [
            ("inventory_expiration", self.windows.inventory_expiration),
            ("last_maintenance", self.windows.last_maintenance),
            ("next_maintenance", self.windows.next_maintenance),
            ("appointment", self.windows.appointment),
            ("billing", self.windows.billing),
        ] {
            if window.start_days > window.end_days {
                return Err(invalid(&format!(
                    "windows.{name}.start_days must be <= end_days"
                )));
            }
        }

        for entry in &self.equipment {
            if entry.name.trim().is_empty() {
                return Err(invalid("equipment names must not be blank"));
            }
            if entry.units == 0 {
                return Err(invalid(&format!(
                    "equipment '{}' must have at least one unit",
                    entry.name
                )));
            }
        }

        if self.schedule_max_chars == 0 {
            return Err(invalid("schedule_max_chars must be > 0"));
        }

        Ok(())
    }
}

fn invalid(message: &str) -> Error {
    Error::InvalidConfig(message.to_string())
}

fn shift_date(anchor: NaiveDate, days: i64) -> Result<NaiveDate> {
    Duration::try_days(days)
        .and_then(|delta| anchor.checked_add_signed(delta))
        .ok_or_else(|| Error::InvalidConfig(format!("day offset {days} is out of range")))
}

fn shift_instant(anchor: NaiveDateTime, days: i64) -> Result<NaiveDateTime> {
    Duration::try_days(days)
        .and_then(|delta| anchor.checked_add_signed(delta))
        .ok_or_else(|| Error::InvalidConfig(format!("day offset {days} is out of range")))
}
