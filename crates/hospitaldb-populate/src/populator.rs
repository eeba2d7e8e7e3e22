use std::time::Instant;

use chrono::{NaiveDateTime, SubsecRound};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use hospitaldb_core::{
    AppointmentStatus, AvailabilityStatus, DatabaseSchema, Entity, ExistingRows, Gender,
    InsuranceCategory, NewAppointment, NewBilling, NewDoctor, NewInventoryItem, NewMachine,
    NewPatient, PaymentStatus, PopulateConfig, Record, Specialization, Table, validate_schema,
};

use crate::errors::PopulateError;
use crate::keys::{ForeignContext, KeyRegistry, KeySet};
use crate::model::{PopulationOutcome, PopulationReport, TableReport};
use crate::planner::{PopulationTask, plan_population};
use crate::sources::ValueSource;
use crate::store::RecordStore;

/// Fills the hospital tables parent-first, drawing every foreign key from
/// the keys this run has already written.
pub struct Populator<'a, V: ValueSource> {
    schema: &'a DatabaseSchema,
    config: &'a PopulateConfig,
    source: V,
    seed: u64,
    anchor: NaiveDateTime,
}

impl<'a, V: ValueSource> Populator<'a, V> {
    pub fn new(
        schema: &'a DatabaseSchema,
        config: &'a PopulateConfig,
        source: V,
        seed: u64,
    ) -> Result<Self, PopulateError> {
        validate_schema(schema)?;
        config.validate()?;

        Ok(Self {
            schema,
            config,
            source,
            seed,
            anchor: config.resolve_anchor().trunc_subsecs(0),
        })
    }

    pub fn anchor(&self) -> NaiveDateTime {
        self.anchor
    }

    /// Populate every table through `store`.
    ///
    /// The store is expected to be transactional when atomicity matters: on
    /// error, rows written so far are left for the caller to roll back.
    pub async fn populate<S>(&mut self, store: &mut S) -> Result<PopulationOutcome, PopulateError>
    where
        S: RecordStore + ?Sized,
    {
        let start = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let tasks = plan_population(self.schema, self.config)?;
        let mut report = PopulationReport::new(
            run_id.clone(),
            self.seed,
            self.anchor,
            self.config.if_populated,
        );
        let mut registry = KeyRegistry::new();

        info!(
            run_id = %run_id,
            tables = tasks.len(),
            seed = self.seed,
            anchor = %self.anchor,
            if_populated = ?self.config.if_populated,
            "population started"
        );

        report.rows_cleared = self.apply_existing_rows(store, &tasks).await?;

        for task in &tasks {
            let table = self.table(task.entity)?;
            let table_start = Instant::now();
            let mut rng = ChaCha8Rng::seed_from_u64(hash_seed(self.seed, &table.name));

            info!(table = %table.name, rows = task.rows, "populating table");

            let keys = match task.entity {
                Entity::Patient => self.patients(store, table, task.rows, &mut rng).await?,
                Entity::Doctor => self.doctors(store, table, task.rows, &mut rng).await?,
                Entity::Inventory => self.inventory(store, table, task.rows, &mut rng).await?,
                Entity::MachineInventory => {
                    self.machines(store, table, &registry, &mut rng).await?
                }
                Entity::Appointment => {
                    self.appointments(store, table, task.rows, &registry, &mut rng)
                        .await?
                }
                Entity::Billing => self.billing(store, table, &registry, &mut rng).await?,
            };

            let duration_ms = table_start.elapsed().as_millis() as u64;
            info!(
                table = %table.name,
                rows_generated = keys.len(),
                duration_ms,
                "table populated"
            );
            report.tables.push(TableReport {
                table: table.name.clone(),
                rows_requested: task.rows,
                rows_generated: keys.len() as u64,
                duration_ms,
            });
            registry.ingest(task.entity, keys);
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            run_id = %run_id,
            rows = report.total_rows(),
            rows_cleared = report.rows_cleared,
            duration_ms = report.duration_ms,
            "population completed"
        );

        Ok(PopulationOutcome {
            report,
            keys: registry,
        })
    }

    async fn apply_existing_rows<S>(
        &self,
        store: &mut S,
        tasks: &[PopulationTask],
    ) -> Result<u64, PopulateError>
    where
        S: RecordStore + ?Sized,
    {
        match self.config.if_populated {
            ExistingRows::Append => Ok(0),
            ExistingRows::Refuse => {
                for task in tasks {
                    let table = self.table(task.entity)?;
                    let rows = store.count(table).await?;
                    if rows > 0 {
                        warn!(table = %table.name, rows, "tables already populated");
                        return Err(PopulateError::AlreadyPopulated {
                            table: table.name.clone(),
                            rows,
                        });
                    }
                }
                Ok(0)
            }
            ExistingRows::Reset => {
                let mut cleared = 0;
                // Children first so no delete trips a foreign key.
                for task in tasks.iter().rev() {
                    let table = self.table(task.entity)?;
                    let rows = store.clear(table).await?;
                    if rows > 0 {
                        info!(table = %table.name, rows, "existing rows cleared");
                    }
                    cleared += rows;
                }
                Ok(cleared)
            }
        }
    }

    fn table(&self, entity: Entity) -> Result<&'a Table, PopulateError> {
        self.schema
            .table(entity.table_name())
            .ok_or_else(|| PopulateError::UnknownTable(entity.table_name().to_string()))
    }

    async fn patients<S>(
        &mut self,
        store: &mut S,
        table: &Table,
        rows: u64,
        rng: &mut ChaCha8Rng,
    ) -> Result<KeySet, PopulateError>
    where
        S: RecordStore + ?Sized,
    {
        let (earliest, latest) = self
            .config
            .windows
            .patient_age
            .birth_dates(self.anchor.date())?;

        let mut keys = KeySet::new();
        for _ in 0..rows {
            let record = NewPatient {
                first_name: self.source.next_first_name(),
                last_name: self.source.next_last_name(),
                dob: self.source.next_date_in_range(earliest, latest),
                gender: pick(Gender::ALL, rng),
                address: Some(self.source.next_address()),
                phone: Some(self.source.next_phone()),
                insurance: pick(InsuranceCategory::ALL, rng),
            };
            keys.push(write(store, table, record).await?);
        }
        Ok(keys)
    }

    async fn doctors<S>(
        &mut self,
        store: &mut S,
        table: &Table,
        rows: u64,
        rng: &mut ChaCha8Rng,
    ) -> Result<KeySet, PopulateError>
    where
        S: RecordStore + ?Sized,
    {
        let mut keys = KeySet::new();
        for _ in 0..rows {
            let record = NewDoctor {
                first_name: self.source.next_first_name(),
                last_name: self.source.next_last_name(),
                specialization: pick(Specialization::ALL, rng),
                schedule: Some(self.source.next_text(self.config.schedule_max_chars)),
            };
            keys.push(write(store, table, record).await?);
        }
        Ok(keys)
    }

    async fn inventory<S>(
        &mut self,
        store: &mut S,
        table: &Table,
        rows: u64,
        rng: &mut ChaCha8Rng,
    ) -> Result<KeySet, PopulateError>
    where
        S: RecordStore + ?Sized,
    {
        let quantity = self.config.inventory_quantity;
        let (expires_from, expires_to) = self
            .config
            .windows
            .inventory_expiration
            .dates(self.anchor.date())?;

        let mut keys = KeySet::new();
        for _ in 0..rows {
            let expiration_date = if rng.random_bool(self.config.inventory_expiration_rate) {
                Some(self.source.next_date_in_range(expires_from, expires_to))
            } else {
                None
            };
            let record = NewInventoryItem {
                item_name: self.source.next_word(),
                quantity: rng.random_range(quantity.min..=quantity.max),
                expiration_date,
            };
            keys.push(write(store, table, record).await?);
        }
        Ok(keys)
    }

    /// One row per catalog unit, each tied to an existing inventory item.
    async fn machines<S>(
        &mut self,
        store: &mut S,
        table: &Table,
        registry: &KeyRegistry,
        rng: &mut ChaCha8Rng,
    ) -> Result<KeySet, PopulateError>
    where
        S: RecordStore + ?Sized,
    {
        let today = self.anchor.date();
        let (last_from, last_to) = self.config.windows.last_maintenance.dates(today)?;
        let (next_from, next_to) = self.config.windows.next_maintenance.dates(today)?;
        let locations = &self.config.locations;

        let mut keys = KeySet::new();
        for entry in &self.config.equipment {
            for _ in 0..entry.units {
                let inventory_id =
                    registry.pick_fk(Entity::MachineInventory, Entity::Inventory, rng)?;
                let location = if locations.is_empty() {
                    None
                } else {
                    Some(locations[rng.random_range(0..locations.len())].clone())
                };
                let record = NewMachine {
                    machine_name: entry.name.clone(),
                    availability: pick(AvailabilityStatus::ALL, rng),
                    location,
                    last_maintenance_date: Some(self.source.next_date_in_range(last_from, last_to)),
                    next_maintenance_date: Some(self.source.next_date_in_range(next_from, next_to)),
                    inventory_id,
                };
                keys.push(write(store, table, record).await?);
            }
        }
        Ok(keys)
    }

    async fn appointments<S>(
        &mut self,
        store: &mut S,
        table: &Table,
        rows: u64,
        registry: &KeyRegistry,
        rng: &mut ChaCha8Rng,
    ) -> Result<KeySet, PopulateError>
    where
        S: RecordStore + ?Sized,
    {
        let mut keys = KeySet::new();
        if rows == 0 {
            return Ok(keys);
        }

        let machine_rate = self.config.appointment_machine_rate;
        registry.require(Entity::Appointment, Entity::Patient)?;
        registry.require(Entity::Appointment, Entity::Doctor)?;
        if machine_rate > 0.0 {
            registry.require(Entity::Appointment, Entity::MachineInventory)?;
        }

        let (from, to) = self.config.windows.appointment.instants(self.anchor)?;
        for _ in 0..rows {
            let patient_id = registry.pick_fk(Entity::Appointment, Entity::Patient, rng)?;
            let doctor_id = registry.pick_fk(Entity::Appointment, Entity::Doctor, rng)?;
            let machine_id = if rng.random_bool(machine_rate) {
                Some(registry.pick_fk(Entity::Appointment, Entity::MachineInventory, rng)?)
            } else {
                None
            };
            let record = NewAppointment {
                patient_id,
                doctor_id,
                appointment_date: self.source.next_datetime_in_range(from, to),
                status: pick(AppointmentStatus::ALL, rng),
                machine_id,
            };
            keys.push(write(store, table, record).await?);
        }
        Ok(keys)
    }

    /// One invoice per patient written by this run.
    async fn billing<S>(
        &mut self,
        store: &mut S,
        table: &Table,
        registry: &KeyRegistry,
        rng: &mut ChaCha8Rng,
    ) -> Result<KeySet, PopulateError>
    where
        S: RecordStore + ?Sized,
    {
        let mut keys = KeySet::new();
        let Some(patients) = registry.keys(Entity::Patient) else {
            return Ok(keys);
        };

        let bounds = self.config.billing_amount;
        let (from, to) = self.config.windows.billing.dates(self.anchor.date())?;
        for patient_id in patients.iter() {
            let raw = rng.random_range(bounds.min..=bounds.max);
            let record = NewBilling {
                patient_id,
                amount: ((raw * 100.0).round() / 100.0).clamp(bounds.min, bounds.max),
                billing_date: self.source.next_date_in_range(from, to),
                payment_status: pick(PaymentStatus::ALL, rng),
            };
            keys.push(write(store, table, record).await?);
        }
        Ok(keys)
    }
}

async fn write<S, R>(store: &mut S, table: &Table, record: R) -> Result<i64, PopulateError>
where
    S: RecordStore + ?Sized,
    R: Record,
{
    debug_assert_eq!(R::ENTITY.table_name(), table.name);
    store.insert(table, record.into_values()).await
}

/// Uniform choice from a non-empty value set.
fn pick<T: Copy>(values: &[T], rng: &mut impl Rng) -> T {
    values[rng.random_range(0..values.len())]
}

pub(crate) fn hash_seed(seed: u64, key: &str) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in key.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
