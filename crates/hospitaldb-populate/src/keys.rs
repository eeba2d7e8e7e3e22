use std::collections::BTreeMap;

use hospitaldb_core::Entity;
use rand::{Rng, RngCore};

use crate::errors::PopulateError;

/// Primary keys committed for one table, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySet {
    keys: Vec<i64>,
}

impl KeySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: i64) {
        self.keys.push(key);
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, key: i64) -> bool {
        self.keys.contains(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.keys.iter().copied()
    }

    /// Uniform draw from the set; `None` when it is empty.
    pub fn pick(&self, rng: &mut dyn RngCore) -> Option<i64> {
        if self.keys.is_empty() {
            return None;
        }
        let idx = rng.random_range(0..self.keys.len());
        Some(self.keys[idx])
    }
}

impl FromIterator<i64> for KeySet {
    fn from_iter<T: IntoIterator<Item = i64>>(iter: T) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

/// Source of foreign-key values for dependent rows.
pub trait ForeignContext {
    /// Draw a key of `parent` for a row of `child`.
    fn pick_fk(
        &self,
        child: Entity,
        parent: Entity,
        rng: &mut dyn RngCore,
    ) -> Result<i64, PopulateError>;

    /// Committed key set of `parent`, failing when nothing was committed.
    fn require(&self, child: Entity, parent: Entity) -> Result<&KeySet, PopulateError>;
}

/// Key sets captured after each table is persisted.
#[derive(Debug, Clone, Default)]
pub struct KeyRegistry {
    committed: BTreeMap<Entity, KeySet>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingest(&mut self, entity: Entity, keys: KeySet) {
        self.committed.insert(entity, keys);
    }

    pub fn keys(&self, entity: Entity) -> Option<&KeySet> {
        self.committed.get(&entity)
    }
}

impl ForeignContext for KeyRegistry {
    fn pick_fk(
        &self,
        child: Entity,
        parent: Entity,
        rng: &mut dyn RngCore,
    ) -> Result<i64, PopulateError> {
        self.require(child, parent)?
            .pick(rng)
            .ok_or_else(|| empty_pool(child, parent))
    }

    fn require(&self, child: Entity, parent: Entity) -> Result<&KeySet, PopulateError> {
        match self.committed.get(&parent) {
            Some(keys) if !keys.is_empty() => Ok(keys),
            _ => Err(empty_pool(child, parent)),
        }
    }
}

fn empty_pool(child: Entity, parent: Entity) -> PopulateError {
    PopulateError::EmptyReferencePool {
        table: child.table_name().to_string(),
        referenced: parent.table_name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn picks_only_committed_keys() {
        let mut registry = KeyRegistry::new();
        registry.ingest(Entity::Patient, [4, 8, 15].into_iter().collect());
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        for _ in 0..100 {
            let key = registry
                .pick_fk(Entity::Appointment, Entity::Patient, &mut rng)
                .unwrap();
            assert!([4, 8, 15].contains(&key));
        }
    }

    #[test]
    fn missing_pool_fails_fast() {
        let registry = KeyRegistry::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let err = registry
            .pick_fk(Entity::Appointment, Entity::Doctor, &mut rng)
            .unwrap_err();
        assert!(matches!(
            err,
            PopulateError::EmptyReferencePool { ref table, ref referenced }
                if table == "Appointment" && referenced == "Doctor"
        ));
    }

    #[test]
    fn empty_pool_fails_fast() {
        let mut registry = KeyRegistry::new();
        registry.ingest(Entity::Inventory, KeySet::new());
        let err = registry
            .require(Entity::MachineInventory, Entity::Inventory)
            .unwrap_err();
        assert!(matches!(err, PopulateError::EmptyReferencePool { .. }));
    }

    #[test]
    fn every_key_is_reachable() {
        let keys: KeySet = (1..=5).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..500 {
            seen.insert(keys.pick(&mut rng).unwrap());
        }
        assert_eq!(seen.len(), 5);
    }
}
