//! In-memory RecordRepository implementation for tests and local runs.

use std::collections::BTreeMap;
use std::sync::RwLock;

use battle_core::BattleRecord;

use crate::repository::{RecordRepository, RepositoryError, Result};

#[derive(Default)]
pub struct InMemoryRecordRepository {
    records: RwLock<BTreeMap<String, BattleRecord>>,
}

impl InMemoryRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordRepository for InMemoryRecordRepository {
    fn save(&self, record: &BattleRecord) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn load(&self, id: &str) -> Result<Option<BattleRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(records.get(id).cloned())
    }

    fn exists(&self, id: &str) -> bool {
        self.records
            .read()
            .map(|records| records.contains_key(id))
            .unwrap_or(false)
    }

    fn delete(&self, id: &str) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        records.remove(id);
        Ok(())
    }

    fn list_ids(&self) -> Result<Vec<String>> {
        let records = self
            .records
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(records.keys().cloned().collect())
    }
}
