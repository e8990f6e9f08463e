//! Repository contract for finished battle records.

use battle_core::BattleRecord;

use super::error::Result;

/// Storage for [`BattleRecord`]s, keyed by record id.
///
/// Records are immutable once a battle ends; saving an existing id replaces
/// the stored copy.
pub trait RecordRepository: Send + Sync {
    fn save(&self, record: &BattleRecord) -> Result<()>;

    fn load(&self, id: &str) -> Result<Option<BattleRecord>>;

    fn exists(&self, id: &str) -> bool {
        matches!(self.load(id), Ok(Some(_)))
    }

    fn delete(&self, id: &str) -> Result<()>;

    /// All stored ids, sorted.
    fn list_ids(&self) -> Result<Vec<String>>;
}
