//! File-based RecordRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use battle_core::BattleRecord;

use crate::repository::{RecordRepository, RepositoryError, Result};

const PREFIX: &str = "record_";
const EXTENSION: &str = "json";

/// Stores each record as `record_{hex(id)}.json`.
///
/// Record ids contain `:`, so the file name carries the hex-encoded id rather
/// than the id itself.
pub struct FileRecordRepository {
    base_dir: PathBuf,
}

impl FileRecordRepository {
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.base_dir
            .join(format!("{PREFIX}{}.{EXTENSION}", hex::encode(id)))
    }

    fn id_from_path(path: &Path) -> Option<String> {
        if path.extension()? != EXTENSION {
            return None;
        }
        let stem = path.file_stem()?.to_str()?.strip_prefix(PREFIX)?;
        let bytes = hex::decode(stem).ok()?;
        String::from_utf8(bytes).ok()
    }
}

impl RecordRepository for FileRecordRepository {
    fn save(&self, record: &BattleRecord) -> Result<()> {
        let path = self.record_path(&record.id);
        let temp_path = path.with_extension("json.tmp");

        let bytes = serde_json::to_vec(record)?;
        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &path)?;

        tracing::debug!("Saved record[{}] to {}", record.id, path.display());
        Ok(())
    }

    fn load(&self, id: &str) -> Result<Option<BattleRecord>> {
        let path = self.record_path(id);
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path)?;
        let record: BattleRecord = serde_json::from_slice(&bytes)?;
        if record.id != id {
            return Err(RepositoryError::CorruptedData(format!(
                "{} holds record {}",
                path.display(),
                record.id
            )));
        }

        tracing::debug!("Loaded record[{}] from {}", id, path.display());
        Ok(Some(record))
    }

    fn exists(&self, id: &str) -> bool {
        self.record_path(id).exists()
    }

    fn delete(&self, id: &str) -> Result<()> {
        let path = self.record_path(id);
        if path.exists() {
            fs::remove_file(&path)?;
            tracing::debug!("Deleted record[{}]", id);
        }
        Ok(())
    }

    fn list_ids(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            if let Some(id) = Self::id_from_path(&entry?.path()) {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }
}
