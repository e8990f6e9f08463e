//! List stored battle records.

use anyhow::Result;
use clap::Parser;

use battle_runtime::{FileRecordRepository, RecordRepository, RuntimeConfig};

/// List stored battle records
#[derive(Parser, Debug)]
pub struct Records {}

impl Records {
    pub fn execute(self, runtime: RuntimeConfig) -> Result<()> {
        let dir = runtime.records_dir();
        let repository = FileRecordRepository::new(&dir)?;
        let ids = repository.list_ids()?;
        if ids.is_empty() {
            println!("No records in {}", dir.display());
        }
        for id in ids {
            println!("{id}");
        }
        Ok(())
    }
}
