//! Storage for finished battle records.
//!
//! The engine never touches storage. Sessions hand finished records to the
//! persistence worker, which writes them through a [`RecordRepository`].

mod error;
mod file;
mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FileRecordRepository;
pub use memory::InMemoryRecordRepository;
pub use traits::RecordRepository;
