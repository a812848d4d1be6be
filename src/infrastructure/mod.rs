//! Infrastructure layer: database, crypto, file storage

pub mod crypto;
pub mod database;
pub mod storage;

pub use database::{init_database, DatabaseConfig};
pub use storage::{EvidenceStore, FsEvidenceStore};
