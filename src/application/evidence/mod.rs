pub mod service;

pub use service::{EvidenceService, IncomingFile};
