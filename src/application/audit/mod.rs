pub mod service;

pub use service::AuditLog;
