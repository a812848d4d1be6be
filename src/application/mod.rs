pub mod activities;
pub mod audit;
pub mod crews;
pub mod evidence;
pub mod identity;

pub use activities::ActivityService;
pub use audit::AuditLog;
pub use crews::CrewService;
pub use evidence::EvidenceService;
pub use identity::IdentityService;
