//! Database entities module

pub mod activity;
pub mod audit_entry;
pub mod crew;
pub mod crew_leader;
pub mod employee;
pub mod evidence;
pub mod neighborhood;
pub mod user;

pub use activity::Entity as Activity;
pub use audit_entry::Entity as AuditEntry;
pub use crew::Entity as Crew;
pub use crew_leader::Entity as CrewLeader;
pub use employee::Entity as Employee;
pub use evidence::Entity as Evidence;
pub use neighborhood::Entity as Neighborhood;
pub use user::Entity as User;
