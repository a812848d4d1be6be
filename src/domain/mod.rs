//! Domain layer: actor context, role/profile union, read models

pub mod models;

pub use models::actor::Actor;
pub use models::role_profile::RoleProfile;
pub use models::views::{ActivityListing, CrewDetail, UploadReport};

// Re-export commonly used types
pub use crate::infrastructure::database::entities::user::UserRole;
pub use crate::shared::{DomainError, DomainResult};
