//! Audit log DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::infrastructure::database::entities::audit_entry;

/// One audit log line
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuditEntryDto {
    pub id: i32,
    /// ID of the user who acted; kept even after the user is deleted
    pub actor_id: i32,
    pub action: String,
    pub recorded_at: DateTime<Utc>,
}

impl From<audit_entry::Model> for AuditEntryDto {
    fn from(e: audit_entry::Model) -> Self {
        Self {
            id: e.id,
            actor_id: e.actor_id,
            action: e.action,
            recorded_at: e.recorded_at,
        }
    }
}
