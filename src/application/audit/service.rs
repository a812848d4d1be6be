//! Audit log — append-only history of administrative actions
//!
//! Writes are best-effort by design: a failed audit insert is logged and
//! swallowed, never rolling back or failing the operation that triggered
//! it. Entries are recorded after the primary transaction commits.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use tracing::warn;

use crate::domain::{Actor, DomainError, DomainResult};
use crate::infrastructure::database::entities::{audit_entry, AuditEntry};

pub struct AuditLog {
    db: DatabaseConnection,
}

impl AuditLog {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Append one entry naming the actor. Fire-and-forget.
    pub async fn record(&self, actor_id: i32, action: impl Into<String>) {
        let action = action.into();
        let entry = audit_entry::ActiveModel {
            actor_id: Set(actor_id),
            action: Set(action.clone()),
            recorded_at: Set(Utc::now()),
            ..Default::default()
        };

        if let Err(e) = entry.insert(&self.db).await {
            warn!(actor_id, action = %action, error = %e, "Failed to record audit entry");
        }
    }

    /// Full history, newest first. Admin only.
    pub async fn list(&self, actor: &Actor) -> DomainResult<Vec<audit_entry::Model>> {
        if !actor.is_admin() {
            return Err(DomainError::Forbidden(
                "Only administrators may view the audit log".into(),
            ));
        }

        Ok(AuditEntry::find()
            .order_by_desc(audit_entry::Column::RecordedAt)
            .all(&self.db)
            .await?)
    }
}
