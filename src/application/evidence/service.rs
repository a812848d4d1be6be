//! Photo evidence for activities.
//!
//! Uploads are employee-only and per-file best-effort: a file with a
//! disallowed extension or a failed write produces a warning instead of
//! aborting the batch. Each accepted file is written to the store before
//! its row is staged, and all rows commit in one transaction, so a row
//! never points at a file that was not written.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::{info, warn};

use crate::application::activities::ActivityService;
use crate::application::audit::AuditLog;
use crate::domain::{Actor, DomainError, DomainResult, UploadReport, UserRole};
use crate::infrastructure::database::entities::{evidence, Evidence};
use crate::infrastructure::storage::{allowed_file, sanitize_filename, unique_name, EvidenceStore};

/// A file received from the client: original name plus raw bytes.
pub struct IncomingFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

pub struct EvidenceService {
    db: DatabaseConnection,
    audit: Arc<AuditLog>,
    store: Arc<dyn EvidenceStore>,
    activities: Arc<ActivityService>,
}

impl EvidenceService {
    pub fn new(
        db: DatabaseConnection,
        audit: Arc<AuditLog>,
        store: Arc<dyn EvidenceStore>,
        activities: Arc<ActivityService>,
    ) -> Self {
        Self {
            db,
            audit,
            store,
            activities,
        }
    }

    /// Store a batch of photos for an activity. Only employees upload
    /// evidence. Returns how many files were stored plus a warning per
    /// skipped file.
    pub async fn upload(
        &self,
        actor: &Actor,
        activity_id: i32,
        files: Vec<IncomingFile>,
    ) -> DomainResult<UploadReport> {
        if actor.role != UserRole::Employee {
            return Err(DomainError::Forbidden(
                "Only employees upload evidence".into(),
            ));
        }
        let activity = self.activities.get_activity(actor, activity_id).await?;

        if files.is_empty() {
            return Err(DomainError::Validation("No files in request".into()));
        }

        let mut warnings = Vec::new();
        let mut stored_paths = Vec::new();

        for file in &files {
            let original = sanitize_filename(&file.filename);
            if !allowed_file(&original) {
                warnings.push(format!("Disallowed file type: {original}"));
                continue;
            }
            let name = unique_name(&original);
            if let Err(e) = self.store.write(&name, &file.bytes).await {
                warn!(file = %original, error = %e, "Failed to store evidence file");
                warnings.push(format!("Could not store {original}"));
                continue;
            }
            stored_paths.push(name);
        }

        if !stored_paths.is_empty() {
            let txn = self.db.begin().await?;
            for path in &stored_paths {
                evidence::ActiveModel {
                    activity_id: Set(activity_id),
                    image_path: Set(path.clone()),
                    uploaded_at: Set(Utc::now()),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
            }
            txn.commit().await?;

            self.audit
                .record(
                    actor.user_id,
                    format!(
                        "Uploaded {} evidence file(s) for activity {}",
                        stored_paths.len(),
                        activity.name
                    ),
                )
                .await;
        }

        info!(
            activity_id,
            stored = stored_paths.len(),
            skipped = warnings.len(),
            "Evidence upload processed"
        );
        Ok(UploadReport {
            stored: stored_paths.len(),
            warnings,
        })
    }

    /// Evidence rows for an activity, newest first. Visibility follows the
    /// activity's crew scope.
    pub async fn list_for_activity(
        &self,
        actor: &Actor,
        activity_id: i32,
    ) -> DomainResult<Vec<evidence::Model>> {
        self.activities.get_activity(actor, activity_id).await?;

        Ok(Evidence::find()
            .filter(evidence::Column::ActivityId.eq(activity_id))
            .order_by_desc(evidence::Column::UploadedAt)
            .all(&self.db)
            .await?)
    }

    /// Delete one evidence item: file first (idempotent), then the row.
    /// A missing backing file does not block the row deletion.
    pub async fn delete(&self, actor: &Actor, evidence_id: i32) -> DomainResult<()> {
        let row = Evidence::find_by_id(evidence_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Evidence", evidence_id))?;

        let activity = self.activities.get_activity(actor, row.activity_id).await?;

        if let Err(e) = self.store.remove(&row.image_path).await {
            warn!(path = %row.image_path, error = %e, "Failed to remove evidence file");
        }
        Evidence::delete_by_id(evidence_id).exec(&self.db).await?;

        self.audit
            .record(
                actor.user_id,
                format!("Deleted evidence {} of activity {}", evidence_id, activity.name),
            )
            .await;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::crews::service::CrewInput;
    use crate::application::crews::CrewService;
    use crate::application::identity::IdentityService;
    use crate::infrastructure::crypto::jwt::JwtConfig;
    use crate::infrastructure::database::migrator::Migrator;
    use crate::infrastructure::storage::FsEvidenceStore;
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;
    use uuid::Uuid;

    struct Ctx {
        evidence: EvidenceService,
        root: std::path::PathBuf,
        employee: Actor,
        activity_id: i32,
    }

    fn admin() -> Actor {
        Actor::new(999, UserRole::Admin)
    }

    /// One crew with a leader, one member employee and one pending
    /// activity, backed by a fresh temp dir.
    async fn setup() -> Ctx {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        let audit = Arc::new(AuditLog::new(db.clone()));
        let root = std::env::temp_dir().join(format!("evidence-test-{}", Uuid::new_v4().simple()));
        let store = Arc::new(FsEvidenceStore::init(&root).await.unwrap());

        let identity = IdentityService::new(db.clone(), audit.clone(), JwtConfig::default());
        let crews = CrewService::new(db.clone(), audit.clone());
        let activities = Arc::new(ActivityService::new(db.clone(), audit.clone(), store.clone()));

        let lead = identity.register("Lead", "lead@x.com", "password123").await.unwrap();
        let lead = identity
            .change_role(&admin(), lead.id, UserRole::CrewLeader)
            .await
            .unwrap();
        let leader_profile = identity
            .role_profile(lead.id)
            .await
            .unwrap()
            .as_crew_leader()
            .cloned()
            .unwrap();
        let crew = crews
            .create_crew(
                &admin(),
                CrewInput {
                    name: "Norte".into(),
                    leader_id: Some(leader_profile.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let emp = identity.register("Emp", "emp@x.com", "password123").await.unwrap();
        crews
            .set_membership(&admin(), crew.id, vec![emp.id])
            .await
            .unwrap();

        let activity = activities
            .create_activity(
                &Actor::new(lead.id, lead.role),
                "Sweep",
                "Centro",
                crew.id,
                None,
            )
            .await
            .unwrap();

        Ctx {
            evidence: EvidenceService::new(db, audit, store, activities),
            root,
            employee: Actor::new(emp.id, emp.role),
            activity_id: activity.id,
        }
    }

    fn file(name: &str) -> IncomingFile {
        IncomingFile {
            filename: name.to_string(),
            bytes: vec![0xFF, 0xD8, 0xFF],
        }
    }

    #[tokio::test]
    async fn upload_stores_allowed_files_and_warns_on_the_rest() {
        let ctx = setup().await;

        let report = ctx
            .evidence
            .upload(
                &ctx.employee,
                ctx.activity_id,
                vec![file("before.jpg"), file("after.png"), file("notes.txt")],
            )
            .await
            .unwrap();

        assert_eq!(report.stored, 2);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("notes.txt"));

        let rows = ctx
            .evidence
            .list_for_activity(&ctx.employee, ctx.activity_id)
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        for row in &rows {
            // stored under a generated name, not the client's
            assert_ne!(row.image_path, "before.jpg");
            assert!(ctx.root.join(&row.image_path).exists());
        }
    }

    #[tokio::test]
    async fn only_employees_upload() {
        let ctx = setup().await;

        let err = ctx
            .evidence
            .upload(&admin(), ctx.activity_id, vec![file("a.jpg")])
            .await;
        assert!(matches!(err, Err(DomainError::Forbidden(_))));
    }

    #[tokio::test]
    async fn delete_removes_row_even_when_file_is_already_gone() {
        let ctx = setup().await;
        ctx.evidence
            .upload(&ctx.employee, ctx.activity_id, vec![file("a.jpg")])
            .await
            .unwrap();
        let rows = ctx
            .evidence
            .list_for_activity(&ctx.employee, ctx.activity_id)
            .await
            .unwrap();
        let row = &rows[0];

        std::fs::remove_file(ctx.root.join(&row.image_path)).unwrap();
        ctx.evidence.delete(&ctx.employee, row.id).await.unwrap();

        let rows = ctx
            .evidence
            .list_for_activity(&ctx.employee, ctx.activity_id)
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn upload_to_missing_activity_is_not_found() {
        let ctx = setup().await;

        let err = ctx
            .evidence
            .upload(&ctx.employee, 424242, vec![file("a.jpg")])
            .await;
        assert!(matches!(err, Err(DomainError::NotFound { .. })));
    }
}
