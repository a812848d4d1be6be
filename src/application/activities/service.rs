//! Activity workflow — creation, state transitions, role-scoped visibility
//!
//! States are open strings (`Pending` → `InProgress` → `Completed` by
//! convention, plus whatever labels a crew needs); transitions are not
//! gated beyond visibility. Creation is the one strict rule: only the
//! leader assigned to a crew may create activities for it, and every new
//! activity starts as `Pending`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::{info, warn};

use crate::application::audit::AuditLog;
use crate::domain::{Actor, ActivityListing, DomainError, DomainResult, UserRole};
use crate::infrastructure::database::entities::{
    activity, crew, crew_leader, employee, evidence, Activity, Crew, CrewLeader, Employee,
    Evidence,
};
use crate::infrastructure::storage::EvidenceStore;

pub struct ActivityService {
    db: DatabaseConnection,
    audit: Arc<AuditLog>,
    store: Arc<dyn EvidenceStore>,
}

impl ActivityService {
    pub fn new(db: DatabaseConnection, audit: Arc<AuditLog>, store: Arc<dyn EvidenceStore>) -> Self {
        Self { db, audit, store }
    }

    // ── Commands ────────────────────────────────────────────────

    /// Create an activity for a crew. Only the crew's assigned leader may
    /// do this; the initial state is always `Pending`.
    pub async fn create_activity(
        &self,
        actor: &Actor,
        name: &str,
        neighborhood_label: &str,
        crew_id: i32,
        scheduled_at: Option<DateTime<Utc>>,
    ) -> DomainResult<activity::Model> {
        if name.trim().is_empty() || neighborhood_label.trim().is_empty() {
            return Err(DomainError::Validation(
                "Activity name and neighborhood are required".into(),
            ));
        }

        let crew = Crew::find_by_id(crew_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Crew", crew_id))?;

        let leader = CrewLeader::find()
            .filter(crew_leader::Column::UserId.eq(actor.user_id))
            .one(&self.db)
            .await?;
        let leads_crew = matches!((actor.role, leader), (UserRole::CrewLeader, Some(l)) if crew.leader_id == Some(l.id));
        if !leads_crew {
            return Err(DomainError::Forbidden(
                "Only the crew's assigned leader may create activities".into(),
            ));
        }

        let activity = activity::ActiveModel {
            name: Set(name.trim().to_string()),
            neighborhood: Set(neighborhood_label.trim().to_string()),
            crew_id: Set(crew_id),
            scheduled_at: Set(scheduled_at.unwrap_or_else(Utc::now)),
            state: Set(activity::STATE_PENDING.to_string()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        self.audit
            .record(
                actor.user_id,
                format!("Assigned activity {} to crew {}", activity.name, crew.name),
            )
            .await;

        info!(activity_id = activity.id, crew_id, "Activity created");
        Ok(activity)
    }

    /// Set an activity's state. Any caller with crew visibility may do
    /// this; the state itself is a free string.
    pub async fn set_state(
        &self,
        actor: &Actor,
        activity_id: i32,
        new_state: &str,
    ) -> DomainResult<activity::Model> {
        if new_state.trim().is_empty() {
            return Err(DomainError::Validation("State must not be empty".into()));
        }

        let activity = self.get_activity(actor, activity_id).await?;
        let old_state = activity.state.clone();

        let mut active: activity::ActiveModel = activity.into();
        active.state = Set(new_state.trim().to_string());
        let activity = active.update(&self.db).await?;

        self.audit
            .record(
                actor.user_id,
                format!(
                    "Changed state of activity {} from {} to {}",
                    activity.name, old_state, activity.state
                ),
            )
            .await;

        Ok(activity)
    }

    /// Delete an activity together with its evidence rows and files.
    /// Allowed for the crew's leader and for administrators.
    pub async fn delete_activity(&self, actor: &Actor, activity_id: i32) -> DomainResult<()> {
        let activity = self.get_activity(actor, activity_id).await?;
        if actor.role == UserRole::Employee {
            return Err(DomainError::Forbidden(
                "Employees may not delete activities".into(),
            ));
        }

        let evidence_rows = Evidence::find()
            .filter(evidence::Column::ActivityId.eq(activity_id))
            .all(&self.db)
            .await?;

        // Files first; a failed removal is logged and does not block the
        // row deletion (the file can be swept up later).
        for row in &evidence_rows {
            if let Err(e) = self.store.remove(&row.image_path).await {
                warn!(path = %row.image_path, error = %e, "Failed to remove evidence file");
            }
        }

        let txn = self.db.begin().await?;
        Evidence::delete_many()
            .filter(evidence::Column::ActivityId.eq(activity_id))
            .exec(&txn)
            .await?;
        activity::Entity::delete_by_id(activity_id).exec(&txn).await?;
        txn.commit().await?;

        self.audit
            .record(actor.user_id, format!("Deleted activity {}", activity.name))
            .await;

        Ok(())
    }

    // ── Queries ─────────────────────────────────────────────────

    /// Activities visible to the caller: admins see all, leaders the crews
    /// they lead, employees their own crew. Grouped by crew, newest first
    /// within each crew.
    pub async fn list_for_caller(&self, actor: &Actor) -> DomainResult<Vec<ActivityListing>> {
        let crew_ids: Option<Vec<i32>> = match actor.role {
            UserRole::Admin | UserRole::SuperAdmin => None,
            UserRole::CrewLeader => {
                let leader = CrewLeader::find()
                    .filter(crew_leader::Column::UserId.eq(actor.user_id))
                    .one(&self.db)
                    .await?;
                let Some(leader) = leader else {
                    return Ok(Vec::new());
                };
                Some(
                    Crew::find()
                        .filter(crew::Column::LeaderId.eq(leader.id))
                        .all(&self.db)
                        .await?
                        .into_iter()
                        .map(|c| c.id)
                        .collect(),
                )
            }
            UserRole::Employee => {
                let profile = Employee::find()
                    .filter(employee::Column::UserId.eq(actor.user_id))
                    .one(&self.db)
                    .await?;
                match profile.and_then(|p| p.crew_id) {
                    Some(crew_id) => Some(vec![crew_id]),
                    None => return Ok(Vec::new()),
                }
            }
        };

        let mut query = Activity::find();
        if let Some(ids) = &crew_ids {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            query = query.filter(activity::Column::CrewId.is_in(ids.clone()));
        }

        let activities = query
            .order_by_asc(activity::Column::CrewId)
            .order_by_desc(activity::Column::ScheduledAt)
            .all(&self.db)
            .await?;

        let crews = Crew::find().all(&self.db).await?;
        let name_of = |crew_id: i32| {
            crews
                .iter()
                .find(|c| c.id == crew_id)
                .map(|c| c.name.clone())
                .unwrap_or_default()
        };

        Ok(activities
            .into_iter()
            .map(|activity| ActivityListing {
                crew_name: name_of(activity.crew_id),
                activity,
            })
            .collect())
    }

    /// Fetch a single activity, enforcing the caller's crew visibility.
    pub async fn get_activity(
        &self,
        actor: &Actor,
        activity_id: i32,
    ) -> DomainResult<activity::Model> {
        let activity = Activity::find_by_id(activity_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Activity", activity_id))?;

        if !self.can_access(actor, &activity).await? {
            return Err(DomainError::Forbidden(
                "Activity belongs to a crew outside your scope".into(),
            ));
        }
        Ok(activity)
    }

    async fn can_access(&self, actor: &Actor, activity: &activity::Model) -> DomainResult<bool> {
        match actor.role {
            UserRole::Admin | UserRole::SuperAdmin => Ok(true),
            UserRole::CrewLeader => {
                let leader = CrewLeader::find()
                    .filter(crew_leader::Column::UserId.eq(actor.user_id))
                    .one(&self.db)
                    .await?;
                let Some(leader) = leader else {
                    return Ok(false);
                };
                let crew = Crew::find_by_id(activity.crew_id).one(&self.db).await?;
                Ok(crew.map(|c| c.leader_id == Some(leader.id)).unwrap_or(false))
            }
            UserRole::Employee => {
                let profile = Employee::find()
                    .filter(employee::Column::UserId.eq(actor.user_id))
                    .one(&self.db)
                    .await?;
                Ok(profile
                    .and_then(|p| p.crew_id)
                    .map(|crew_id| crew_id == activity.crew_id)
                    .unwrap_or(false))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::crews::service::CrewInput;
    use crate::application::crews::CrewService;
    use crate::application::identity::IdentityService;
    use crate::infrastructure::crypto::jwt::JwtConfig;
    use crate::infrastructure::database::entities::user;
    use crate::infrastructure::database::migrator::Migrator;
    use crate::infrastructure::storage::FsEvidenceStore;
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;
    use uuid::Uuid;

    struct Ctx {
        identity: IdentityService,
        crews: CrewService,
        activities: ActivityService,
    }

    async fn setup() -> Ctx {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        let audit = Arc::new(AuditLog::new(db.clone()));
        let root = std::env::temp_dir().join(format!("activity-test-{}", Uuid::new_v4().simple()));
        let store = Arc::new(FsEvidenceStore::init(root).await.unwrap());
        Ctx {
            identity: IdentityService::new(db.clone(), audit.clone(), JwtConfig::default()),
            crews: CrewService::new(db.clone(), audit.clone()),
            activities: ActivityService::new(db, audit, store),
        }
    }

    fn admin() -> Actor {
        Actor::new(999, UserRole::Admin)
    }

    fn actor_of(user: &user::Model) -> Actor {
        Actor::new(user.id, user.role)
    }

    /// Register a leader, create a crew they lead, and return both.
    async fn leader_with_crew(ctx: &Ctx, email: &str, crew_name: &str) -> (user::Model, crew::Model) {
        let user = ctx
            .identity
            .register("Leader", email, "password123")
            .await
            .unwrap();
        let user = ctx
            .identity
            .change_role(&admin(), user.id, UserRole::CrewLeader)
            .await
            .unwrap();
        let leader = ctx
            .identity
            .role_profile(user.id)
            .await
            .unwrap()
            .as_crew_leader()
            .cloned()
            .unwrap();
        let crew = ctx
            .crews
            .create_crew(
                &admin(),
                CrewInput {
                    name: crew_name.into(),
                    leader_id: Some(leader.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        (user, crew)
    }

    #[tokio::test]
    async fn only_assigned_leader_creates_activities() {
        let ctx = setup().await;
        let (leader, crew) = leader_with_crew(&ctx, "lead@x.com", "Norte").await;
        let (other_leader, _) = leader_with_crew(&ctx, "other@x.com", "Sur").await;

        let activity = ctx
            .activities
            .create_activity(&actor_of(&leader), "Sweep", "Centro", crew.id, None)
            .await
            .unwrap();
        assert_eq!(activity.state, "Pending");

        let err = ctx
            .activities
            .create_activity(&actor_of(&other_leader), "Sweep", "Centro", crew.id, None)
            .await;
        assert!(matches!(err, Err(DomainError::Forbidden(_))));
    }

    #[tokio::test]
    async fn employees_cannot_create_activities() {
        let ctx = setup().await;
        let (_, crew) = leader_with_crew(&ctx, "lead@x.com", "Norte").await;
        let emp = ctx
            .identity
            .register("Emp", "emp@x.com", "password123")
            .await
            .unwrap();

        let err = ctx
            .activities
            .create_activity(&actor_of(&emp), "Sweep", "Centro", crew.id, None)
            .await;
        assert!(matches!(err, Err(DomainError::Forbidden(_))));
    }

    #[tokio::test]
    async fn visibility_is_scoped_by_role() {
        let ctx = setup().await;
        let (leader_a, crew_a) = leader_with_crew(&ctx, "a@x.com", "Norte").await;
        let (leader_b, crew_b) = leader_with_crew(&ctx, "b@x.com", "Sur").await;

        ctx.activities
            .create_activity(&actor_of(&leader_a), "Sweep A", "Centro", crew_a.id, None)
            .await
            .unwrap();
        ctx.activities
            .create_activity(&actor_of(&leader_b), "Sweep B", "Centro", crew_b.id, None)
            .await
            .unwrap();

        // employee assigned to crew A sees only crew A's activities
        let emp = ctx
            .identity
            .register("Emp", "emp@x.com", "password123")
            .await
            .unwrap();
        ctx.crews
            .set_membership(&admin(), crew_a.id, vec![emp.id])
            .await
            .unwrap();

        let seen = ctx
            .activities
            .list_for_caller(&actor_of(&emp))
            .await
            .unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].activity.name, "Sweep A");

        let seen = ctx
            .activities
            .list_for_caller(&actor_of(&leader_b))
            .await
            .unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].activity.name, "Sweep B");

        let seen = ctx.activities.list_for_caller(&admin()).await.unwrap();
        assert_eq!(seen.len(), 2);
    }

    #[tokio::test]
    async fn set_state_requires_visibility_and_existing_activity() {
        let ctx = setup().await;
        let (leader, crew) = leader_with_crew(&ctx, "lead@x.com", "Norte").await;
        let activity = ctx
            .activities
            .create_activity(&actor_of(&leader), "Sweep", "Centro", crew.id, None)
            .await
            .unwrap();

        let err = ctx
            .activities
            .set_state(&actor_of(&leader), 424242, "InProgress")
            .await;
        assert!(matches!(err, Err(DomainError::NotFound { .. })));

        // member employee may move the state
        let emp = ctx
            .identity
            .register("Emp", "emp@x.com", "password123")
            .await
            .unwrap();
        ctx.crews
            .set_membership(&admin(), crew.id, vec![emp.id])
            .await
            .unwrap();
        let updated = ctx
            .activities
            .set_state(&actor_of(&emp), activity.id, "Completed")
            .await
            .unwrap();
        assert_eq!(updated.state, "Completed");

        // unassigned employee may not
        let outsider = ctx
            .identity
            .register("Out", "out@x.com", "password123")
            .await
            .unwrap();
        let err = ctx
            .activities
            .set_state(&actor_of(&outsider), activity.id, "Pending")
            .await;
        assert!(matches!(err, Err(DomainError::Forbidden(_))));
    }
}
