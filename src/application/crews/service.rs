//! Crew composition manager
//!
//! Crews reference a leader profile and a neighborhood, and own their
//! member employees by foreign key. Membership updates are replace-all:
//! the whole employee set is swapped in one transaction, which keeps the
//! semantics unambiguous under concurrent edits.

use std::sync::Arc;

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::info;

use crate::application::audit::AuditLog;
use crate::application::identity::service::ensure_employee_profile;
use crate::domain::{Actor, CrewDetail, DomainError, DomainResult, UserRole};
use crate::infrastructure::database::entities::{
    activity, crew, crew_leader, employee, neighborhood, user, Activity, Crew, CrewLeader,
    Employee, Neighborhood, User,
};

/// Input for crew creation and full-record updates. When
/// `new_neighborhood_name` is non-empty it wins over `neighborhood_id`:
/// the name is looked up exactly and created when absent.
#[derive(Debug, Clone, Default)]
pub struct CrewInput {
    pub name: String,
    pub leader_id: Option<i32>,
    pub neighborhood_id: Option<i32>,
    pub new_neighborhood_name: Option<String>,
}

pub struct CrewService {
    db: DatabaseConnection,
    audit: Arc<AuditLog>,
}

impl CrewService {
    pub fn new(db: DatabaseConnection, audit: Arc<AuditLog>) -> Self {
        Self { db, audit }
    }

    // ── Commands ────────────────────────────────────────────────

    pub async fn create_crew(&self, actor: &Actor, input: CrewInput) -> DomainResult<crew::Model> {
        require_admin(actor)?;
        validate_crew_input(&input)?;

        let txn = self.db.begin().await?;

        let neighborhood_id = resolve_neighborhood(
            &txn,
            input.neighborhood_id,
            input.new_neighborhood_name.as_deref(),
        )
        .await?;
        check_leader_exists(&txn, input.leader_id).await?;

        let crew = crew::ActiveModel {
            name: Set(input.name.trim().to_string()),
            leader_id: Set(input.leader_id),
            neighborhood_id: Set(neighborhood_id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        self.audit
            .record(actor.user_id, format!("Created crew {}", crew.name))
            .await;

        info!(crew_id = crew.id, name = %crew.name, "Crew created");
        Ok(crew)
    }

    pub async fn update_crew(
        &self,
        actor: &Actor,
        crew_id: i32,
        input: CrewInput,
    ) -> DomainResult<crew::Model> {
        require_admin(actor)?;
        validate_crew_input(&input)?;

        let crew = self.find_crew(crew_id).await?;

        let txn = self.db.begin().await?;

        let neighborhood_id = resolve_neighborhood(
            &txn,
            input.neighborhood_id,
            input.new_neighborhood_name.as_deref(),
        )
        .await?;
        check_leader_exists(&txn, input.leader_id).await?;

        let mut active: crew::ActiveModel = crew.into();
        active.name = Set(input.name.trim().to_string());
        active.leader_id = Set(input.leader_id);
        active.neighborhood_id = Set(neighborhood_id);
        let crew = active.update(&txn).await?;

        txn.commit().await?;

        self.audit
            .record(actor.user_id, format!("Edited crew {}", crew.name))
            .await;

        Ok(crew)
    }

    /// Delete a crew, detaching member employees first. Refused while
    /// activities still reference the crew — reassign or delete those
    /// before removing the crew itself.
    pub async fn delete_crew(&self, actor: &Actor, crew_id: i32) -> DomainResult<()> {
        require_admin(actor)?;

        let crew = self.find_crew(crew_id).await?;

        let activity_count = Activity::find()
            .filter(activity::Column::CrewId.eq(crew_id))
            .count(&self.db)
            .await?;
        if activity_count > 0 {
            return Err(DomainError::Conflict(format!(
                "Crew {} still has {} activities assigned",
                crew.name, activity_count
            )));
        }

        let txn = self.db.begin().await?;

        Employee::update_many()
            .col_expr(employee::Column::CrewId, Expr::value(Option::<i32>::None))
            .filter(employee::Column::CrewId.eq(crew_id))
            .exec(&txn)
            .await?;

        crew::Entity::delete_by_id(crew_id).exec(&txn).await?;

        txn.commit().await?;

        self.audit
            .record(actor.user_id, format!("Deleted crew {}", crew.name))
            .await;

        info!(crew_id, "Crew deleted");
        Ok(())
    }

    /// Replace the crew's entire employee set in one operation.
    ///
    /// Every profile currently linked to the crew is detached, then every
    /// user in the new set is attached, creating an employee profile for
    /// any referenced user that lacks one.
    pub async fn set_membership(
        &self,
        actor: &Actor,
        crew_id: i32,
        employee_user_ids: Vec<i32>,
    ) -> DomainResult<()> {
        require_admin(actor)?;

        let crew = self.find_crew(crew_id).await?;

        let txn = self.db.begin().await?;

        Employee::update_many()
            .col_expr(employee::Column::CrewId, Expr::value(Option::<i32>::None))
            .filter(employee::Column::CrewId.eq(crew_id))
            .exec(&txn)
            .await?;

        for user_id in employee_user_ids {
            let user = User::find_by_id(user_id)
                .one(&txn)
                .await?
                .ok_or_else(|| DomainError::not_found("User", user_id))?;
            if user.role != UserRole::Employee {
                return Err(DomainError::Validation(format!(
                    "User {} does not hold the employee role",
                    user.name
                )));
            }

            let profile = ensure_employee_profile(&txn, user_id).await?;
            let mut active: employee::ActiveModel = profile.into();
            active.crew_id = Set(Some(crew_id));
            active.update(&txn).await?;
        }

        txn.commit().await?;

        self.audit
            .record(
                actor.user_id,
                format!("Assigned employees to crew {}", crew.name),
            )
            .await;

        Ok(())
    }

    // ── Queries ─────────────────────────────────────────────────

    pub async fn list_crews(&self, actor: &Actor) -> DomainResult<Vec<CrewDetail>> {
        require_admin(actor)?;

        let crews = Crew::find()
            .order_by_asc(crew::Column::Id)
            .all(&self.db)
            .await?;

        let mut details = Vec::with_capacity(crews.len());
        for crew in crews {
            details.push(self.build_detail(crew).await?);
        }
        Ok(details)
    }

    pub async fn get_crew(&self, actor: &Actor, crew_id: i32) -> DomainResult<CrewDetail> {
        require_admin(actor)?;
        let crew = self.find_crew(crew_id).await?;
        self.build_detail(crew).await
    }

    /// Crews led by the calling crew leader.
    pub async fn my_crews(&self, actor: &Actor) -> DomainResult<Vec<crew::Model>> {
        let leader = self.leader_profile_of(actor.user_id).await?;

        Ok(Crew::find()
            .filter(crew::Column::LeaderId.eq(leader.id))
            .order_by_asc(crew::Column::Id)
            .all(&self.db)
            .await?)
    }

    /// The calling employee's crew with leader and colleagues, if any.
    pub async fn my_crew(&self, actor: &Actor) -> DomainResult<Option<CrewDetail>> {
        let profile = Employee::find()
            .filter(employee::Column::UserId.eq(actor.user_id))
            .one(&self.db)
            .await?;

        let Some(crew_id) = profile.and_then(|p| p.crew_id) else {
            return Ok(None);
        };

        let crew = self.find_crew(crew_id).await?;
        Ok(Some(self.build_detail(crew).await?))
    }

    // ── Helpers ─────────────────────────────────────────────────

    async fn find_crew(&self, crew_id: i32) -> DomainResult<crew::Model> {
        Crew::find_by_id(crew_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Crew", crew_id))
    }

    async fn leader_profile_of(&self, user_id: i32) -> DomainResult<crew_leader::Model> {
        CrewLeader::find()
            .filter(crew_leader::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                DomainError::Forbidden("Caller does not hold a crew leader profile".into())
            })
    }

    async fn build_detail(&self, crew: crew::Model) -> DomainResult<CrewDetail> {
        let leader = match crew.leader_id {
            Some(leader_id) => match CrewLeader::find_by_id(leader_id).one(&self.db).await? {
                Some(profile) => User::find_by_id(profile.user_id).one(&self.db).await?,
                None => None,
            },
            None => None,
        };

        let neighborhood = match crew.neighborhood_id {
            Some(id) => Neighborhood::find_by_id(id).one(&self.db).await?,
            None => None,
        };

        let member_ids: Vec<i32> = Employee::find()
            .filter(employee::Column::CrewId.eq(crew.id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|e| e.user_id)
            .collect();

        let members = if member_ids.is_empty() {
            Vec::new()
        } else {
            User::find()
                .filter(user::Column::Id.is_in(member_ids))
                .order_by_asc(user::Column::Name)
                .all(&self.db)
                .await?
        };

        Ok(CrewDetail {
            crew,
            leader,
            neighborhood,
            members,
        })
    }
}

fn require_admin(actor: &Actor) -> DomainResult<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(DomainError::Forbidden(
            "Only administrators may manage crews".into(),
        ))
    }
}

fn validate_crew_input(input: &CrewInput) -> DomainResult<()> {
    if input.name.trim().is_empty() {
        return Err(DomainError::Validation("Crew name is required".into()));
    }
    Ok(())
}

async fn check_leader_exists<C: ConnectionTrait>(
    conn: &C,
    leader_id: Option<i32>,
) -> DomainResult<()> {
    if let Some(leader_id) = leader_id {
        CrewLeader::find_by_id(leader_id)
            .one(conn)
            .await?
            .ok_or_else(|| DomainError::not_found("CrewLeader", leader_id))?;
    }
    Ok(())
}

/// Resolve the neighborhood reference for a crew. A non-empty new name is
/// looked up by exact name and created when missing; otherwise the given
/// id is validated and used as-is (nullable).
async fn resolve_neighborhood<C: ConnectionTrait>(
    conn: &C,
    neighborhood_id: Option<i32>,
    new_name: Option<&str>,
) -> DomainResult<Option<i32>> {
    if let Some(name) = new_name.map(str::trim).filter(|n| !n.is_empty()) {
        let existing = Neighborhood::find()
            .filter(neighborhood::Column::Name.eq(name))
            .one(conn)
            .await?;

        return match existing {
            Some(n) => Ok(Some(n.id)),
            None => {
                let created = neighborhood::ActiveModel {
                    name: Set(name.to_string()),
                    ..Default::default()
                }
                .insert(conn)
                .await?;
                Ok(Some(created.id))
            }
        };
    }

    if let Some(id) = neighborhood_id {
        Neighborhood::find_by_id(id)
            .one(conn)
            .await?
            .ok_or_else(|| DomainError::not_found("Neighborhood", id))?;
    }
    Ok(neighborhood_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::identity::IdentityService;
    use crate::infrastructure::crypto::jwt::JwtConfig;
    use crate::infrastructure::database::migrator::Migrator;
    use chrono::Utc;
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    struct Ctx {
        db: DatabaseConnection,
        identity: IdentityService,
        crews: CrewService,
    }

    async fn setup() -> Ctx {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        let audit = Arc::new(AuditLog::new(db.clone()));
        Ctx {
            identity: IdentityService::new(db.clone(), audit.clone(), JwtConfig::default()),
            crews: CrewService::new(db.clone(), audit),
            db,
        }
    }

    fn admin() -> Actor {
        Actor::new(999, UserRole::Admin)
    }

    async fn new_employee(ctx: &Ctx, name: &str, email: &str) -> user::Model {
        ctx.identity
            .register(name, email, "password123")
            .await
            .unwrap()
    }

    async fn crew_member_ids(ctx: &Ctx, crew_id: i32) -> Vec<i32> {
        Employee::find()
            .filter(employee::Column::CrewId.eq(crew_id))
            .all(&ctx.db)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.user_id)
            .collect()
    }

    #[tokio::test]
    async fn set_membership_replaces_whole_set() {
        let ctx = setup().await;
        let a = new_employee(&ctx, "A", "a@x.com").await;
        let b = new_employee(&ctx, "B", "b@x.com").await;
        let c = new_employee(&ctx, "C", "c@x.com").await;

        let crew = ctx
            .crews
            .create_crew(
                &admin(),
                CrewInput {
                    name: "Norte".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        ctx.crews
            .set_membership(&admin(), crew.id, vec![a.id, b.id])
            .await
            .unwrap();
        let mut members = crew_member_ids(&ctx, crew.id).await;
        members.sort();
        assert_eq!(members, vec![a.id, b.id]);

        ctx.crews
            .set_membership(&admin(), crew.id, vec![b.id, c.id])
            .await
            .unwrap();
        let mut members = crew_member_ids(&ctx, crew.id).await;
        members.sort();
        assert_eq!(members, vec![b.id, c.id]);

        // A is detached, not deleted
        let a_profile = Employee::find()
            .filter(employee::Column::UserId.eq(a.id))
            .one(&ctx.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(a_profile.crew_id, None);
    }

    #[tokio::test]
    async fn promote_create_crew_then_demote_clears_leader() {
        let ctx = setup().await;
        let ana = new_employee(&ctx, "Ana", "ana@x.com").await;
        ctx.identity
            .change_role(&admin(), ana.id, UserRole::CrewLeader)
            .await
            .unwrap();

        let leader = ctx
            .identity
            .role_profile(ana.id)
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
                    name: "Norte".into(),
                    leader_id: Some(leader.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        // leader resolves back to ana
        let detail = ctx.crews.get_crew(&admin(), crew.id).await.unwrap();
        assert_eq!(detail.leader.unwrap().id, ana.id);

        ctx.identity
            .change_role(&admin(), ana.id, UserRole::Employee)
            .await
            .unwrap();

        let crew = Crew::find_by_id(crew.id)
            .one(&ctx.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(crew.leader_id, None);
    }

    #[tokio::test]
    async fn new_neighborhood_name_is_created_once() {
        let ctx = setup().await;

        let first = ctx
            .crews
            .create_crew(
                &admin(),
                CrewInput {
                    name: "Norte".into(),
                    new_neighborhood_name: Some("Centro".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let second = ctx
            .crews
            .create_crew(
                &admin(),
                CrewInput {
                    name: "Sur".into(),
                    new_neighborhood_name: Some("Centro".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(first.neighborhood_id, second.neighborhood_id);
        assert_eq!(
            Neighborhood::find().count(&ctx.db).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn delete_crew_detaches_members_and_refuses_with_activities() {
        let ctx = setup().await;
        let a = new_employee(&ctx, "A", "a@x.com").await;

        let crew = ctx
            .crews
            .create_crew(
                &admin(),
                CrewInput {
                    name: "Norte".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        ctx.crews
            .set_membership(&admin(), crew.id, vec![a.id])
            .await
            .unwrap();

        let act = activity::ActiveModel {
            name: Set("Sweep".into()),
            neighborhood: Set("Centro".into()),
            crew_id: Set(crew.id),
            scheduled_at: Set(Utc::now()),
            state: Set("Pending".into()),
            ..Default::default()
        }
        .insert(&ctx.db)
        .await
        .unwrap();

        let err = ctx.crews.delete_crew(&admin(), crew.id).await;
        assert!(matches!(err, Err(DomainError::Conflict(_))));

        Activity::delete_by_id(act.id).exec(&ctx.db).await.unwrap();
        ctx.crews.delete_crew(&admin(), crew.id).await.unwrap();

        let a_profile = Employee::find()
            .filter(employee::Column::UserId.eq(a.id))
            .one(&ctx.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(a_profile.crew_id, None);
    }
}
