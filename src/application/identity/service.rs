//! Identity service — users, authentication and role-profile synchronization
//!
//! A user's role and the existence of their EmployeeProfile/CrewLeaderProfile
//! rows must never diverge: exactly one of the two profiles exists for
//! employee/crew_leader roles, neither for admin roles. Every mutation here
//! runs role update and profile reconciliation inside one transaction, so a
//! failure rolls the role change back along with the profile edits.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::info;

use crate::application::audit::AuditLog;
use crate::domain::{Actor, DomainError, DomainResult, RoleProfile, UserRole};
use crate::infrastructure::crypto::jwt::{create_token, JwtConfig};
use crate::infrastructure::crypto::password::{hash_password, verify_password};
use crate::infrastructure::database::entities::{
    crew, crew_leader, employee, user, CrewLeader, Employee, User,
};

/// Authentication result returned after a successful login
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: user::Model,
}

pub struct IdentityService {
    db: DatabaseConnection,
    audit: Arc<AuditLog>,
    jwt_config: JwtConfig,
}

impl IdentityService {
    pub fn new(db: DatabaseConnection, audit: Arc<AuditLog>, jwt_config: JwtConfig) -> Self {
        Self {
            db,
            audit,
            jwt_config,
        }
    }

    // ── Authentication ──────────────────────────────────────────

    /// Authenticate by email + password and return a JWT.
    pub async fn login(&self, email: &str, password: &str) -> DomainResult<AuthResult> {
        let user = User::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;

        let Some(user) = user else {
            return Err(DomainError::Unauthorized("Invalid credentials".into()));
        };

        let valid = verify_password(password, &user.password_hash).unwrap_or(false);
        if !valid {
            return Err(DomainError::Unauthorized("Invalid credentials".into()));
        }

        let token = create_token(user.id, &user.name, user.role.as_str(), &self.jwt_config)
            .map_err(|e| DomainError::Validation(format!("Failed to create token: {}", e)))?;

        Ok(AuthResult {
            token,
            token_type: "Bearer".into(),
            expires_in: self.jwt_config.expiration_hours * 3600,
            user,
        })
    }

    // ── Registration ────────────────────────────────────────────

    /// Public self-registration. Role is always `employee`, and the
    /// employee profile is created in the same transaction.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> DomainResult<user::Model> {
        validate_user_fields(name, email, password)?;
        self.ensure_email_free(email, None).await?;

        let password_hash = hash_password(password)
            .map_err(|e| DomainError::Validation(format!("Failed to hash password: {}", e)))?;

        let txn = self.db.begin().await?;

        let new_user = user::ActiveModel {
            name: Set(name.trim().to_string()),
            email: Set(email.trim().to_string()),
            password_hash: Set(password_hash),
            role: Set(UserRole::Employee),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let user = new_user.insert(&txn).await?;

        ensure_employee_profile(&txn, user.id).await?;

        txn.commit().await?;

        info!(user_id = user.id, email = %user.email, "New user registered");
        Ok(user)
    }

    /// Admin-side user creation with an explicit role. The matching
    /// profile row is created for employee / crew_leader roles.
    pub async fn create_user(
        &self,
        actor: &Actor,
        name: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> DomainResult<user::Model> {
        require_admin(actor)?;
        validate_user_fields(name, email, password)?;
        self.ensure_email_free(email, None).await?;

        let password_hash = hash_password(password)
            .map_err(|e| DomainError::Validation(format!("Failed to hash password: {}", e)))?;

        let txn = self.db.begin().await?;

        let new_user = user::ActiveModel {
            name: Set(name.trim().to_string()),
            email: Set(email.trim().to_string()),
            password_hash: Set(password_hash),
            role: Set(role),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let user = new_user.insert(&txn).await?;

        reconcile_profiles(&txn, user.id, role).await?;

        txn.commit().await?;

        self.audit
            .record(actor.user_id, format!("Created user {}", user.name))
            .await;

        Ok(user)
    }

    // ── Queries ─────────────────────────────────────────────────

    pub async fn list_users(&self, actor: &Actor) -> DomainResult<Vec<user::Model>> {
        require_admin(actor)?;
        Ok(User::find()
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn get_user(&self, actor: &Actor, user_id: i32) -> DomainResult<user::Model> {
        require_admin(actor)?;
        self.find_user(user_id).await
    }

    /// The caller's own account row, no admin rights needed.
    pub async fn current_user(&self, actor: &Actor) -> DomainResult<user::Model> {
        self.find_user(actor.user_id).await
    }

    /// Users currently holding the `employee` role, for membership pickers.
    pub async fn list_employees(&self, actor: &Actor) -> DomainResult<Vec<user::Model>> {
        require_admin(actor)?;
        Ok(User::find()
            .filter(user::Column::Role.eq(UserRole::Employee))
            .order_by_asc(user::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Resolve a user's role together with its profile row as one variant.
    pub async fn role_profile(&self, user_id: i32) -> DomainResult<RoleProfile> {
        let user = self.find_user(user_id).await?;

        match user.role {
            UserRole::Employee => {
                let profile = Employee::find()
                    .filter(employee::Column::UserId.eq(user_id))
                    .one(&self.db)
                    .await?
                    .ok_or_else(|| {
                        DomainError::Validation(format!(
                            "User {} has role employee but no employee profile",
                            user_id
                        ))
                    })?;
                Ok(RoleProfile::Employee(profile))
            }
            UserRole::CrewLeader => {
                let profile = CrewLeader::find()
                    .filter(crew_leader::Column::UserId.eq(user_id))
                    .one(&self.db)
                    .await?
                    .ok_or_else(|| {
                        DomainError::Validation(format!(
                            "User {} has role crew_leader but no leader profile",
                            user_id
                        ))
                    })?;
                Ok(RoleProfile::CrewLeader(profile))
            }
            UserRole::Admin => Ok(RoleProfile::Admin),
            UserRole::SuperAdmin => Ok(RoleProfile::SuperAdmin),
        }
    }

    // ── Commands (mutations) ────────────────────────────────────

    /// Change a user's role and reconcile the profile tables.
    ///
    /// Promotion to crew_leader is only allowed from the employee role;
    /// any other starting role is rejected and nothing changes.
    pub async fn change_role(
        &self,
        actor: &Actor,
        user_id: i32,
        new_role: UserRole,
    ) -> DomainResult<user::Model> {
        require_admin(actor)?;

        let user = self.find_user(user_id).await?;
        check_promotion_rule(user.role, new_role)?;

        let txn = self.db.begin().await?;

        let mut active: user::ActiveModel = user.into();
        active.role = Set(new_role);
        let user = active.update(&txn).await?;

        reconcile_profiles(&txn, user.id, new_role).await?;

        txn.commit().await?;

        self.audit
            .record(
                actor.user_id,
                format!("Changed role of user {} to {}", user.name, new_role.as_str()),
            )
            .await;

        info!(user_id = user.id, role = new_role.as_str(), "Role changed");
        Ok(user)
    }

    /// Admin edit of name / email / role. The role part follows the same
    /// rules as `change_role` and shares its transaction with the field
    /// updates.
    pub async fn update_user(
        &self,
        actor: &Actor,
        user_id: i32,
        name: Option<String>,
        email: Option<String>,
        role: Option<UserRole>,
    ) -> DomainResult<user::Model> {
        require_admin(actor)?;

        let user = self.find_user(user_id).await?;

        if let Some(ref email) = email {
            if !email.contains('@') {
                return Err(DomainError::Validation("Invalid email address".into()));
            }
            self.ensure_email_free(email, Some(user_id)).await?;
        }
        if let Some(new_role) = role {
            check_promotion_rule(user.role, new_role)?;
        }

        let txn = self.db.begin().await?;

        let mut active: user::ActiveModel = user.into();
        if let Some(name) = name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(email) = email {
            active.email = Set(email.trim().to_string());
        }
        if let Some(new_role) = role {
            active.role = Set(new_role);
        }
        let user = active.update(&txn).await?;

        if let Some(new_role) = role {
            reconcile_profiles(&txn, user.id, new_role).await?;
        }

        txn.commit().await?;

        self.audit
            .record(actor.user_id, format!("Edited user {}", user.name))
            .await;

        Ok(user)
    }

    /// Delete a user. Led crews are detached and profile rows removed
    /// before the user row goes away, all in one transaction.
    pub async fn delete_user(&self, actor: &Actor, user_id: i32) -> DomainResult<()> {
        require_admin(actor)?;

        let user = self.find_user(user_id).await?;

        let txn = self.db.begin().await?;

        delete_employee_profile(&txn, user_id).await?;
        detach_and_delete_leader(&txn, user_id).await?;
        user::Entity::delete_by_id(user_id).exec(&txn).await?;

        txn.commit().await?;

        self.audit
            .record(actor.user_id, format!("Deleted user {}", user.name))
            .await;

        info!(user_id, "User deleted");
        Ok(())
    }

    // ── Helpers ─────────────────────────────────────────────────

    async fn find_user(&self, user_id: i32) -> DomainResult<user::Model> {
        User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("User", user_id))
    }

    async fn ensure_email_free(&self, email: &str, except: Option<i32>) -> DomainResult<()> {
        let existing = User::find()
            .filter(user::Column::Email.eq(email.trim()))
            .one(&self.db)
            .await?;

        match existing {
            Some(u) if Some(u.id) != except => {
                Err(DomainError::Conflict("Email already exists".into()))
            }
            _ => Ok(()),
        }
    }
}

fn require_admin(actor: &Actor) -> DomainResult<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(DomainError::Forbidden(
            "Only administrators may manage users".into(),
        ))
    }
}

fn validate_user_fields(name: &str, email: &str, password: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::Validation("Name is required".into()));
    }
    if !email.contains('@') {
        return Err(DomainError::Validation("Invalid email address".into()));
    }
    if password.len() < 8 {
        return Err(DomainError::Validation(
            "Password must be at least 8 characters".into(),
        ));
    }
    Ok(())
}

/// Promotion path: crew_leader may only be reached from employee.
fn check_promotion_rule(current: UserRole, target: UserRole) -> DomainResult<()> {
    if target == UserRole::CrewLeader && current != UserRole::Employee {
        return Err(DomainError::Validation(
            "Only users with the employee role can become crew leaders".into(),
        ));
    }
    Ok(())
}

// ── Profile reconciliation ──────────────────────────────────────
//
// These run inside the caller's transaction. After reconciliation the
// profile tables match the target role exactly.

pub(crate) async fn reconcile_profiles<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    target: UserRole,
) -> DomainResult<()> {
    match target {
        UserRole::Employee => {
            ensure_employee_profile(conn, user_id).await?;
            detach_and_delete_leader(conn, user_id).await?;
        }
        UserRole::CrewLeader => {
            ensure_leader_profile(conn, user_id).await?;
            delete_employee_profile(conn, user_id).await?;
        }
        UserRole::Admin | UserRole::SuperAdmin => {
            delete_employee_profile(conn, user_id).await?;
            detach_and_delete_leader(conn, user_id).await?;
        }
    }
    Ok(())
}

pub(crate) async fn ensure_employee_profile<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> DomainResult<employee::Model> {
    let existing = Employee::find()
        .filter(employee::Column::UserId.eq(user_id))
        .one(conn)
        .await?;

    match existing {
        Some(profile) => Ok(profile),
        None => {
            let profile = employee::ActiveModel {
                user_id: Set(user_id),
                crew_id: Set(None),
                ..Default::default()
            };
            Ok(profile.insert(conn).await?)
        }
    }
}

async fn ensure_leader_profile<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> DomainResult<crew_leader::Model> {
    let existing = CrewLeader::find()
        .filter(crew_leader::Column::UserId.eq(user_id))
        .one(conn)
        .await?;

    match existing {
        Some(profile) => Ok(profile),
        None => {
            let profile = crew_leader::ActiveModel {
                user_id: Set(user_id),
                ..Default::default()
            };
            Ok(profile.insert(conn).await?)
        }
    }
}

async fn delete_employee_profile<C: ConnectionTrait>(conn: &C, user_id: i32) -> DomainResult<()> {
    Employee::delete_many()
        .filter(employee::Column::UserId.eq(user_id))
        .exec(conn)
        .await?;
    Ok(())
}

/// Remove a crew-leader profile, first clearing `leader_id` on every crew
/// it led. Crews are detached, never deleted.
async fn detach_and_delete_leader<C: ConnectionTrait>(conn: &C, user_id: i32) -> DomainResult<()> {
    let leader = CrewLeader::find()
        .filter(crew_leader::Column::UserId.eq(user_id))
        .one(conn)
        .await?;

    let Some(leader) = leader else {
        return Ok(());
    };

    crew::Entity::update_many()
        .col_expr(crew::Column::LeaderId, Expr::value(Option::<i32>::None))
        .filter(crew::Column::LeaderId.eq(leader.id))
        .exec(conn)
        .await?;

    crew_leader::Entity::delete_by_id(leader.id).exec(conn).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::entities::Crew;
    use crate::infrastructure::database::migrator::Migrator;
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    async fn setup() -> (DatabaseConnection, IdentityService) {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        let audit = Arc::new(AuditLog::new(db.clone()));
        let service = IdentityService::new(db.clone(), audit, JwtConfig::default());
        (db, service)
    }

    fn admin() -> Actor {
        Actor::new(999, UserRole::Admin)
    }

    async fn profiles(db: &DatabaseConnection, user_id: i32) -> (bool, bool) {
        let emp = Employee::find()
            .filter(employee::Column::UserId.eq(user_id))
            .one(db)
            .await
            .unwrap()
            .is_some();
        let leader = CrewLeader::find()
            .filter(crew_leader::Column::UserId.eq(user_id))
            .one(db)
            .await
            .unwrap()
            .is_some();
        (emp, leader)
    }

    #[tokio::test]
    async fn register_creates_employee_profile() {
        let (db, service) = setup().await;

        let user = service
            .register("Ana", "ana@x.com", "password123")
            .await
            .unwrap();

        assert_eq!(user.role, UserRole::Employee);
        assert_eq!(profiles(&db, user.id).await, (true, false));
    }

    #[tokio::test]
    async fn login_issues_token_and_rejects_bad_password() {
        let (_db, service) = setup().await;
        service
            .register("Ana", "ana@x.com", "password123")
            .await
            .unwrap();

        let auth = service.login("ana@x.com", "password123").await.unwrap();
        assert_eq!(auth.user.email, "ana@x.com");

        let err = service.login("ana@x.com", "wrong-password").await;
        assert!(matches!(err, Err(DomainError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn promote_employee_to_crew_leader_swaps_profiles() {
        let (db, service) = setup().await;
        let user = service
            .register("Ana", "ana@x.com", "password123")
            .await
            .unwrap();

        let user = service
            .change_role(&admin(), user.id, UserRole::CrewLeader)
            .await
            .unwrap();

        assert_eq!(user.role, UserRole::CrewLeader);
        assert_eq!(profiles(&db, user.id).await, (false, true));
    }

    #[tokio::test]
    async fn promotion_from_admin_is_rejected_and_state_unchanged() {
        let (db, service) = setup().await;
        let user = service
            .create_user(&admin(), "Luis", "luis@x.com", "password123", UserRole::Admin)
            .await
            .unwrap();

        let err = service
            .change_role(&admin(), user.id, UserRole::CrewLeader)
            .await;
        assert!(matches!(err, Err(DomainError::Validation(_))));

        let unchanged = service.get_user(&admin(), user.id).await.unwrap();
        assert_eq!(unchanged.role, UserRole::Admin);
        assert_eq!(profiles(&db, user.id).await, (false, false));
    }

    #[tokio::test]
    async fn demotion_to_employee_detaches_led_crews() {
        let (db, service) = setup().await;
        let user = service
            .register("Ana", "ana@x.com", "password123")
            .await
            .unwrap();
        let user = service
            .change_role(&admin(), user.id, UserRole::CrewLeader)
            .await
            .unwrap();

        let leader = service
            .role_profile(user.id)
            .await
            .unwrap()
            .as_crew_leader()
            .cloned()
            .unwrap();

        let crew = crew::ActiveModel {
            name: Set("Norte".into()),
            leader_id: Set(Some(leader.id)),
            neighborhood_id: Set(None),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        service
            .change_role(&admin(), user.id, UserRole::Employee)
            .await
            .unwrap();

        let crew = Crew::find_by_id(crew.id).one(&db).await.unwrap().unwrap();
        assert_eq!(crew.leader_id, None);
        assert_eq!(profiles(&db, user.id).await, (true, false));
    }

    #[tokio::test]
    async fn deleting_leader_user_detaches_crews_without_deleting_them() {
        let (db, service) = setup().await;
        let user = service
            .register("Ana", "ana@x.com", "password123")
            .await
            .unwrap();
        let user = service
            .change_role(&admin(), user.id, UserRole::CrewLeader)
            .await
            .unwrap();

        let leader = service
            .role_profile(user.id)
            .await
            .unwrap()
            .as_crew_leader()
            .cloned()
            .unwrap();

        let crew = crew::ActiveModel {
            name: Set("Norte".into()),
            leader_id: Set(Some(leader.id)),
            neighborhood_id: Set(None),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        service.delete_user(&admin(), user.id).await.unwrap();

        assert!(User::find_by_id(user.id).one(&db).await.unwrap().is_none());
        let crew = Crew::find_by_id(crew.id).one(&db).await.unwrap().unwrap();
        assert_eq!(crew.leader_id, None);
    }

    #[tokio::test]
    async fn non_admin_cannot_change_roles() {
        let (_db, service) = setup().await;
        let user = service
            .register("Ana", "ana@x.com", "password123")
            .await
            .unwrap();

        let employee_actor = Actor::new(user.id, UserRole::Employee);
        let err = service
            .change_role(&employee_actor, user.id, UserRole::Admin)
            .await;
        assert!(matches!(err, Err(DomainError::Forbidden(_))));
    }

    #[tokio::test]
    async fn promote_to_admin_removes_both_profiles() {
        let (db, service) = setup().await;
        let user = service
            .register("Ana", "ana@x.com", "password123")
            .await
            .unwrap();

        service
            .change_role(&admin(), user.id, UserRole::Admin)
            .await
            .unwrap();

        assert_eq!(profiles(&db, user.id).await, (false, false));
    }
}
