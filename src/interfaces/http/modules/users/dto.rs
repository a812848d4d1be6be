//! User management DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::RoleProfile;
use crate::infrastructure::database::entities::user;

/// Full user representation for administrators
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserDto {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role.as_str().to_string(),
            created_at: u.created_at,
        }
    }
}

/// Create user request (admin). Unlike self-registration the role is
/// chosen explicitly.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    /// One of: employee, crew_leader, admin, super_admin
    pub role: String,
}

/// Update user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub role: Option<String>,
}

/// Role change request
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeRoleRequest {
    /// One of: employee, crew_leader, admin, super_admin
    pub role: String,
}

/// A user's role together with whichever profile row backs it.
/// Administrative roles carry no profile.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoleProfileDto {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee: Option<EmployeeProfileDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crew_leader: Option<LeaderProfileDto>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EmployeeProfileDto {
    pub id: i32,
    pub user_id: i32,
    pub crew_id: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LeaderProfileDto {
    pub id: i32,
    pub user_id: i32,
}

impl From<RoleProfile> for RoleProfileDto {
    fn from(profile: RoleProfile) -> Self {
        match profile {
            RoleProfile::Employee(e) => Self {
                role: "employee".to_string(),
                employee: Some(EmployeeProfileDto {
                    id: e.id,
                    user_id: e.user_id,
                    crew_id: e.crew_id,
                }),
                crew_leader: None,
            },
            RoleProfile::CrewLeader(l) => Self {
                role: "crew_leader".to_string(),
                employee: None,
                crew_leader: Some(LeaderProfileDto {
                    id: l.id,
                    user_id: l.user_id,
                }),
            },
            RoleProfile::Admin => Self {
                role: "admin".to_string(),
                employee: None,
                crew_leader: None,
            },
            RoleProfile::SuperAdmin => Self {
                role: "super_admin".to_string(),
                employee: None,
                crew_leader: None,
            },
        }
    }
}
