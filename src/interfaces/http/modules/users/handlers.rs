//! User management API handlers
//!
//! Admin-only CRUD plus the role workflow. Delegates to
//! `IdentityService`, which owns profile synchronization.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{
    ChangeRoleRequest, CreateUserRequest, RoleProfileDto, UpdateUserRequest, UserDto,
};
use crate::application::identity::IdentityService;
use crate::domain::{DomainError, UserRole};
use crate::interfaces::http::common::{domain_error, ApiResponse, EmptyData, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

/// User handler state
#[derive(Clone)]
pub struct UserHandlerState {
    pub identity: Arc<IdentityService>,
}

fn parse_role<T>(s: &str) -> Result<UserRole, (StatusCode, Json<ApiResponse<T>>)> {
    UserRole::parse(s)
        .ok_or_else(|| domain_error(DomainError::Validation(format!("Unknown role: {s}"))))
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User list", body = ApiResponse<Vec<UserDto>>),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn list_users(
    State(state): State<UserHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, (StatusCode, Json<ApiResponse<Vec<UserDto>>>)> {
    match state.identity.list_users(&user.actor()).await {
        Ok(users) => Ok(Json(ApiResponse::success(
            users.into_iter().map(UserDto::from).collect(),
        ))),
        Err(e) => Err(domain_error(e)),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/users/employees",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Users holding the employee role", body = ApiResponse<Vec<UserDto>>),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn list_employees(
    State(state): State<UserHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, (StatusCode, Json<ApiResponse<Vec<UserDto>>>)> {
    match state.identity.list_employees(&user.actor()).await {
        Ok(users) => Ok(Json(ApiResponse::success(
            users.into_iter().map(UserDto::from).collect(),
        ))),
        Err(e) => Err(domain_error(e)),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = ApiResponse<UserDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_user(
    State(state): State<UserHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<UserDto>>, (StatusCode, Json<ApiResponse<UserDto>>)> {
    match state.identity.get_user(&user.actor(), id).await {
        Ok(found) => Ok(Json(ApiResponse::success(UserDto::from(found)))),
        Err(e) => Err(domain_error(e)),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/profile",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Role with its backing profile", body = ApiResponse<RoleProfileDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_role_profile(
    State(state): State<UserHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<RoleProfileDto>>, (StatusCode, Json<ApiResponse<RoleProfileDto>>)> {
    if !user.is_admin() && user.user_id != id {
        return Err(domain_error(DomainError::Forbidden(
            "Only administrators may inspect other users".into(),
        )));
    }
    match state.identity.role_profile(id).await {
        Ok(profile) => Ok(Json(ApiResponse::success(RoleProfileDto::from(profile)))),
        Err(e) => Err(domain_error(e)),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserDto>),
        (status = 409, description = "Email already registered"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_user(
    State(state): State<UserHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserDto>>), (StatusCode, Json<ApiResponse<UserDto>>)> {
    let role = parse_role(&request.role)?;

    match state
        .identity
        .create_user(
            &user.actor(),
            &request.name,
            &request.email,
            &request.password,
            role,
        )
        .await
    {
        Ok(created) => Ok((
            StatusCode::CREATED,
            Json(ApiResponse::success(UserDto::from(created))),
        )),
        Err(e) => Err(domain_error(e)),
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_user(
    State(state): State<UserHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, (StatusCode, Json<ApiResponse<UserDto>>)> {
    let role = match &request.role {
        Some(r) => Some(parse_role(r)?),
        None => None,
    };

    match state
        .identity
        .update_user(&user.actor(), id, request.name, request.email, role)
        .await
    {
        Ok(updated) => Ok(Json(ApiResponse::success(UserDto::from(updated)))),
        Err(e) => Err(domain_error(e)),
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/users/{id}/role",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = ChangeRoleRequest,
    responses(
        (status = 200, description = "Role changed, profiles synchronized", body = ApiResponse<UserDto>),
        (status = 400, description = "Promotion rule violated"),
        (status = 404, description = "Not found")
    )
)]
pub async fn change_role(
    State(state): State<UserHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
    Json(request): Json<ChangeRoleRequest>,
) -> Result<Json<ApiResponse<UserDto>>, (StatusCode, Json<ApiResponse<UserDto>>)> {
    let role = parse_role(&request.role)?;

    match state.identity.change_role(&user.actor(), id, role).await {
        Ok(updated) => Ok(Json(ApiResponse::success(UserDto::from(updated)))),
        Err(e) => Err(domain_error(e)),
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_user(
    State(state): State<UserHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<EmptyData>>, (StatusCode, Json<ApiResponse<EmptyData>>)> {
    match state.identity.delete_user(&user.actor(), id).await {
        Ok(()) => Ok(Json(ApiResponse::success(EmptyData {}))),
        Err(e) => Err(domain_error(e)),
    }
}
