//! Crew management API handlers
//!
//! Admin CRUD plus the two self-scoped views: a leader's crews and an
//! employee's own crew.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{CrewDetailDto, CrewDto, CrewRequest, SetMembersRequest};
use crate::application::crews::CrewService;
use crate::interfaces::http::common::{domain_error, ApiResponse, EmptyData, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

/// Crew handler state
#[derive(Clone)]
pub struct CrewHandlerState {
    pub crews: Arc<CrewService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/crews",
    tag = "Crews",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All crews with details", body = ApiResponse<Vec<CrewDetailDto>>),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn list_crews(
    State(state): State<CrewHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<CrewDetailDto>>>, (StatusCode, Json<ApiResponse<Vec<CrewDetailDto>>>)>
{
    match state.crews.list_crews(&user.actor()).await {
        Ok(details) => Ok(Json(ApiResponse::success(
            details.into_iter().map(CrewDetailDto::from).collect(),
        ))),
        Err(e) => Err(domain_error(e)),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/crews/mine",
    tag = "Crews",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Crews led by the caller", body = ApiResponse<Vec<CrewDto>>),
        (status = 404, description = "Caller has no leader profile")
    )
)]
pub async fn my_crews(
    State(state): State<CrewHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<CrewDto>>>, (StatusCode, Json<ApiResponse<Vec<CrewDto>>>)> {
    match state.crews.my_crews(&user.actor()).await {
        Ok(crews) => Ok(Json(ApiResponse::success(
            crews.into_iter().map(CrewDto::from).collect(),
        ))),
        Err(e) => Err(domain_error(e)),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/crews/my-crew",
    tag = "Crews",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The caller's crew, or null when unassigned", body = ApiResponse<Option<CrewDetailDto>>),
        (status = 404, description = "Caller has no employee profile")
    )
)]
pub async fn my_crew(
    State(state): State<CrewHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<
    Json<ApiResponse<Option<CrewDetailDto>>>,
    (StatusCode, Json<ApiResponse<Option<CrewDetailDto>>>),
> {
    match state.crews.my_crew(&user.actor()).await {
        Ok(detail) => Ok(Json(ApiResponse::success(detail.map(CrewDetailDto::from)))),
        Err(e) => Err(domain_error(e)),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/crews/{id}",
    tag = "Crews",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Crew ID")),
    responses(
        (status = 200, description = "Crew details", body = ApiResponse<CrewDetailDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_crew(
    State(state): State<CrewHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<CrewDetailDto>>, (StatusCode, Json<ApiResponse<CrewDetailDto>>)> {
    match state.crews.get_crew(&user.actor(), id).await {
        Ok(detail) => Ok(Json(ApiResponse::success(CrewDetailDto::from(detail)))),
        Err(e) => Err(domain_error(e)),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/crews",
    tag = "Crews",
    security(("bearer_auth" = [])),
    request_body = CrewRequest,
    responses(
        (status = 201, description = "Crew created", body = ApiResponse<CrewDto>),
        (status = 404, description = "Referenced leader or neighborhood missing"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_crew(
    State(state): State<CrewHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CrewRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CrewDto>>), (StatusCode, Json<ApiResponse<CrewDto>>)> {
    match state.crews.create_crew(&user.actor(), request.into()).await {
        Ok(crew) => Ok((
            StatusCode::CREATED,
            Json(ApiResponse::success(CrewDto::from(crew))),
        )),
        Err(e) => Err(domain_error(e)),
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/crews/{id}",
    tag = "Crews",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Crew ID")),
    request_body = CrewRequest,
    responses(
        (status = 200, description = "Crew updated", body = ApiResponse<CrewDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_crew(
    State(state): State<CrewHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<CrewRequest>,
) -> Result<Json<ApiResponse<CrewDto>>, (StatusCode, Json<ApiResponse<CrewDto>>)> {
    match state
        .crews
        .update_crew(&user.actor(), id, request.into())
        .await
    {
        Ok(crew) => Ok(Json(ApiResponse::success(CrewDto::from(crew)))),
        Err(e) => Err(domain_error(e)),
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/crews/{id}/members",
    tag = "Crews",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Crew ID")),
    request_body = SetMembersRequest,
    responses(
        (status = 200, description = "Membership replaced", body = ApiResponse<CrewDetailDto>),
        (status = 400, description = "A listed user is not an employee"),
        (status = 404, description = "Crew or user not found")
    )
)]
pub async fn set_members(
    State(state): State<CrewHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
    Json(request): Json<SetMembersRequest>,
) -> Result<Json<ApiResponse<CrewDetailDto>>, (StatusCode, Json<ApiResponse<CrewDetailDto>>)> {
    if let Err(e) = state
        .crews
        .set_membership(&user.actor(), id, request.user_ids)
        .await
    {
        return Err(domain_error(e));
    }
    match state.crews.get_crew(&user.actor(), id).await {
        Ok(detail) => Ok(Json(ApiResponse::success(CrewDetailDto::from(detail)))),
        Err(e) => Err(domain_error(e)),
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/crews/{id}",
    tag = "Crews",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Crew ID")),
    responses(
        (status = 200, description = "Crew deleted, members detached"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Activities still reference the crew")
    )
)]
pub async fn delete_crew(
    State(state): State<CrewHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<EmptyData>>, (StatusCode, Json<ApiResponse<EmptyData>>)> {
    match state.crews.delete_crew(&user.actor(), id).await {
        Ok(()) => Ok(Json(ApiResponse::success(EmptyData {}))),
        Err(e) => Err(domain_error(e)),
    }
}
