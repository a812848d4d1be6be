//! Activity API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{ActivityDto, ChangeStateRequest, CreateActivityRequest};
use crate::application::activities::ActivityService;
use crate::interfaces::http::common::{domain_error, ApiResponse, EmptyData, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

/// Activity handler state
#[derive(Clone)]
pub struct ActivityHandlerState {
    pub activities: Arc<ActivityService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/activities",
    tag = "Activities",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Activities within the caller's crew scope", body = ApiResponse<Vec<ActivityDto>>)
    )
)]
pub async fn list_activities(
    State(state): State<ActivityHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<ActivityDto>>>, (StatusCode, Json<ApiResponse<Vec<ActivityDto>>>)>
{
    match state.activities.list_for_caller(&user.actor()).await {
        Ok(listings) => Ok(Json(ApiResponse::success(
            listings.into_iter().map(ActivityDto::from).collect(),
        ))),
        Err(e) => Err(domain_error(e)),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/activities/{id}",
    tag = "Activities",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Activity ID")),
    responses(
        (status = 200, description = "Activity details", body = ApiResponse<ActivityDto>),
        (status = 403, description = "Outside the caller's crew scope"),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_activity(
    State(state): State<ActivityHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ActivityDto>>, (StatusCode, Json<ApiResponse<ActivityDto>>)> {
    match state.activities.get_activity(&user.actor(), id).await {
        Ok(activity) => Ok(Json(ApiResponse::success(ActivityDto::from(activity)))),
        Err(e) => Err(domain_error(e)),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/activities",
    tag = "Activities",
    security(("bearer_auth" = [])),
    request_body = CreateActivityRequest,
    responses(
        (status = 201, description = "Activity created in Pending state", body = ApiResponse<ActivityDto>),
        (status = 403, description = "Caller does not lead the crew"),
        (status = 404, description = "Crew not found")
    )
)]
pub async fn create_activity(
    State(state): State<ActivityHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateActivityRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ActivityDto>>), (StatusCode, Json<ApiResponse<ActivityDto>>)>
{
    match state
        .activities
        .create_activity(
            &user.actor(),
            &request.name,
            &request.neighborhood,
            request.crew_id,
            request.scheduled_at,
        )
        .await
    {
        Ok(activity) => Ok((
            StatusCode::CREATED,
            Json(ApiResponse::success(ActivityDto::from(activity))),
        )),
        Err(e) => Err(domain_error(e)),
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/activities/{id}/state",
    tag = "Activities",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Activity ID")),
    request_body = ChangeStateRequest,
    responses(
        (status = 200, description = "State changed", body = ApiResponse<ActivityDto>),
        (status = 403, description = "Outside the caller's crew scope"),
        (status = 404, description = "Not found")
    )
)]
pub async fn change_state(
    State(state): State<ActivityHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<ChangeStateRequest>,
) -> Result<Json<ApiResponse<ActivityDto>>, (StatusCode, Json<ApiResponse<ActivityDto>>)> {
    match state
        .activities
        .set_state(&user.actor(), id, &request.state)
        .await
    {
        Ok(activity) => Ok(Json(ApiResponse::success(ActivityDto::from(activity)))),
        Err(e) => Err(domain_error(e)),
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/activities/{id}",
    tag = "Activities",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Activity ID")),
    responses(
        (status = 200, description = "Activity and its evidence deleted"),
        (status = 403, description = "Employees may not delete activities"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_activity(
    State(state): State<ActivityHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<EmptyData>>, (StatusCode, Json<ApiResponse<EmptyData>>)> {
    match state.activities.delete_activity(&user.actor(), id).await {
        Ok(()) => Ok(Json(ApiResponse::success(EmptyData {}))),
        Err(e) => Err(domain_error(e)),
    }
}
