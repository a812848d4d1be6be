//! Evidence API handlers
//!
//! Uploads arrive as multipart form data; every file field is treated as
//! a candidate photo.

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{EvidenceDto, UploadReportDto};
use crate::application::evidence::{EvidenceService, IncomingFile};
use crate::interfaces::http::common::{domain_error, ApiResponse, EmptyData};
use crate::interfaces::http::middleware::AuthenticatedUser;

/// Evidence handler state
#[derive(Clone)]
pub struct EvidenceHandlerState {
    pub evidence: Arc<EvidenceService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/activities/{id}/evidence",
    tag = "Evidence",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Activity ID")),
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Upload processed", body = ApiResponse<UploadReportDto>),
        (status = 403, description = "Only employees upload evidence"),
        (status = 404, description = "Activity not found")
    )
)]
pub async fn upload_evidence(
    State(state): State<EvidenceHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<UploadReportDto>>, (StatusCode, Json<ApiResponse<UploadReportDto>>)> {
    let mut files = Vec::new();
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                let Some(filename) = field.file_name().map(String::from) else {
                    continue;
                };
                match field.bytes().await {
                    Ok(bytes) => files.push(IncomingFile {
                        filename,
                        bytes: bytes.to_vec(),
                    }),
                    Err(e) => {
                        return Err((
                            StatusCode::BAD_REQUEST,
                            Json(ApiResponse::error(format!("Malformed upload: {e}"))),
                        ))
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(ApiResponse::error(format!("Malformed upload: {e}"))),
                ))
            }
        }
    }

    match state
        .evidence
        .upload(&user.actor(), activity_id, files)
        .await
    {
        Ok(report) => Ok(Json(ApiResponse::success(UploadReportDto::from(report)))),
        Err(e) => Err(domain_error(e)),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/activities/{id}/evidence",
    tag = "Evidence",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Activity ID")),
    responses(
        (status = 200, description = "Evidence for the activity, newest first", body = ApiResponse<Vec<EvidenceDto>>),
        (status = 403, description = "Outside the caller's crew scope"),
        (status = 404, description = "Activity not found")
    )
)]
pub async fn list_evidence(
    State(state): State<EvidenceHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<EvidenceDto>>>, (StatusCode, Json<ApiResponse<Vec<EvidenceDto>>>)>
{
    match state
        .evidence
        .list_for_activity(&user.actor(), activity_id)
        .await
    {
        Ok(rows) => Ok(Json(ApiResponse::success(
            rows.into_iter().map(EvidenceDto::from).collect(),
        ))),
        Err(e) => Err(domain_error(e)),
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/evidence/{id}",
    tag = "Evidence",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Evidence ID")),
    responses(
        (status = 200, description = "Evidence deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_evidence(
    State(state): State<EvidenceHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<EmptyData>>, (StatusCode, Json<ApiResponse<EmptyData>>)> {
    match state.evidence.delete(&user.actor(), id).await {
        Ok(()) => Ok(Json(ApiResponse::success(EmptyData {}))),
        Err(e) => Err(domain_error(e)),
    }
}
