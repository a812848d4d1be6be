//! Audit log API handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension, Json};

use super::dto::AuditEntryDto;
use crate::application::audit::AuditLog;
use crate::interfaces::http::common::{domain_error, ApiResponse};
use crate::interfaces::http::middleware::AuthenticatedUser;

/// Audit handler state
#[derive(Clone)]
pub struct AuditHandlerState {
    pub audit: Arc<AuditLog>,
}

#[utoipa::path(
    get,
    path = "/api/v1/audit",
    tag = "Audit",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Audit log, newest first", body = ApiResponse<Vec<AuditEntryDto>>),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn list_audit(
    State(state): State<AuditHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<AuditEntryDto>>>, (StatusCode, Json<ApiResponse<Vec<AuditEntryDto>>>)>
{
    match state.audit.list(&user.actor()).await {
        Ok(entries) => Ok(Json(ApiResponse::success(
            entries.into_iter().map(AuditEntryDto::from).collect(),
        ))),
        Err(e) => Err(domain_error(e)),
    }
}
