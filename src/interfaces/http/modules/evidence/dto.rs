//! Evidence DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::UploadReport;
use crate::infrastructure::database::entities::evidence;

/// Stored evidence photo
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EvidenceDto {
    pub id: i32,
    pub activity_id: i32,
    /// File name under the evidence root; fetch via `/evidence/{image_path}`
    pub image_path: String,
    pub uploaded_at: DateTime<Utc>,
}

impl From<evidence::Model> for EvidenceDto {
    fn from(e: evidence::Model) -> Self {
        Self {
            id: e.id,
            activity_id: e.activity_id,
            image_path: e.image_path,
            uploaded_at: e.uploaded_at,
        }
    }
}

/// Upload outcome: stored count plus one warning per skipped file
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadReportDto {
    pub stored: usize,
    pub warnings: Vec<String>,
}

impl From<UploadReport> for UploadReportDto {
    fn from(r: UploadReport) -> Self {
        Self {
            stored: r.stored,
            warnings: r.warnings,
        }
    }
}
