//! Activity DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::ActivityListing;
use crate::infrastructure::database::entities::activity;

/// Activity as the API reports it
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ActivityDto {
    pub id: i32,
    pub name: String,
    pub neighborhood: String,
    pub crew_id: i32,
    /// Resolved crew name, present in listings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crew_name: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub state: String,
}

impl From<activity::Model> for ActivityDto {
    fn from(a: activity::Model) -> Self {
        Self {
            id: a.id,
            name: a.name,
            neighborhood: a.neighborhood,
            crew_id: a.crew_id,
            crew_name: None,
            scheduled_at: a.scheduled_at,
            state: a.state,
        }
    }
}

impl From<ActivityListing> for ActivityDto {
    fn from(l: ActivityListing) -> Self {
        let mut dto = ActivityDto::from(l.activity);
        dto.crew_name = Some(l.crew_name);
        dto
    }
}

/// Create activity request. State is not accepted here; every new
/// activity starts as `Pending`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateActivityRequest {
    #[validate(length(min = 1, max = 200, message = "Activity name must be 1-200 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 200, message = "Neighborhood must be 1-200 characters"))]
    pub neighborhood: String,
    pub crew_id: i32,
    /// Defaults to the current time when omitted
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// State transition request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangeStateRequest {
    #[validate(length(min = 1, max = 50, message = "State must be 1-50 characters"))]
    pub state: String,
}
