//! Crew DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::crews::service::CrewInput;
use crate::domain::CrewDetail;
use crate::infrastructure::database::entities::{crew, neighborhood, user};

/// Bare crew row
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CrewDto {
    pub id: i32,
    pub name: String,
    pub leader_id: Option<i32>,
    pub neighborhood_id: Option<i32>,
}

impl From<crew::Model> for CrewDto {
    fn from(c: crew::Model) -> Self {
        Self {
            id: c.id,
            name: c.name,
            leader_id: c.leader_id,
            neighborhood_id: c.neighborhood_id,
        }
    }
}

/// A user as it appears inside a crew detail
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CrewMemberDto {
    pub id: i32,
    pub name: String,
    pub email: String,
}

impl From<user::Model> for CrewMemberDto {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NeighborhoodDto {
    pub id: i32,
    pub name: String,
    pub postal_code: Option<String>,
    pub settlement_kind: Option<String>,
    pub municipality: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
}

impl From<neighborhood::Model> for NeighborhoodDto {
    fn from(n: neighborhood::Model) -> Self {
        Self {
            id: n.id,
            name: n.name,
            postal_code: n.postal_code,
            settlement_kind: n.settlement_kind,
            municipality: n.municipality,
            state: n.state,
            city: n.city,
        }
    }
}

/// Crew with its resolved leader, neighborhood and members
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CrewDetailDto {
    pub id: i32,
    pub name: String,
    pub leader: Option<CrewMemberDto>,
    pub neighborhood: Option<NeighborhoodDto>,
    pub members: Vec<CrewMemberDto>,
}

impl From<CrewDetail> for CrewDetailDto {
    fn from(d: CrewDetail) -> Self {
        Self {
            id: d.crew.id,
            name: d.crew.name,
            leader: d.leader.map(CrewMemberDto::from),
            neighborhood: d.neighborhood.map(NeighborhoodDto::from),
            members: d.members.into_iter().map(CrewMemberDto::from).collect(),
        }
    }
}

/// Create / update crew request. `new_neighborhood_name`, when set,
/// wins over `neighborhood_id` and is looked up or created by name.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CrewRequest {
    #[validate(length(min = 1, max = 120, message = "Crew name must be 1-120 characters"))]
    pub name: String,
    pub leader_id: Option<i32>,
    pub neighborhood_id: Option<i32>,
    pub new_neighborhood_name: Option<String>,
}

impl From<CrewRequest> for CrewInput {
    fn from(r: CrewRequest) -> Self {
        Self {
            name: r.name,
            leader_id: r.leader_id,
            neighborhood_id: r.neighborhood_id,
            new_neighborhood_name: r.new_neighborhood_name,
        }
    }
}

/// Replace-all membership request: the listed users become the crew's
/// entire roster.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetMembersRequest {
    pub user_ids: Vec<i32>,
}
