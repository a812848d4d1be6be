//! Activity entity — a scheduled cleanup task assigned to a crew

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Initial state for every freshly created activity.
pub const STATE_PENDING: &str = "Pending";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activities")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    /// Free-text neighborhood label, not an FK. Crews describe the spot
    /// where the work happens in their own words.
    pub neighborhood: String,
    pub crew_id: i32,
    pub scheduled_at: DateTime<Utc>,
    /// Open string state. Crews use `Pending` / `InProgress` / `Completed`
    /// plus whatever intermediate labels they need.
    pub state: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::crew::Entity",
        from = "Column::CrewId",
        to = "super::crew::Column::Id"
    )]
    Crew,
    #[sea_orm(has_many = "super::evidence::Entity")]
    Evidence,
}

impl Related<super::crew::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Crew.def()
    }
}

impl Related<super::evidence::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Evidence.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
