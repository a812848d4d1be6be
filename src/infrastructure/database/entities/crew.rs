//! Crew ("cuadrilla") entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "crews")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    /// Nullable: a crew may be leaderless.
    pub leader_id: Option<i32>,
    pub neighborhood_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::crew_leader::Entity",
        from = "Column::LeaderId",
        to = "super::crew_leader::Column::Id"
    )]
    Leader,
    #[sea_orm(
        belongs_to = "super::neighborhood::Entity",
        from = "Column::NeighborhoodId",
        to = "super::neighborhood::Column::Id"
    )]
    Neighborhood,
    #[sea_orm(has_many = "super::employee::Entity")]
    Employees,
    #[sea_orm(has_many = "super::activity::Entity")]
    Activities,
}

impl Related<super::crew_leader::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Leader.def()
    }
}

impl Related<super::neighborhood::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Neighborhood.def()
    }
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employees.def()
    }
}

impl Related<super::activity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Activities.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
