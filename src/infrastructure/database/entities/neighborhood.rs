//! Neighborhood ("colonia") reference data
//!
//! Populated by an external batch import; the live workflow only reads it,
//! except for the create-on-the-fly path in crew management.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "neighborhoods")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub postal_code: Option<String>,
    pub settlement_kind: Option<String>,
    pub municipality: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::crew::Entity")]
    Crews,
}

impl Related<super::crew::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Crews.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
