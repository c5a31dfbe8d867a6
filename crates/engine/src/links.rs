//! Funder to dependent links.
//!
//! A funder may only move money to a dependent it is linked to.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "funder_dependent_links")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub funder_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub dependent_id: String,
    /// Name the funder uses for this dependent (display/search only).
    pub custom_name: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::DependentId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Dependent,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dependent.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
