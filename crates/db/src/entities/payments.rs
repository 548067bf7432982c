//! `SeaORM` Entity for the payments read model.
//!
//! Owned by the external payments subsystem; read-only here.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub amount: Decimal,
    pub method: String,
    pub reference: Option<String>,
    pub received_on: Date,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::reconciliation_matches::Entity")]
    ReconciliationMatches,
}

impl Related<super::reconciliation_matches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReconciliationMatches.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
