//! `SeaORM` Entity for the bank_transactions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{BankTransactionStatus, BankTransactionType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "bank_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub bank_account_id: Uuid,
    pub amount: Decimal,
    pub transaction_type: BankTransactionType,
    pub transaction_date: Date,
    pub status: BankTransactionStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
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
