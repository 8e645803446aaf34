//! Accounts (wallets) holding money.
//!
//! `balance_minor` is denormalized: transaction writes adjust it inside the
//! same database transaction, and `Engine::recompute_balances` can rebuild it
//! from `opening_balance_minor` plus the signed ledger.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

/// An account with its current denormalized balance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub opening_balance_minor: i64,
    pub balance_minor: i64,
    pub group_id: Uuid,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub opening_balance_minor: i64,
    pub balance_minor: i64,
    pub group_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::account_groups::Entity",
        from = "Column::GroupId",
        to = "super::account_groups::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Group,
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::account_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&model.id)
            .map_err(|_| EngineError::KeyNotFound(model.id.clone()))?;
        let group_id = Uuid::parse_str(&model.group_id)
            .map_err(|_| EngineError::KeyNotFound(model.group_id.clone()))?;
        Ok(Account {
            id,
            name: model.name,
            opening_balance_minor: model.opening_balance_minor,
            balance_minor: model.balance_minor,
            group_id,
        })
    }
}
