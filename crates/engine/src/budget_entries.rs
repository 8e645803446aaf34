//! Per-month budget allotments.
//!
//! One row per calendar month per budget, unique on
//! (`budget_id`, `year`, `month`). A seeded year always has exactly 12 rows.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetEntry {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub year: i32,
    pub month: u32,
    pub amount_minor: i64,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budget_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub budget_id: String,
    pub year: i32,
    pub month: i32,
    pub amount_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::budgets::Entity",
        from = "Column::BudgetId",
        to = "super::budgets::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Budget,
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budget.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for BudgetEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&model.id)
            .map_err(|_| EngineError::KeyNotFound(model.id.clone()))?;
        let budget_id = Uuid::parse_str(&model.budget_id)
            .map_err(|_| EngineError::KeyNotFound(model.budget_id.clone()))?;
        Ok(BudgetEntry {
            id,
            budget_id,
            year: model.year,
            month: model.month as u32,
            amount_minor: model.amount_minor,
        })
    }
}
