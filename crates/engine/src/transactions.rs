//! Transaction (cash flow) primitives.
//!
//! A transaction records a single income or expense: a positive amount whose
//! sign is carried by its kind, one category, one account, and the UTC
//! instant it occurred at.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Sign applied to amounts of this kind when folding balances.
    pub const fn sign(self) -> i64 {
        match self {
            Self::Income => 1,
            Self::Expense => -1,
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::InvalidName(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub kind: TransactionKind,
    pub occurred_at: DateTime<Utc>,
    /// Magnitude in minor units, always > 0; the sign is `kind.sign()`.
    pub amount_minor: i64,
    pub note: Option<String>,
    pub category_id: Uuid,
    pub account_id: Uuid,
}

impl Transaction {
    pub fn new(
        kind: TransactionKind,
        occurred_at: DateTime<Utc>,
        amount_minor: i64,
        note: Option<String>,
        category_id: Uuid,
        account_id: Uuid,
    ) -> ResultEngine<Self> {
        if amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "amount_minor must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            kind,
            occurred_at,
            amount_minor,
            note,
            category_id,
            account_id,
        })
    }

    /// The amount with its sign applied (income positive, expense negative).
    #[must_use]
    pub const fn signed_amount(&self) -> i64 {
        self.kind.sign() * self.amount_minor
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub kind: String,
    pub occurred_at: DateTimeUtc,
    pub amount_minor: i64,
    pub note: Option<String>,
    pub category_id: String,
    pub account_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Account,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            occurred_at: ActiveValue::Set(tx.occurred_at),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            note: ActiveValue::Set(tx.note.clone()),
            category_id: ActiveValue::Set(tx.category_id.to_string()),
            account_id: ActiveValue::Set(tx.account_id.to_string()),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&model.id)
            .map_err(|_| EngineError::KeyNotFound(model.id.clone()))?;
        let category_id = Uuid::parse_str(&model.category_id)
            .map_err(|_| EngineError::KeyNotFound(model.category_id.clone()))?;
        let account_id = Uuid::parse_str(&model.account_id)
            .map_err(|_| EngineError::KeyNotFound(model.account_id.clone()))?;
        Ok(Transaction {
            id,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            occurred_at: model.occurred_at,
            amount_minor: model.amount_minor,
            note: model.note,
            category_id,
            account_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_amounts() {
        let category = Uuid::new_v4();
        let account = Uuid::new_v4();
        assert!(
            Transaction::new(
                TransactionKind::Expense,
                Utc::now(),
                0,
                None,
                category,
                account
            )
            .is_err()
        );
        assert!(
            Transaction::new(
                TransactionKind::Income,
                Utc::now(),
                -5,
                None,
                category,
                account
            )
            .is_err()
        );
    }

    #[test]
    fn signed_amount_follows_kind() {
        let category = Uuid::new_v4();
        let account = Uuid::new_v4();
        let income = Transaction::new(
            TransactionKind::Income,
            Utc::now(),
            1000,
            None,
            category,
            account,
        )
        .unwrap();
        assert_eq!(income.signed_amount(), 1000);

        let expense = Transaction::new(
            TransactionKind::Expense,
            Utc::now(),
            1000,
            None,
            category,
            account,
        )
        .unwrap();
        assert_eq!(expense.signed_amount(), -1000);
    }
}
