use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, MonthPeriod, ResultEngine, Transaction, TransactionKind, accounts, categories,
    transactions, util::normalize_optional_text,
};

use super::{Engine, with_tx};

/// Input for creating or replacing a transaction.
#[derive(Clone, Debug)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    /// Magnitude in minor units, must be > 0.
    pub amount_minor: i64,
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub category_id: Uuid,
    pub account_id: Uuid,
}

/// A transaction joined with the display data its list row needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionView {
    pub id: Uuid,
    pub kind: TransactionKind,
    pub amount_minor: i64,
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub category_id: Uuid,
    pub category_name: String,
    pub category_emoji: String,
    pub category_color: String,
    pub account_id: Uuid,
    pub account_name: String,
}

impl TransactionView {
    /// The amount with its sign applied (income positive, expense negative).
    #[must_use]
    pub const fn signed_amount(&self) -> i64 {
        self.kind.sign() * self.amount_minor
    }
}

impl Engine {
    /// Records a transaction and adjusts the account balance atomically.
    pub async fn add_transaction(&self, input: NewTransaction) -> ResultEngine<Uuid> {
        let tx = Transaction::new(
            input.kind,
            input.occurred_at,
            input.amount_minor,
            normalize_optional_text(input.note.as_deref()),
            input.category_id,
            input.account_id,
        )?;

        with_tx!(self, |db_tx| {
            self.require_category(&db_tx, tx.category_id).await?;
            self.require_account(&db_tx, tx.account_id).await?;

            let active: transactions::ActiveModel = (&tx).into();
            active.insert(&db_tx).await?;

            self.adjust_account_balance(&db_tx, &tx.account_id.to_string(), tx.signed_amount())
                .await?;

            Ok(tx.id)
        })
    }

    /// Transactions within a month, newest first, with display data joined in.
    pub async fn transactions(&self, period: MonthPeriod) -> ResultEngine<Vec<TransactionView>> {
        let (start, end) = period.utc_range(self.timezone())?;

        let models = transactions::Entity::find()
            .filter(transactions::Column::OccurredAt.gte(start))
            .filter(transactions::Column::OccurredAt.lt(end))
            .order_by_desc(transactions::Column::OccurredAt)
            .all(&self.database)
            .await?;

        let category_models = categories::Entity::find().all(&self.database).await?;
        let account_models = accounts::Entity::find().all(&self.database).await?;

        let category_by_id: HashMap<String, categories::Model> = category_models
            .into_iter()
            .map(|model| (model.id.clone(), model))
            .collect();
        let account_by_id: HashMap<String, accounts::Model> = account_models
            .into_iter()
            .map(|model| (model.id.clone(), model))
            .collect();

        let mut views = Vec::with_capacity(models.len());
        for model in models {
            let category = category_by_id
                .get(&model.category_id)
                .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;
            let account = account_by_id
                .get(&model.account_id)
                .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))?;
            let tx = Transaction::try_from(model)?;
            views.push(TransactionView {
                id: tx.id,
                kind: tx.kind,
                amount_minor: tx.amount_minor,
                note: tx.note,
                occurred_at: tx.occurred_at,
                category_id: tx.category_id,
                category_name: category.name.clone(),
                category_emoji: category.emoji.clone(),
                category_color: category.color.clone(),
                account_id: tx.account_id,
                account_name: account.name.clone(),
            });
        }

        Ok(views)
    }

    /// Replaces a transaction, rebalancing the old and new accounts.
    pub async fn update_transaction(
        &self,
        transaction_id: Uuid,
        input: NewTransaction,
    ) -> ResultEngine<()> {
        let replacement = Transaction::new(
            input.kind,
            input.occurred_at,
            input.amount_minor,
            normalize_optional_text(input.note.as_deref()),
            input.category_id,
            input.account_id,
        )?;

        with_tx!(self, |db_tx| {
            let old_model = self.require_transaction(&db_tx, transaction_id).await?;
            let old = Transaction::try_from(old_model)?;

            self.require_category(&db_tx, replacement.category_id).await?;
            self.require_account(&db_tx, replacement.account_id).await?;

            let active = transactions::ActiveModel {
                id: ActiveValue::Set(transaction_id.to_string()),
                kind: ActiveValue::Set(replacement.kind.as_str().to_string()),
                occurred_at: ActiveValue::Set(replacement.occurred_at),
                amount_minor: ActiveValue::Set(replacement.amount_minor),
                note: ActiveValue::Set(replacement.note.clone()),
                category_id: ActiveValue::Set(replacement.category_id.to_string()),
                account_id: ActiveValue::Set(replacement.account_id.to_string()),
            };
            active.update(&db_tx).await?;

            // Undo the old posting, then apply the new one.
            self.adjust_account_balance(&db_tx, &old.account_id.to_string(), -old.signed_amount())
                .await?;
            self.adjust_account_balance(
                &db_tx,
                &replacement.account_id.to_string(),
                replacement.signed_amount(),
            )
            .await?;

            Ok(())
        })
    }

    /// Deletes a transaction and restores the account balance.
    pub async fn delete_transaction(&self, transaction_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_transaction(&db_tx, transaction_id).await?;
            let tx = Transaction::try_from(model)?;

            transactions::Entity::delete_by_id(transaction_id.to_string())
                .exec(&db_tx)
                .await?;

            self.adjust_account_balance(&db_tx, &tx.account_id.to_string(), -tx.signed_amount())
                .await?;

            Ok(())
        })
    }

    async fn require_transaction(
        &self,
        db_tx: &DatabaseTransaction,
        transaction_id: Uuid,
    ) -> ResultEngine<transactions::Model> {
        transactions::Entity::find_by_id(transaction_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))
    }

    async fn adjust_account_balance(
        &self,
        db_tx: &DatabaseTransaction,
        account_id: &str,
        delta_minor: i64,
    ) -> ResultEngine<()> {
        let model = accounts::Entity::find_by_id(account_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))?;

        let active = accounts::ActiveModel {
            id: ActiveValue::Set(model.id),
            balance_minor: ActiveValue::Set(model.balance_minor + delta_minor),
            ..Default::default()
        };
        active.update(db_tx).await?;

        Ok(())
    }
}
