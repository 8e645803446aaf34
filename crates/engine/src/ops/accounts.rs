use std::collections::HashMap;

use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    AccountGroup, EngineError, ResultEngine, TransactionKind, account_groups, accounts,
    transactions, util::normalize_required_name,
};

use super::{Engine, with_tx};

/// An account joined with its group, the row the accounts screen renders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountView {
    pub id: Uuid,
    pub name: String,
    pub balance_minor: i64,
    pub group_id: Uuid,
    pub group_name: String,
}

impl Engine {
    /// Creates an account group.
    pub async fn new_account_group(&self, name: &str) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "account group")?;

        with_tx!(self, |db_tx| {
            let exists = account_groups::Entity::find()
                .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(name));
            }

            let id = Uuid::new_v4();
            let active = account_groups::ActiveModel {
                id: ActiveValue::Set(id.to_string()),
                name: ActiveValue::Set(name),
            };
            active.insert(&db_tx).await?;

            Ok(id)
        })
    }

    /// All account groups ordered by name.
    pub async fn account_groups(&self) -> ResultEngine<Vec<AccountGroup>> {
        let models = account_groups::Entity::find()
            .order_by_asc(account_groups::Column::Name)
            .all(&self.database)
            .await?;

        models.into_iter().map(AccountGroup::try_from).collect()
    }

    /// Adds a new account inside a group, opening it at `opening_balance_minor`.
    pub async fn new_account(
        &self,
        group_id: Uuid,
        name: &str,
        opening_balance_minor: i64,
    ) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "account")?;

        with_tx!(self, |db_tx| {
            self.require_account_group(&db_tx, group_id).await?;

            let exists = accounts::Entity::find()
                .filter(accounts::Column::GroupId.eq(group_id.to_string()))
                .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(name));
            }

            let id = Uuid::new_v4();
            let active = accounts::ActiveModel {
                id: ActiveValue::Set(id.to_string()),
                name: ActiveValue::Set(name),
                opening_balance_minor: ActiveValue::Set(opening_balance_minor),
                balance_minor: ActiveValue::Set(opening_balance_minor),
                group_id: ActiveValue::Set(group_id.to_string()),
            };
            active.insert(&db_tx).await?;

            Ok(id)
        })
    }

    /// All accounts joined with their group, ordered by group then name.
    ///
    /// The group-wise display split is derived by the caller.
    pub async fn accounts(&self) -> ResultEngine<Vec<AccountView>> {
        let groups = account_groups::Entity::find().all(&self.database).await?;
        let group_names: HashMap<String, String> = groups
            .into_iter()
            .map(|group| (group.id, group.name))
            .collect();

        let models = accounts::Entity::find()
            .order_by_asc(accounts::Column::Name)
            .all(&self.database)
            .await?;

        let mut views = Vec::with_capacity(models.len());
        for model in models {
            let group_name = group_names
                .get(&model.group_id)
                .cloned()
                .ok_or_else(|| EngineError::KeyNotFound("account group not exists".to_string()))?;
            let id = Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound(model.id.clone()))?;
            let group_id = Uuid::parse_str(&model.group_id)
                .map_err(|_| EngineError::KeyNotFound(model.group_id.clone()))?;
            views.push(AccountView {
                id,
                name: model.name,
                balance_minor: model.balance_minor,
                group_id,
                group_name,
            });
        }

        views.sort_by(|a, b| {
            a.group_name
                .cmp(&b.group_name)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(views)
    }

    /// Renames an existing account.
    pub async fn rename_account(&self, account_id: Uuid, new_name: &str) -> ResultEngine<()> {
        let new_name = normalize_required_name(new_name, "account")?;

        with_tx!(self, |db_tx| {
            let model = self.require_account(&db_tx, account_id).await?;

            let exists = accounts::Entity::find()
                .filter(accounts::Column::GroupId.eq(model.group_id.clone()))
                .filter(Expr::cust("LOWER(name)").eq(new_name.to_lowercase()))
                .filter(accounts::Column::Id.ne(account_id.to_string()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(new_name));
            }

            let active = accounts::ActiveModel {
                id: ActiveValue::Set(account_id.to_string()),
                name: ActiveValue::Set(new_name),
                ..Default::default()
            };
            active.update(&db_tx).await?;

            Ok(())
        })
    }

    /// Deletes an account that no transaction references.
    pub async fn delete_account(&self, account_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_account(&db_tx, account_id).await?;

            let referenced = transactions::Entity::find()
                .filter(transactions::Column::AccountId.eq(account_id.to_string()))
                .one(&db_tx)
                .await?
                .is_some();
            if referenced {
                return Err(EngineError::InUse(format!(
                    "account '{}' still has transactions",
                    model.name
                )));
            }

            accounts::Entity::delete_by_id(account_id.to_string())
                .exec(&db_tx)
                .await?;

            Ok(())
        })
    }

    /// Recomputes every account's denormalized balance from its opening
    /// balance plus the signed transaction ledger.
    pub async fn recompute_balances(&self) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let account_models = accounts::Entity::find().all(&db_tx).await?;
            let transaction_models = transactions::Entity::find().all(&db_tx).await?;

            let mut ledger: HashMap<String, i64> = HashMap::new();
            for model in transaction_models {
                let kind = TransactionKind::try_from(model.kind.as_str())?;
                *ledger.entry(model.account_id).or_insert(0) +=
                    kind.sign() * model.amount_minor;
            }

            for model in account_models {
                let balance =
                    model.opening_balance_minor + ledger.get(&model.id).copied().unwrap_or(0);
                if balance == model.balance_minor {
                    continue;
                }
                let active = accounts::ActiveModel {
                    id: ActiveValue::Set(model.id),
                    balance_minor: ActiveValue::Set(balance),
                    ..Default::default()
                };
                active.update(&db_tx).await?;
            }

            Ok(())
        })
    }

    async fn require_account_group(
        &self,
        db_tx: &DatabaseTransaction,
        group_id: Uuid,
    ) -> ResultEngine<account_groups::Model> {
        account_groups::Entity::find_by_id(group_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account group not exists".to_string()))
    }
}
