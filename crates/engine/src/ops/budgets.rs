use std::collections::HashMap;

use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    BudgetEntry, EngineError, MonthPeriod, ResultEngine, TransactionKind, budget_entries, budgets,
    categories, transactions,
};

use super::{Engine, with_tx};

/// A budget joined with its category name, for pickers and listings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BudgetView {
    pub id: Uuid,
    pub category_id: Uuid,
    pub category_name: String,
}

/// One category's budget-vs-spending line for a month.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BudgetLine {
    pub budget_id: Uuid,
    pub category_id: Uuid,
    pub category_name: String,
    pub category_emoji: String,
    pub category_color: String,
    /// The month's allotted amount from the budget entry.
    pub budget_minor: i64,
    /// Sum of the category's expense transactions within the month's window;
    /// zero when the category has no spending.
    pub spent_minor: i64,
}

/// The budgets screen's month view: per-category lines plus independent
/// totals.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BudgetOverview {
    pub lines: Vec<BudgetLine>,
    pub total_budget_minor: i64,
    pub total_spent_minor: i64,
}

impl Engine {
    /// Creates a budget for a category and seeds its 12 monthly entries for
    /// `year`, all with `initial_amount_minor`, in one database transaction.
    ///
    /// Rejects a second budget for the same category.
    pub async fn new_budget(
        &self,
        category_id: Uuid,
        year: i32,
        initial_amount_minor: i64,
    ) -> ResultEngine<Uuid> {
        validate_budget_amount(initial_amount_minor)?;

        with_tx!(self, |db_tx| {
            let category = self.require_category(&db_tx, category_id).await?;

            let exists = budgets::Entity::find()
                .filter(budgets::Column::CategoryId.eq(category_id.to_string()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(category.name));
            }

            let budget_id = Uuid::new_v4();
            let active = budgets::ActiveModel {
                id: ActiveValue::Set(budget_id.to_string()),
                category_id: ActiveValue::Set(category_id.to_string()),
            };
            active.insert(&db_tx).await?;

            budget_entries::Entity::insert_many(seed_entries(
                budget_id,
                year,
                initial_amount_minor,
            ))
            .exec(&db_tx)
            .await?;

            Ok(budget_id)
        })
    }

    /// Seeds the 12 monthly entries of an existing budget for another year.
    ///
    /// Rejects the year if any of its entries already exist.
    pub async fn seed_budget_year(
        &self,
        budget_id: Uuid,
        year: i32,
        initial_amount_minor: i64,
    ) -> ResultEngine<()> {
        validate_budget_amount(initial_amount_minor)?;

        with_tx!(self, |db_tx| {
            self.require_budget(&db_tx, budget_id).await?;

            let seeded = budget_entries::Entity::find()
                .filter(budget_entries::Column::BudgetId.eq(budget_id.to_string()))
                .filter(budget_entries::Column::Year.eq(year))
                .one(&db_tx)
                .await?
                .is_some();
            if seeded {
                return Err(EngineError::ExistingKey(format!("budget year {year}")));
            }

            budget_entries::Entity::insert_many(seed_entries(
                budget_id,
                year,
                initial_amount_minor,
            ))
            .exec(&db_tx)
            .await?;

            Ok(())
        })
    }

    /// Edits one monthly entry of a budget.
    pub async fn set_budget_entry(
        &self,
        budget_id: Uuid,
        year: i32,
        month: u32,
        amount_minor: i64,
    ) -> ResultEngine<()> {
        MonthPeriod::new(year, month)?;
        validate_budget_amount(amount_minor)?;

        with_tx!(self, |db_tx| {
            let model = budget_entries::Entity::find()
                .filter(budget_entries::Column::BudgetId.eq(budget_id.to_string()))
                .filter(budget_entries::Column::Year.eq(year))
                .filter(budget_entries::Column::Month.eq(month as i32))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("budget entry not exists".to_string()))?;

            let active = budget_entries::ActiveModel {
                id: ActiveValue::Set(model.id),
                amount_minor: ActiveValue::Set(amount_minor),
                ..Default::default()
            };
            active.update(&db_tx).await?;

            Ok(())
        })
    }

    /// All budgets joined with their category name, ordered by name.
    pub async fn budgets(&self) -> ResultEngine<Vec<BudgetView>> {
        let models = budgets::Entity::find()
            .find_also_related(categories::Entity)
            .all(&self.database)
            .await?;

        let mut views = Vec::with_capacity(models.len());
        for (budget, category) in models {
            let category = category
                .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;
            let id = Uuid::parse_str(&budget.id)
                .map_err(|_| EngineError::KeyNotFound(budget.id.clone()))?;
            let category_id = Uuid::parse_str(&budget.category_id)
                .map_err(|_| EngineError::KeyNotFound(budget.category_id.clone()))?;
            views.push(BudgetView {
                id,
                category_id,
                category_name: category.name,
            });
        }

        views.sort_by(|a, b| a.category_name.cmp(&b.category_name));
        Ok(views)
    }

    /// A budget's monthly entries for one year, ordered January to December.
    pub async fn budget_entries(
        &self,
        budget_id: Uuid,
        year: i32,
    ) -> ResultEngine<Vec<BudgetEntry>> {
        let models = budget_entries::Entity::find()
            .filter(budget_entries::Column::BudgetId.eq(budget_id.to_string()))
            .filter(budget_entries::Column::Year.eq(year))
            .order_by_asc(budget_entries::Column::Month)
            .all(&self.database)
            .await?;

        models.into_iter().map(BudgetEntry::try_from).collect()
    }

    /// Joins each budgeted category's monthly allotment against its expense
    /// total within the month's window.
    ///
    /// A category with a budget entry but no spending reports a zero-spend
    /// line. The overview totals are the independent sums of the per-line
    /// budgets and the per-line spending.
    pub async fn budget_overview(&self, period: MonthPeriod) -> ResultEngine<BudgetOverview> {
        let (start, end) = period.utc_range(self.timezone())?;

        let budget_models = budgets::Entity::find()
            .find_also_related(categories::Entity)
            .all(&self.database)
            .await?;

        let entry_models = budget_entries::Entity::find()
            .filter(budget_entries::Column::Year.eq(period.year()))
            .filter(budget_entries::Column::Month.eq(period.month() as i32))
            .all(&self.database)
            .await?;
        let entry_by_budget: HashMap<String, i64> = entry_models
            .into_iter()
            .map(|entry| (entry.budget_id.clone(), entry.amount_minor))
            .collect();

        let expense_models = transactions::Entity::find()
            .filter(transactions::Column::Kind.eq(TransactionKind::Expense.as_str()))
            .filter(transactions::Column::OccurredAt.gte(start))
            .filter(transactions::Column::OccurredAt.lt(end))
            .all(&self.database)
            .await?;
        let mut spent_by_category: HashMap<String, i64> = HashMap::new();
        for model in expense_models {
            *spent_by_category.entry(model.category_id).or_insert(0) += model.amount_minor;
        }

        let mut overview = BudgetOverview::default();
        for (budget, category) in budget_models {
            // Budgets without an entry for this month's year are not part of
            // that year's plan.
            let Some(budget_minor) = entry_by_budget.get(&budget.id).copied() else {
                continue;
            };
            let category = category
                .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;
            let spent_minor = spent_by_category
                .get(&budget.category_id)
                .copied()
                .unwrap_or(0);

            overview.total_budget_minor += budget_minor;
            overview.total_spent_minor += spent_minor;
            overview.lines.push(BudgetLine {
                budget_id: Uuid::parse_str(&budget.id)
                    .map_err(|_| EngineError::KeyNotFound(budget.id.clone()))?,
                category_id: Uuid::parse_str(&budget.category_id)
                    .map_err(|_| EngineError::KeyNotFound(budget.category_id.clone()))?,
                category_name: category.name,
                category_emoji: category.emoji,
                category_color: category.color,
                budget_minor,
                spent_minor,
            });
        }

        overview
            .lines
            .sort_by(|a, b| a.category_name.cmp(&b.category_name));
        Ok(overview)
    }

    /// Deletes a budget together with all its monthly entries.
    pub async fn delete_budget(&self, budget_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_budget(&db_tx, budget_id).await?;

            budget_entries::Entity::delete_many()
                .filter(budget_entries::Column::BudgetId.eq(budget_id.to_string()))
                .exec(&db_tx)
                .await?;
            budgets::Entity::delete_by_id(budget_id.to_string())
                .exec(&db_tx)
                .await?;

            Ok(())
        })
    }
}

fn validate_budget_amount(amount_minor: i64) -> ResultEngine<()> {
    if amount_minor < 0 {
        return Err(EngineError::InvalidAmount(
            "budget amount must be >= 0".to_string(),
        ));
    }
    Ok(())
}

fn seed_entries(budget_id: Uuid, year: i32, amount_minor: i64) -> Vec<budget_entries::ActiveModel> {
    (1..=12)
        .map(|month| budget_entries::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            budget_id: ActiveValue::Set(budget_id.to_string()),
            year: ActiveValue::Set(year),
            month: ActiveValue::Set(month),
            amount_minor: ActiveValue::Set(amount_minor),
        })
        .collect()
}
