use std::collections::HashMap;

use sea_orm::{QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, MonthPeriod, ResultEngine, TransactionKind, categories, transactions};

use super::Engine;

/// One category's slice of a month's income or spending.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryShare {
    pub category_id: Uuid,
    pub category_name: String,
    pub category_emoji: String,
    pub category_color: String,
    pub total_minor: i64,
    /// This category's fraction of the kind's month total, in `0.0..=1.0`.
    pub share: f64,
}

impl Engine {
    /// Percentage breakdown by category for one month and kind, sorted
    /// descending by share.
    ///
    /// Shares sum to 1.0 across the returned rows; an empty month yields an
    /// empty breakdown.
    pub async fn analytics(
        &self,
        period: MonthPeriod,
        kind: TransactionKind,
    ) -> ResultEngine<Vec<CategoryShare>> {
        let (start, end) = period.utc_range(self.timezone())?;

        let models = transactions::Entity::find()
            .filter(transactions::Column::Kind.eq(kind.as_str()))
            .filter(transactions::Column::OccurredAt.gte(start))
            .filter(transactions::Column::OccurredAt.lt(end))
            .all(&self.database)
            .await?;

        let mut subtotals: HashMap<String, i64> = HashMap::new();
        for model in models {
            *subtotals.entry(model.category_id).or_insert(0) += model.amount_minor;
        }

        let kind_total: i64 = subtotals.values().sum();
        if kind_total == 0 {
            return Ok(Vec::new());
        }

        let category_models = categories::Entity::find().all(&self.database).await?;
        let category_by_id: HashMap<String, categories::Model> = category_models
            .into_iter()
            .map(|model| (model.id.clone(), model))
            .collect();

        let mut shares = Vec::with_capacity(subtotals.len());
        for (category_id, total_minor) in subtotals {
            let category = category_by_id
                .get(&category_id)
                .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;
            shares.push(CategoryShare {
                category_id: Uuid::parse_str(&category_id)
                    .map_err(|_| EngineError::KeyNotFound(category_id.clone()))?,
                category_name: category.name.clone(),
                category_emoji: category.emoji.clone(),
                category_color: category.color.clone(),
                total_minor,
                share: total_minor as f64 / kind_total as f64,
            });
        }

        // Descending by amount, name as a deterministic tie-break.
        shares.sort_by(|a, b| {
            b.total_minor
                .cmp(&a.total_minor)
                .then_with(|| a.category_name.cmp(&b.category_name))
        });

        Ok(shares)
    }
}
