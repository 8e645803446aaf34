use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Category, EngineError, ResultEngine, budgets, categories, transactions,
    util::{normalize_lookup_key, normalize_required_name},
};

use super::{Engine, with_tx};

const DEFAULT_EMOJI: &str = "🏷️";
const DEFAULT_COLOR: &str = "#7a8ca5";

impl Engine {
    /// Creates a category with its display attributes.
    ///
    /// `emoji` and `color` fall back to neutral defaults when empty. Rejects
    /// names whose normalized key collides with an existing category.
    pub async fn new_category(
        &self,
        name: &str,
        emoji: Option<&str>,
        color: Option<&str>,
    ) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "category")?;
        let name_norm = normalize_lookup_key(&name);
        let emoji = display_emoji(emoji);
        let color = display_color(color)?;

        with_tx!(self, |db_tx| {
            let exists = categories::Entity::find()
                .filter(categories::Column::NameNorm.eq(name_norm.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(name));
            }

            let id = Uuid::new_v4();
            let active = categories::ActiveModel {
                id: ActiveValue::Set(id.to_string()),
                name: ActiveValue::Set(name),
                name_norm: ActiveValue::Set(name_norm),
                emoji: ActiveValue::Set(emoji),
                color: ActiveValue::Set(color),
            };
            active.insert(&db_tx).await?;

            Ok(id)
        })
    }

    /// Finds a category by (normalized) name, creating it with default
    /// display attributes on first use.
    pub async fn resolve_category(&self, name: &str) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "category")?;
        let name_norm = normalize_lookup_key(&name);

        with_tx!(self, |db_tx| {
            if let Some(model) = categories::Entity::find()
                .filter(categories::Column::NameNorm.eq(name_norm.clone()))
                .one(&db_tx)
                .await?
            {
                let id = Uuid::parse_str(&model.id)
                    .map_err(|_| EngineError::KeyNotFound(model.id.clone()))?;
                return Ok(id);
            }

            let id = Uuid::new_v4();
            let active = categories::ActiveModel {
                id: ActiveValue::Set(id.to_string()),
                name: ActiveValue::Set(name),
                name_norm: ActiveValue::Set(name_norm),
                emoji: ActiveValue::Set(DEFAULT_EMOJI.to_string()),
                color: ActiveValue::Set(DEFAULT_COLOR.to_string()),
            };
            active.insert(&db_tx).await?;

            Ok(id)
        })
    }

    /// All categories ordered by name.
    pub async fn categories(&self) -> ResultEngine<Vec<Category>> {
        let models = categories::Entity::find()
            .order_by_asc(categories::Column::Name)
            .all(&self.database)
            .await?;

        models.into_iter().map(Category::try_from).collect()
    }

    /// Updates a category's name and display attributes.
    pub async fn update_category(
        &self,
        category_id: Uuid,
        name: &str,
        emoji: Option<&str>,
        color: Option<&str>,
    ) -> ResultEngine<()> {
        let name = normalize_required_name(name, "category")?;
        let name_norm = normalize_lookup_key(&name);
        let emoji = display_emoji(emoji);
        let color = display_color(color)?;

        with_tx!(self, |db_tx| {
            self.require_category(&db_tx, category_id).await?;

            let clash = categories::Entity::find()
                .filter(categories::Column::NameNorm.eq(name_norm.clone()))
                .filter(categories::Column::Id.ne(category_id.to_string()))
                .one(&db_tx)
                .await?
                .is_some();
            if clash {
                return Err(EngineError::ExistingKey(name));
            }

            let active = categories::ActiveModel {
                id: ActiveValue::Set(category_id.to_string()),
                name: ActiveValue::Set(name),
                name_norm: ActiveValue::Set(name_norm),
                emoji: ActiveValue::Set(emoji),
                color: ActiveValue::Set(color),
            };
            active.update(&db_tx).await?;

            Ok(())
        })
    }

    /// Deletes a category.
    ///
    /// Refuses while transactions or a budget still reference it.
    pub async fn delete_category(&self, category_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_category(&db_tx, category_id).await?;

            let referenced = transactions::Entity::find()
                .filter(transactions::Column::CategoryId.eq(category_id.to_string()))
                .one(&db_tx)
                .await?
                .is_some();
            if referenced {
                return Err(EngineError::InUse(format!(
                    "category '{}' still has transactions",
                    model.name
                )));
            }

            let budgeted = budgets::Entity::find()
                .filter(budgets::Column::CategoryId.eq(category_id.to_string()))
                .one(&db_tx)
                .await?
                .is_some();
            if budgeted {
                return Err(EngineError::InUse(format!(
                    "category '{}' still has a budget",
                    model.name
                )));
            }

            categories::Entity::delete_by_id(category_id.to_string())
                .exec(&db_tx)
                .await?;

            Ok(())
        })
    }
}

fn display_emoji(emoji: Option<&str>) -> String {
    match emoji.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => value.to_string(),
        None => DEFAULT_EMOJI.to_string(),
    }
}

fn display_color(color: Option<&str>) -> ResultEngine<String> {
    let Some(value) = color.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(DEFAULT_COLOR.to_string());
    };

    let hex = value.strip_prefix('#').unwrap_or(value);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(EngineError::InvalidName(format!(
            "color must be #rrggbb, got '{value}'"
        )));
    }
    Ok(format!("#{}", hex.to_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_accepts_hex_with_or_without_hash() {
        assert_eq!(display_color(Some("#E57373")).unwrap(), "#e57373");
        assert_eq!(display_color(Some("e57373")).unwrap(), "#e57373");
        assert_eq!(display_color(None).unwrap(), DEFAULT_COLOR);
    }

    #[test]
    fn color_rejects_malformed_values() {
        assert!(display_color(Some("#fff")).is_err());
        assert!(display_color(Some("not-a-color")).is_err());
    }
}
