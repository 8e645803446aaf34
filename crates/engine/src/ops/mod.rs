use chrono_tz::Tz;
use sea_orm::{DatabaseConnection, DatabaseTransaction, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

mod accounts;
mod analytics;
mod budgets;
mod categories;
mod summary;
mod transactions;

pub use accounts::AccountView;
pub use analytics::CategoryShare;
pub use budgets::{BudgetLine, BudgetOverview, BudgetView};
pub use summary::{MonthTotals, MonthlySummary};
pub use transactions::{NewTransaction, TransactionView};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// The repository layer: every domain operation is a method on `Engine`
/// translating to store queries inside a database transaction.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    timezone: Tz,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Timezone used for monthly windows.
    #[must_use]
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub(crate) async fn require_category(
        &self,
        db_tx: &DatabaseTransaction,
        category_id: Uuid,
    ) -> ResultEngine<crate::categories::Model> {
        crate::categories::Entity::find_by_id(category_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))
    }

    pub(crate) async fn require_account(
        &self,
        db_tx: &DatabaseTransaction,
        account_id: Uuid,
    ) -> ResultEngine<crate::accounts::Model> {
        crate::accounts::Entity::find_by_id(account_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))
    }

    pub(crate) async fn require_budget(
        &self,
        db_tx: &DatabaseTransaction,
        budget_id: Uuid,
    ) -> ResultEngine<crate::budgets::Model> {
        crate::budgets::Entity::find_by_id(budget_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("budget not exists".to_string()))
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    timezone: Option<Tz>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Timezone for monthly windows (defaults to UTC).
    pub fn timezone(mut self, timezone: Tz) -> EngineBuilder {
        self.timezone = Some(timezone);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            timezone: self.timezone.unwrap_or(chrono_tz::UTC),
        })
    }
}
