use std::collections::HashMap;

use sea_orm::{QueryFilter, QuerySelect, prelude::*};

use crate::{MonthPeriod, ResultEngine, TransactionKind, transactions};

use super::Engine;

/// Income and expense totals for one month.
///
/// Both totals are non-negative magnitudes; `net_minor()` is their
/// difference.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MonthlySummary {
    pub income_minor: i64,
    pub expenses_minor: i64,
}

impl MonthlySummary {
    #[must_use]
    pub const fn net_minor(self) -> i64 {
        self.income_minor - self.expenses_minor
    }
}

/// One month's totals inside a trend series.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonthTotals {
    pub period: MonthPeriod,
    pub income_minor: i64,
    pub expenses_minor: i64,
}

impl Engine {
    /// Total income and expenses within the month's window.
    pub async fn monthly_summary(&self, period: MonthPeriod) -> ResultEngine<MonthlySummary> {
        let (start, end) = period.utc_range(self.timezone())?;

        let rows: Vec<(String, i64)> = transactions::Entity::find()
            .select_only()
            .column(transactions::Column::Kind)
            .column(transactions::Column::AmountMinor)
            .filter(transactions::Column::OccurredAt.gte(start))
            .filter(transactions::Column::OccurredAt.lt(end))
            .into_tuple()
            .all(&self.database)
            .await?;

        let mut summary = MonthlySummary::default();
        for (kind, amount_minor) in rows {
            match TransactionKind::try_from(kind.as_str())? {
                TransactionKind::Income => summary.income_minor += amount_minor,
                TransactionKind::Expense => summary.expenses_minor += amount_minor,
            }
        }

        Ok(summary)
    }

    /// Per-month totals for the trailing `months` months ending at `period`,
    /// in chronological order. Months without transactions report zeros.
    pub async fn monthly_trend(
        &self,
        period: MonthPeriod,
        months: u32,
    ) -> ResultEngine<Vec<MonthTotals>> {
        let months = months.max(1);
        let mut periods = vec![period];
        for _ in 1..months {
            let earliest = periods[periods.len() - 1];
            periods.push(earliest.prev());
        }
        periods.reverse();

        let timezone = self.timezone();
        let (start, _) = periods[0].utc_range(timezone)?;
        let (_, end) = period.utc_range(timezone)?;

        let models = transactions::Entity::find()
            .filter(transactions::Column::OccurredAt.gte(start))
            .filter(transactions::Column::OccurredAt.lt(end))
            .all(&self.database)
            .await?;

        let mut by_period: HashMap<MonthPeriod, (i64, i64)> = HashMap::new();
        for model in models {
            let bucket = MonthPeriod::from_instant(model.occurred_at, timezone);
            let entry = by_period.entry(bucket).or_insert((0, 0));
            match TransactionKind::try_from(model.kind.as_str())? {
                TransactionKind::Income => entry.0 += model.amount_minor,
                TransactionKind::Expense => entry.1 += model.amount_minor,
            }
        }

        Ok(periods
            .into_iter()
            .map(|bucket| {
                let (income_minor, expenses_minor) =
                    by_period.get(&bucket).copied().unwrap_or((0, 0));
                MonthTotals {
                    period: bucket,
                    income_minor,
                    expenses_minor,
                }
            })
            .collect())
    }
}
