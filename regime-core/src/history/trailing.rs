use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use super::repository::{HistoryRepository, RepositoryError};
use crate::{ActivityClassification, ProfileInput};

/// Sums over the twelve months ending with (and including) a reference month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailingTotals {
    pub company_id: String,
    pub first_period: NaiveDate,
    pub last_period: NaiveDate,
    pub months_covered: usize,
    pub revenue: Decimal,
    pub payroll: Decimal,
    pub expenses: Decimal,
    /// Revenue and expenses of the reference month, when it was recorded.
    pub reference_revenue: Option<Decimal>,
    pub reference_expenses: Option<Decimal>,
}

impl TrailingTotals {
    /// A monthly profile input built from the totals.
    pub fn to_profile_input(
        &self,
        activity: ActivityClassification,
    ) -> ProfileInput {
        let mut input = ProfileInput::new(self.revenue, activity);
        input.trailing12_payroll = Some(self.payroll);
        input.current_month_revenue = self.reference_revenue;
        input.current_expenses = self.reference_expenses;
        input
    }
}

fn first_of_month(date: NaiveDate) -> Result<NaiveDate, RepositoryError> {
    date.with_day(1)
        .ok_or_else(|| RepositoryError::InvalidRecord(format!("no first day for {date}")))
}

/// Aggregates the trailing twelve months of `company_id` ending at the month
/// containing `as_of`. Missing months count as zero.
pub async fn trailing_twelve(
    repository: &dyn HistoryRepository,
    company_id: &str,
    as_of: NaiveDate,
) -> Result<TrailingTotals, RepositoryError> {
    let last_period = first_of_month(as_of)?;
    let first_period = last_period
        .checked_sub_months(Months::new(11))
        .ok_or_else(|| RepositoryError::InvalidRecord(format!("date out of range: {as_of}")))?;

    let window: Vec<_> = repository
        .list_periods(company_id)
        .await?
        .into_iter()
        .filter(|r| r.period >= first_period && r.period <= last_period)
        .collect();

    let reference = window.iter().find(|r| r.period == last_period);
    Ok(TrailingTotals {
        company_id: company_id.to_string(),
        first_period,
        last_period,
        months_covered: window.len(),
        revenue: window.iter().map(|r| r.revenue).sum(),
        payroll: window.iter().map(|r| r.payroll).sum(),
        expenses: window.iter().map(|r| r.expenses).sum(),
        reference_revenue: reference.map(|r| r.revenue),
        reference_expenses: reference.map(|r| r.expenses),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::FinancialProfile;
    use crate::history::{InMemoryHistoryRepository, NewPeriodRecord};

    async fn seeded() -> InMemoryHistoryRepository {
        let repo = InMemoryHistoryRepository::new();
        // Jan 2025 to Mar 2026: fifteen months of 100k revenue
        let mut period = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        for _ in 0..15 {
            repo.record_period(NewPeriodRecord {
                company_id: "acme".to_string(),
                period,
                revenue: dec!(100000),
                payroll: dec!(30000),
                expenses: dec!(20000),
            })
            .await
            .unwrap();
            period = period.checked_add_months(Months::new(1)).unwrap();
        }
        repo
    }

    #[tokio::test]
    async fn window_covers_twelve_months_ending_at_reference() {
        let repo = seeded().await;

        let totals = trailing_twelve(&repo, "acme", NaiveDate::from_ymd_opt(2026, 3, 20).unwrap())
            .await
            .unwrap();

        assert_eq!(totals.first_period, NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
        assert_eq!(totals.months_covered, 12);
        assert_eq!(totals.revenue, dec!(1200000));
        assert_eq!(totals.payroll, dec!(360000));
        assert_eq!(totals.reference_revenue, Some(dec!(100000)));
    }

    #[tokio::test]
    async fn missing_months_count_as_zero() {
        let repo = seeded().await;

        let totals = trailing_twelve(&repo, "acme", NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
            .await
            .unwrap();

        assert_eq!(totals.months_covered, 6);
        assert_eq!(totals.revenue, dec!(600000));
    }

    #[tokio::test]
    async fn unknown_company_has_empty_totals() {
        let repo = seeded().await;

        let totals = trailing_twelve(&repo, "nobody", NaiveDate::from_ymd_opt(2026, 3, 1).unwrap())
            .await
            .unwrap();

        assert_eq!(totals.months_covered, 0);
        assert_eq!(totals.revenue, dec!(0));
        assert_eq!(totals.reference_revenue, None);
    }

    #[tokio::test]
    async fn totals_build_a_valid_profile() {
        let repo = seeded().await;
        let totals = trailing_twelve(&repo, "acme", NaiveDate::from_ymd_opt(2026, 3, 1).unwrap())
            .await
            .unwrap();

        let profile =
            FinancialProfile::try_from(totals.to_profile_input(ActivityClassification::Services))
                .unwrap();

        assert_eq!(profile.trailing12_revenue(), dec!(1200000));
        assert_eq!(profile.trailing12_payroll(), Some(dec!(360000)));
        assert_eq!(profile.current_expenses(), dec!(20000));
    }
}
